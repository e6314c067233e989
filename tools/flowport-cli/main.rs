use clap::{Parser, ValueEnum};
use flowport::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// CLI-specific enum for the remap policy.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyCli {
    Conservative,
    Aggressive,
}

/// CLI-specific enum for the abort policy.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AbortCli {
    Any,
    Errors,
}

/// Imports the flow found in an assistant reply into an in-memory flow document
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the assistant message ("-" reads stdin)
    message_path: String,

    /// Active workspace id of the target document
    #[arg(short, long)]
    workspace: Option<String>,

    /// JSON file with nodes already present in the document
    #[arg(short, long)]
    existing: Option<String>,

    /// JSON import config (remap_policy, abort_policy, auto_layout)
    #[arg(short, long)]
    config: Option<String>,

    /// Id remap policy, overrides the config file
    #[arg(long, value_enum)]
    policy: Option<PolicyCli>,

    /// Which validation issues abort the import, overrides the config file
    #[arg(long, value_enum)]
    abort_on: Option<AbortCli>,

    /// Lay out nodes that come without coordinates
    #[arg(long)]
    layout: bool,

    /// Print the sanitized snapshot even when the import is aborted
    #[arg(long)]
    print_snapshot: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let committed = run_import(cli);
    if !committed {
        std::process::exit(2);
    }
}

fn run_import(cli: Cli) -> bool {
    let total_start = Instant::now();

    // --- 1. Inputs ---
    let message = read_message(&cli.message_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read message '{}': {}",
            cli.message_path, e
        ))
    });

    let mut config = match &cli.config {
        Some(path) => ImportConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config '{}': {}", path, e))),
        None => ImportConfig::default(),
    };
    if let Some(policy) = cli.policy {
        config.remap_policy = match policy {
            PolicyCli::Conservative => RemapPolicy::Conservative,
            PolicyCli::Aggressive => RemapPolicy::Aggressive,
        };
    }
    if let Some(abort_on) = cli.abort_on {
        config.abort_policy = match abort_on {
            AbortCli::Any => AbortPolicy::AnyIssue,
            AbortCli::Errors => AbortPolicy::ErrorsOnly,
        };
    }
    config.auto_layout |= cli.layout;

    let mut host = MemoryHost::new();
    if let Some(workspace) = &cli.workspace {
        host = host.with_workspace(workspace.clone());
    }
    if let Some(path) = &cli.existing {
        let existing = fs::read_to_string(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
        let nodes: Vec<FlowNode> = serde_json::from_str(&existing).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to parse existing nodes '{}': {}", path, e))
        });
        println!("Loaded {} existing node(s) from '{}'", nodes.len(), path);
        host = host.with_nodes(nodes);
    }

    // --- 2. Import ---
    println!("\nImporting flow ({:?} ids, abort on {:?})...", config.remap_policy, config.abort_policy);
    let import_start = Instant::now();
    let mut importer = Importer::from_config(&config);
    let outcome = importer.import_message(&mut host, &message);
    let import_duration = import_start.elapsed();

    // --- 3. Results ---
    let states: Vec<String> = outcome
        .transitions
        .iter()
        .map(|s| format!("{:?}", s))
        .collect();
    println!("States: {}", states.join(" -> "));
    for notification in host.notifications() {
        println!("  {}", notification);
    }
    for fix in &outcome.fixes {
        println!("  fixed {}: {}", fix.node_id, fix.description);
    }
    if !outcome.issues.is_empty() {
        println!("\nValidation issues:");
        for issue in &outcome.issues {
            println!("  - [{:?}] {}", issue.severity, issue);
        }
    }

    if outcome.is_committed() {
        println!("\nCommitted {} node(s):", outcome.committed.len());
        print_json(host.nodes());
    } else if cli.print_snapshot {
        match importer.last_sanitized() {
            Some(snapshot) => {
                println!("\nSanitized snapshot:");
                print_json(&snapshot);
            }
            None => println!("\nNo sanitized snapshot (aborted before validation)"),
        }
    }

    println!("\n--- Performance Summary ---");
    println!("Import:               {:?}", import_duration);
    println!("Total Execution:      {:?}", total_start.elapsed());
    println!();

    outcome.is_committed()
}

fn read_message(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn print_json(nodes: &[FlowNode]) {
    match serde_json::to_string_pretty(nodes) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not render nodes: {}", e),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
