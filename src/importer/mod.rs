//! The import coordinator: parse, sanitize, validate, commit.
//!
//! One call to [`Importer::import_message`] walks the state machine
//! `Idle → Parsing → Sanitizing → Validating → Committing → Committed | Aborted` exactly once.
//! Every failure ends in `Aborted`, produces one notification on the host and one log
//! event, and leaves the document untouched. There are no retries; the user triggers the
//! import again.

use crate::error::{HostError, ImportError, ParseError};
use crate::flow::{FlowNode, ImportBatch, SanitizeWarning};
use crate::host::{FlowHost, ImportOptions, KnownDefectFilter, Notification};
use crate::parser;
use crate::sanitizer::{IdGenerator, RemapPolicy, SanitizeContext, Sanitizer, SanitizerBuilder};
use crate::validator::{AutoFix, Issue, NodeCheck, Validator, ValidatorBuilder};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

mod config;

pub use config::{AbortPolicy, ImportConfig};

pub const MSG_SUCCESS: &str = "Flow imported successfully";
pub const MSG_NO_FLOW: &str = "No JSON flow found in message";
pub const MSG_EMPTY_BATCH: &str = "Import aborted: no valid nodes found (removed tab/blank nodes)";
pub const MSG_INVALID_SHAPE: &str = "Import aborted: invalid node shape";
pub const MSG_MALFORMED: &str =
    "Import aborted: flow appears malformed; correct the JSON before importing";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    ParseError,
    EmptyBatch,
    ValidationFailed,
    InvalidNodeShape,
    HostCommitError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    Parsing,
    Sanitizing,
    Validating,
    Committing,
    Committed,
    Aborted(AbortReason),
}

impl ImportState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportState::Committed | ImportState::Aborted(_))
    }
}

impl ImportError {
    pub fn reason(&self) -> AbortReason {
        match self {
            ImportError::Parse(_) => AbortReason::ParseError,
            ImportError::EmptyBatch => AbortReason::EmptyBatch,
            ImportError::ValidationFailed { .. } => AbortReason::ValidationFailed,
            ImportError::InvalidNodeShape { .. } => AbortReason::InvalidNodeShape,
            ImportError::HostCommit(_) => AbortReason::HostCommitError,
        }
    }

    /// The single user-facing message shown for this failure.
    pub fn notification(&self) -> Notification {
        match self {
            ImportError::Parse(ParseError::NoJsonBlock) => Notification::warning(MSG_NO_FLOW),
            ImportError::Parse(err) => {
                Notification::error(format!("Failed to import flow: {}", err))
            }
            ImportError::EmptyBatch => Notification::warning(MSG_EMPTY_BATCH),
            ImportError::ValidationFailed { .. } => Notification::error(MSG_MALFORMED),
            ImportError::InvalidNodeShape { .. } => Notification::error(MSG_INVALID_SHAPE),
            ImportError::HostCommit(err) => {
                Notification::error(format!("Failed to import flow: {}", err))
            }
        }
    }
}

/// Everything an import produced, whether it committed or not.
#[derive(Debug)]
pub struct ImportOutcome {
    /// Every state entered, starting at `Idle` and ending in a terminal state.
    pub transitions: Vec<ImportState>,
    pub notification: Notification,
    /// Ids handed to the host, empty unless committed.
    pub committed: Vec<String>,
    pub issues: Vec<Issue>,
    pub fixes: Vec<AutoFix>,
    pub warnings: Vec<SanitizeWarning>,
    pub error: Option<ImportError>,
}

impl ImportOutcome {
    pub fn state(&self) -> ImportState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(ImportState::Idle)
    }

    pub fn is_committed(&self) -> bool {
        self.state() == ImportState::Committed
    }
}

/// Accumulates diagnostics while the state machine runs.
struct Progress {
    transitions: Vec<ImportState>,
    issues: Vec<Issue>,
    fixes: Vec<AutoFix>,
    warnings: Vec<SanitizeWarning>,
}

impl Progress {
    fn new() -> Self {
        Self {
            transitions: vec![ImportState::Idle],
            issues: Vec::new(),
            fixes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn enter(&mut self, state: ImportState) {
        debug!(?state, "import state");
        self.transitions.push(state);
    }
}

pub struct Importer {
    sanitizer: Sanitizer,
    validator: Validator,
    abort_policy: AbortPolicy,
    last_sanitized: Option<Arc<[FlowNode]>>,
}

pub struct ImporterBuilder {
    sanitizer: SanitizerBuilder,
    validator: ValidatorBuilder,
    abort_policy: AbortPolicy,
}

impl ImporterBuilder {
    pub fn new() -> Self {
        Self {
            sanitizer: SanitizerBuilder::new(),
            validator: ValidatorBuilder::new(),
            abort_policy: AbortPolicy::default(),
        }
    }
    pub fn with_config(self, config: &ImportConfig) -> Self {
        self.with_remap_policy(config.remap_policy)
            .with_abort_policy(config.abort_policy)
            .with_auto_layout(config.auto_layout)
    }
    pub fn with_remap_policy(mut self, policy: RemapPolicy) -> Self {
        self.sanitizer = self.sanitizer.with_policy(policy);
        self
    }
    pub fn with_abort_policy(mut self, policy: AbortPolicy) -> Self {
        self.abort_policy = policy;
        self
    }
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.sanitizer = self.sanitizer.with_id_generator(ids);
        self
    }
    pub fn with_auto_layout(mut self, enabled: bool) -> Self {
        self.sanitizer = self.sanitizer.with_auto_layout(enabled);
        self
    }
    pub fn with_check(mut self, check: Box<dyn NodeCheck>) -> Self {
        self.validator = self.validator.with_check(check);
        self
    }
    pub fn build(self) -> Importer {
        Importer {
            sanitizer: self.sanitizer.build(),
            validator: self.validator.build(),
            abort_policy: self.abort_policy,
            last_sanitized: None,
        }
    }
}

impl Default for ImporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Importer {
    fn default() -> Self {
        ImporterBuilder::new().build()
    }
}

impl Importer {
    pub fn builder() -> ImporterBuilder {
        ImporterBuilder::new()
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        ImporterBuilder::new().with_config(config).build()
    }

    /// Snapshot of the sanitized batch from the latest import, for diagnostics.
    ///
    /// `None` when that import never reached the sanitizer.
    pub fn last_sanitized(&self) -> Option<Arc<[FlowNode]>> {
        self.last_sanitized.clone()
    }

    /// Imports the flow found in one assistant message into `host`.
    pub fn import_message<H: FlowHost>(&mut self, host: &mut H, message: &str) -> ImportOutcome {
        self.last_sanitized = None;
        let mut progress = Progress::new();
        progress.enter(ImportState::Parsing);
        let result = parser::parse_message(message)
            .map_err(ImportError::from)
            .and_then(|candidates| self.process(host, candidates, &mut progress));
        finish(host, progress, result)
    }

    /// Imports already-parsed candidate records, skipping the message parser.
    pub fn import_candidates<H: FlowHost>(
        &mut self,
        host: &mut H,
        candidates: Vec<Value>,
    ) -> ImportOutcome {
        self.last_sanitized = None;
        let mut progress = Progress::new();
        progress.enter(ImportState::Parsing);
        let result = self.process(host, candidates, &mut progress);
        finish(host, progress, result)
    }

    fn process<H: FlowHost>(
        &mut self,
        host: &mut H,
        candidates: Vec<Value>,
        progress: &mut Progress,
    ) -> Result<Vec<String>, ImportError> {
        progress.enter(ImportState::Sanitizing);
        let ctx = SanitizeContext::capture(&*host);
        let mut batch = self.sanitizer.sanitize(candidates, &ctx);
        self.last_sanitized = Some(batch.snapshot());
        progress.warnings = batch.warnings.clone();
        for warning in &batch.warnings {
            warn!(%warning, "import continues with warning");
            host.notify(&Notification::warning(warning.to_string()));
        }
        if batch.is_empty() {
            return Err(ImportError::EmptyBatch);
        }

        progress.enter(ImportState::Validating);
        let report = self.validator.validate(&mut batch.nodes);
        batch.seal();
        self.last_sanitized = Some(batch.snapshot());
        #[cfg(feature = "debug-tools")]
        dump_snapshot(&batch);

        progress.fixes = report.fixes.clone();
        progress.issues = report.issues.clone();
        let blocked = match self.abort_policy {
            AbortPolicy::AnyIssue => !report.is_clean(),
            AbortPolicy::ErrorsOnly => report.has_errors(),
        };
        if blocked {
            warn!(issues = %report.summary(), "flow failed validation");
            return Err(ImportError::ValidationFailed {
                issues: report.issues,
            });
        }

        check_shapes(&batch)?;

        progress.enter(ImportState::Committing);
        commit(host, &batch.nodes)?;
        Ok(batch.ids().map(str::to_string).collect())
    }
}

fn finish<H: FlowHost>(
    host: &mut H,
    mut progress: Progress,
    result: Result<Vec<String>, ImportError>,
) -> ImportOutcome {
    let (notification, committed, error) = match result {
        Ok(ids) => {
            progress.enter(ImportState::Committed);
            info!(nodes = ids.len(), "flow imported");
            (Notification::success(MSG_SUCCESS), ids, None)
        }
        Err(err) => {
            progress.enter(ImportState::Aborted(err.reason()));
            match &err {
                ImportError::HostCommit(_) => error!(error = %err, "import failed"),
                _ => warn!(error = %err, "import aborted"),
            }
            (err.notification(), Vec::new(), Some(err))
        }
    };
    host.notify(&notification);

    ImportOutcome {
        transitions: progress.transitions,
        notification,
        committed,
        issues: progress.issues,
        fixes: progress.fixes,
        warnings: progress.warnings,
        error,
    }
}

/// Last guard before the host sees the batch.
fn check_shapes(batch: &ImportBatch) -> Result<(), ImportError> {
    let bad = batch.nodes.iter().find_map(|node| {
        let reason = if node.node_type.trim().is_empty() {
            "empty type"
        } else if node.id.is_empty() {
            "empty id"
        } else if node.is_tab() {
            "tab nodes cannot be imported"
        } else {
            return None;
        };
        Some((node.id.clone(), reason))
    });
    match bad {
        Some((node_id, reason)) => {
            error!(node = %node_id, reason, "bad node");
            Err(ImportError::InvalidNodeShape {
                node_id,
                reason: reason.to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Hands the batch to the host with the defect filter installed on its emitter.
/// The original emitter is put back when the guard drops, on every path.
fn commit<H: FlowHost>(host: &mut H, nodes: &[FlowNode]) -> Result<(), HostError> {
    let original = host.emitter();
    host.set_emitter(Arc::new(KnownDefectFilter::new(Arc::clone(&original))));
    let mut host = scopeguard::guard(host, move |host| host.set_emitter(original));
    host.import_nodes(nodes, ImportOptions::finalized())
}

#[cfg(feature = "debug-tools")]
fn dump_snapshot(batch: &ImportBatch) {
    let path = std::path::Path::new("tmp/last_sanitized.json");
    let written = std::fs::create_dir_all("tmp").and_then(|_| {
        let json = serde_json::to_string_pretty(&*batch.snapshot()).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    });
    if let Err(e) = written {
        warn!("Could not write debug snapshot: {}", e);
    }
}
