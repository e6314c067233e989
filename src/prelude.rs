//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowport crate.
//! Import this module to get access to the import pipeline without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowport::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let reply = std::fs::read_to_string("path/to/reply.md")?;
//! let config = ImportConfig::from_file("path/to/config.json")?;
//!
//! let mut host = MemoryHost::new().with_workspace("flow1");
//! let mut importer = Importer::from_config(&config);
//! let outcome = importer.import_message(&mut host, &reply);
//!
//! println!("{}", outcome.notification);
//! # Ok(())
//! # }
//! ```

// Import pipeline
pub use crate::importer::{AbortPolicy, ImportConfig, ImportOutcome, ImportState, Importer};
pub use crate::parser::{extract_json_block, has_importable_flow, parse_message};
pub use crate::sanitizer::{RemapPolicy, SanitizeContext, Sanitizer};
pub use crate::validator::{Issue, IssueKind, Severity, Validator};

// Data model
pub use crate::flow::{FlowNode, ImportBatch, IntoCandidates, RemapTable, Wires};

// Host boundary
pub use crate::host::{FlowHost, MemoryHost, Notification, NotifyLevel};

// Error types
pub use crate::error::{HostError, ImportError, ParseError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
