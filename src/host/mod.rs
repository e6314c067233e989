//! The boundary to the editor that owns the live flow document.
//!
//! The import pipeline never reaches into the editor directly. It reads the ids already in
//! the document and the active workspace, hands a finalized batch to
//! [`FlowHost::import_nodes`] and reports the result through [`FlowHost::notify`].

use crate::error::HostError;
use crate::flow::FlowNode;
use ahash::AHashSet;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub mod emitter;
pub mod memory;

pub use emitter::{KNOWN_EMIT_DEFECT, KnownDefectFilter};
pub use memory::MemoryHost;

/// The editor's generic event bus, as seen by code that runs inside a commit.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &str, payload: &Value) -> Result<(), HostError>;
}

pub type SharedEmitter = Arc<dyn EventEmitter>;

/// Emitter that accepts and drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmitter;

impl EventEmitter for NoopEmitter {
    fn emit(&self, _event: &str, _payload: &Value) -> Result<(), HostError> {
        Ok(())
    }
}

/// Flags passed along with a bulk insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Let the host replace every id with one of its own.
    pub generate_ids: bool,
    /// Record the insert as a single undoable history entry.
    pub add_to_history: bool,
}

impl ImportOptions {
    /// Ids are final and the insert is one undo unit.
    pub fn finalized() -> Self {
        Self {
            generate_ids: false,
            add_to_history: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Success,
    Warning,
    Error,
}

/// A user-visible message surfaced by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            NotifyLevel::Success => "success",
            NotifyLevel::Warning => "warning",
            NotifyLevel::Error => "error",
        };
        write!(f, "[{}] {}", level, self.message)
    }
}

/// The live flow document an import is committed into.
pub trait FlowHost {
    /// Id of the workspace currently shown, if one can be resolved.
    fn active_workspace(&self) -> Option<String>;

    /// Ids of every node already in the document.
    fn node_ids(&self) -> AHashSet<String>;

    /// Nodes that belong to one workspace, in document order.
    fn workspace_nodes(&self, workspace: &str) -> Vec<FlowNode>;

    /// Bulk-inserts nodes. Must be all-or-nothing from the caller's point of view.
    fn import_nodes(&mut self, nodes: &[FlowNode], options: ImportOptions)
    -> Result<(), HostError>;

    fn notify(&mut self, notification: &Notification);

    /// The emitter the host currently routes its events through.
    fn emitter(&self) -> SharedEmitter;

    fn set_emitter(&mut self, emitter: SharedEmitter);
}
