use super::node::FlowNode;
use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;

/// Maps ids as authored in a message to the ids they were committed under.
///
/// Only the first node that claimed an original id gets an entry, so wire
/// references to that id resolve to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    entries: AHashMap<String, String>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `original -> renamed` unless `original` is already mapped.
    /// Returns `false` when an earlier entry won.
    pub fn insert(&mut self, original: &str, renamed: &str) -> bool {
        if self.entries.contains_key(original) {
            return false;
        }
        self.entries
            .insert(original.to_string(), renamed.to_string());
        true
    }

    pub fn resolve(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Entries whose id actually changed.
    pub fn renamed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(from, to)| from != to)
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Non-fatal conditions found while sanitizing. The caller decides whether to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeWarning {
    /// The host had no resolvable active workspace; `z` was left as authored.
    WorkspaceUnresolved,
}

impl fmt::Display for SanitizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeWarning::WorkspaceUnresolved => write!(
                f,
                "Warning: could not determine active workspace; imported nodes may not be in the deployed flow"
            ),
        }
    }
}

/// The nodes parsed from one assistant message, ready to be validated and committed.
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub nodes: Vec<FlowNode>,
    pub remap: RemapTable,
    pub warnings: Vec<SanitizeWarning>,
    snapshot: Arc<[FlowNode]>,
}

impl ImportBatch {
    pub fn new(nodes: Vec<FlowNode>, remap: RemapTable, warnings: Vec<SanitizeWarning>) -> Self {
        let snapshot = Arc::from(nodes.clone());
        Self {
            nodes,
            remap,
            warnings,
            snapshot,
        }
    }

    /// Immutable copy of the nodes taken at the last `seal`, for diagnostic replay.
    pub fn snapshot(&self) -> Arc<[FlowNode]> {
        Arc::clone(&self.snapshot)
    }

    /// Re-takes the snapshot after in-place fixes so it matches what gets committed.
    pub fn seal(&mut self) {
        self.snapshot = Arc::from(self.nodes.clone());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }
}
