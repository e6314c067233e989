use super::{
    FlowHost, ImportOptions, NoopEmitter, Notification, SharedEmitter,
};
use crate::error::HostError;
use crate::flow::FlowNode;
use crate::sanitizer::{IdGenerator, RandomIds};
use ahash::{AHashMap, AHashSet};
use serde_json::json;
use std::sync::Arc;

/// An in-memory flow document.
///
/// Behaves like the editor as far as the import pipeline can observe: it owns nodes and an
/// undo history, routes insert events through a replaceable emitter and records every
/// notification. Used by the CLI and the test suite.
pub struct MemoryHost {
    nodes: Vec<FlowNode>,
    active_workspace: Option<String>,
    emitter: SharedEmitter,
    history: Vec<Vec<String>>,
    notifications: Vec<Notification>,
    import_calls: usize,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            active_workspace: None,
            emitter: Arc::new(NoopEmitter),
            history: Vec::new(),
            notifications: Vec::new(),
            import_calls: 0,
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.active_workspace = Some(workspace.into());
        self
    }

    /// Seeds the document without touching history.
    pub fn with_nodes(mut self, nodes: Vec<FlowNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn with_emitter(mut self, emitter: SharedEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn set_active_workspace(&mut self, workspace: Option<String>) {
        self.active_workspace = workspace;
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Number of times `import_nodes` was called, successful or not.
    pub fn import_calls(&self) -> usize {
        self.import_calls
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Reverts the most recent history entry. Returns how many nodes were removed.
    pub fn undo(&mut self) -> Option<usize> {
        let ids: AHashSet<String> = self.history.pop()?.into_iter().collect();
        let before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(&n.id));
        Some(before - self.nodes.len())
    }

    fn regenerate_ids(&self, nodes: &mut [FlowNode]) {
        let mut taken = self.node_ids();
        let mut ids = RandomIds;
        let mut renamed = AHashMap::new();
        for node in nodes.iter_mut() {
            let fresh = loop {
                let candidate = ids.next_id();
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(fresh.clone());
            renamed.insert(std::mem::replace(&mut node.id, fresh.clone()), fresh);
        }
        for node in nodes.iter_mut() {
            for port in &mut node.wires {
                for target in port.iter_mut() {
                    if let Some(new_id) = renamed.get(target) {
                        *target = new_id.clone();
                    }
                }
            }
        }
    }
}

impl FlowHost for MemoryHost {
    fn active_workspace(&self) -> Option<String> {
        self.active_workspace.clone()
    }

    fn node_ids(&self) -> AHashSet<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    fn workspace_nodes(&self, workspace: &str) -> Vec<FlowNode> {
        self.nodes
            .iter()
            .filter(|n| n.z.as_deref() == Some(workspace))
            .cloned()
            .collect()
    }

    fn import_nodes(
        &mut self,
        nodes: &[FlowNode],
        options: ImportOptions,
    ) -> Result<(), HostError> {
        self.import_calls += 1;

        let mut staged = nodes.to_vec();
        if options.generate_ids {
            self.regenerate_ids(&mut staged);
        }

        let mut seen = self.node_ids();
        for node in &staged {
            if !seen.insert(node.id.clone()) {
                return Err(HostError::DuplicateId(node.id.clone()));
            }
        }

        // Nothing lands in the document unless every event went through.
        for node in &staged {
            self.emitter.emit(
                "nodes:add",
                &json!({ "id": node.id, "type": node.node_type, "z": node.z }),
            )?;
        }
        self.emitter
            .emit("view:import", &json!({ "count": staged.len() }))?;

        if options.add_to_history {
            self.history
                .push(staged.iter().map(|n| n.id.clone()).collect());
        }
        self.nodes.extend(staged);
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) {
        self.notifications.push(notification.clone());
    }

    fn emitter(&self) -> SharedEmitter {
        Arc::clone(&self.emitter)
    }

    fn set_emitter(&mut self, emitter: SharedEmitter) {
        self.emitter = emitter;
    }
}
