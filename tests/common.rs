//! Common test utilities for building messages, hosts and emitters.
use flowport::error::HostError;
use flowport::host::{EventEmitter, SharedEmitter};
use flowport::prelude::*;
use flowport::sanitizer::SequentialIds;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Wraps a JSON body the way a model reply does.
#[allow(dead_code)]
pub fn fenced(body: &str) -> String {
    format!("Sure, here is the flow:\n```json\n{}\n```\nLet me know if you need changes.", body)
}

/// Importer with predictable synthetic ids (`gen1`, `gen2`, ...).
#[allow(dead_code)]
pub fn sequential_importer(policy: RemapPolicy) -> Importer {
    Importer::builder()
        .with_remap_policy(policy)
        .with_id_generator(Box::new(SequentialIds::new("gen")))
        .build()
}

/// A document with an active workspace and two existing nodes, `existing1 -> existing2`.
#[allow(dead_code)]
pub fn populated_host() -> MemoryHost {
    MemoryHost::new().with_workspace("ws1").with_nodes(vec![
        FlowNode::new("existing1", "inject").with_wires(vec![vec!["existing2".to_string()]]),
        FlowNode::new("existing2", "debug"),
    ])
}

/// Two wired nodes with a tab container, as models often emit them.
#[allow(dead_code)]
pub const TWO_NODES_WITH_TAB: &str = r#"[
    {"id": "tab1", "type": "tab", "label": "Flow 1"},
    {"id": "A", "type": "function", "func": "return msg;", "wires": [["B"]]},
    {"id": "B", "type": "debug", "active": true, "tosidebar": true, "wires": []}
]"#;

/// Asserts the committed-batch properties: unique ids and no dangling wire targets.
#[allow(dead_code)]
pub fn assert_batch_integrity(nodes: &[FlowNode]) {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), nodes.len(), "duplicate ids in {:?}", nodes);
    for node in nodes {
        assert!(!node.id.is_empty());
        assert!(!node.node_type.trim().is_empty());
        assert!(!node.is_tab());
        for target in node.targets() {
            assert!(ids.contains(target), "dangling target '{}' on {}", target, node.id);
        }
    }
}

/// Records every emitted event and optionally fails on one event name.
#[derive(Default)]
pub struct RecordingEmitter {
    pub events: Mutex<Vec<String>>,
    fail_on: Option<(String, String)>,
}

#[allow(dead_code)]
impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(event: &str, message: &str) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_on: Some((event.to_string(), message.to_string())),
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl EventEmitter for RecordingEmitter {
    fn emit(&self, event: &str, _payload: &Value) -> std::result::Result<(), HostError> {
        self.events.lock().unwrap().push(event.to_string());
        match &self.fail_on {
            Some((name, message)) if name == event => Err(HostError::Event {
                event: event.to_string(),
                message: message.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// Compares the emitter currently installed on a host with an expected one.
#[allow(dead_code)]
pub fn same_emitter(current: &SharedEmitter, expected: &SharedEmitter) -> bool {
    Arc::ptr_eq(current, expected)
}
