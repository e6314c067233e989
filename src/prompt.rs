//! Flow context and prompt text sent to the model alongside the user's request.

use crate::flow::FlowNode;
use crate::host::FlowHost;
use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

/// Properties worth quoting back to the model, per node.
const CONTEXT_PROPERTIES: [&str; 5] = ["topic", "payload", "url", "method", "func"];

const PREAMBLE: &str = "You are a helpful Node-RED flow assistant. You help users create, modify, and understand Node-RED flows.

FLOW JSON REQUIREMENTS:
- Always wrap flow JSON in ```json code blocks
- Use proper Node-RED node structure with id, type, name, x, y, z, wires properties
- Generate unique IDs for each node (use random strings like \"abc123\")
- Set appropriate x, y coordinates for visual layout (spread nodes out, typical spacing is 150-200 pixels)
- Include the 'z' property with the workspace ID (use \"flow1\" as default)
- Ensure wires array connects nodes properly (array of arrays, each sub-array represents output port connections)
- Include all necessary properties for each node type
- For inject nodes: set repeat to \"\" and crontab to \"\"
- For function nodes: include complete JavaScript code in 'func' property
- For debug nodes: set console to \"false\" and tostatus to false
- Make flows that actually work and are useful

";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: Option<String>,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

/// A compact view of the workspace the user is looking at.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowContext {
    pub workspace: String,
    pub nodes: Vec<ContextNode>,
    pub connections: Vec<Connection>,
}

impl FlowContext {
    /// Captures the active workspace. `None` when the host has no active workspace.
    pub fn capture<H: FlowHost + ?Sized>(host: &H) -> Option<Self> {
        let workspace = host.active_workspace()?;
        let nodes = host.workspace_nodes(&workspace);
        Some(Self::from_nodes(workspace, &nodes))
    }

    pub fn from_nodes(workspace: impl Into<String>, nodes: &[FlowNode]) -> Self {
        let context_nodes = nodes
            .iter()
            .map(|node| ContextNode {
                id: node.id.clone(),
                node_type: node.node_type.clone(),
                name: node.name().filter(|n| !n.is_empty()).map(str::to_string),
                properties: CONTEXT_PROPERTIES
                    .iter()
                    .filter_map(|key| node.get(key).map(|v| (key.to_string(), v.clone())))
                    .collect(),
            })
            .collect();

        let connections = nodes
            .iter()
            .flat_map(|node| {
                node.targets().map(move |target| Connection {
                    from: node.id.clone(),
                    to: target.to_string(),
                })
            })
            .unique_by(|c| (c.from.clone(), c.to.clone()))
            .collect();

        Self {
            workspace: workspace.into(),
            nodes: context_nodes,
            connections,
        }
    }

    fn label(&self, id: &str) -> String {
        match self.nodes.iter().find(|n| n.id == id) {
            Some(node) => format!(
                "{} ({})",
                node.node_type,
                node.name.as_deref().unwrap_or(&node.id)
            ),
            None => id.to_string(),
        }
    }

    /// Plain-text description embedded in the prompt.
    pub fn describe(&self) -> String {
        if self.nodes.is_empty() {
            return "No current flow context available.".to_string();
        }

        let mut out = String::from("Current Node-RED flow context:\n\nNODES:\n");
        for node in &self.nodes {
            out.push_str(&format!("- {} (ID: {})", node.node_type, node.id));
            if let Some(name) = &node.name {
                out.push_str(&format!(" - Name: \"{}\"", name));
            }
            for key in ["topic", "payload", "url", "method"] {
                if let Some(text) = node.properties.get(key).and_then(non_empty_text) {
                    out.push_str(&format!(" - {}: \"{}\"", capitalize(key), text));
                }
            }
            if let Some(func) = node.properties.get("func").and_then(Value::as_str) {
                out.push_str(&format!(
                    " - Function code length: {} chars",
                    func.chars().count()
                ));
            }
            out.push('\n');
        }

        if !self.connections.is_empty() {
            out.push_str("\nCONNECTIONS:\n");
            let lines = self
                .connections
                .iter()
                .map(|c| format!("- {} → {}", self.label(&c.from), self.label(&c.to)))
                .join("\n");
            out.push_str(&lines);
            out.push('\n');
        }
        out
    }
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds the full prompt: fixed instructions, optional flow context, then the request.
pub fn build_prompt(user_prompt: &str, context: Option<&FlowContext>) -> String {
    let mut prompt = String::from(PREAMBLE);
    if let Some(context) = context {
        prompt.push_str(&context.describe());
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!(
        "USER REQUEST: {}\n\nPlease provide a helpful response. If the user is asking for a flow, provide working Node-RED JSON that accomplishes their goal.",
        user_prompt
    ));
    prompt
}
