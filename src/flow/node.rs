use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output ports of a node, each an ordered list of downstream node ids.
pub type Wires = Vec<Vec<String>>;

/// A single graph node, as authored by the model or read from the host.
///
/// Only `id`, `type`, `wires` and `z` are interpreted by the import pipeline.
/// Every other field lands in `extra` and is written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub wires: Wires,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            wires: Vec::new(),
            z: None,
            extra: Map::new(),
        }
    }

    /// Builder-style setter for a type-specific property.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn with_wires(mut self, wires: Wires) -> Self {
        self.wires = wires;
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Lower-cased type, used for the substring-based validation rules.
    pub fn kind(&self) -> String {
        self.node_type.to_lowercase()
    }

    /// Whether this node is a workspace container (`tab`).
    pub fn is_tab(&self) -> bool {
        self.node_type.trim().eq_ignore_ascii_case("tab")
    }

    /// All wire targets across every output port.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.wires.iter().flatten().map(String::as_str)
    }

    /// The `name` property, if the node carries a string one.
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Canvas position, when both coordinates are numeric.
    pub fn position(&self) -> Option<(f64, f64)> {
        let x = self.get("x")?.as_f64()?;
        let y = self.get("y")?.as_f64()?;
        Some((x, y))
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.extra.insert("x".to_string(), Value::from(x));
        self.extra.insert("y".to_string(), Value::from(y));
    }
}
