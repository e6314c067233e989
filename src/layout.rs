//! Grid placement for nodes without coordinates, and a starter flow.

use crate::flow::FlowNode;
use crate::sanitizer::{IdGenerator, RandomIds};
use serde_json::json;

pub const GRID_SPACING: f64 = 150.0;
pub const NODES_PER_ROW: usize = 5;
pub const DEFAULT_ORIGIN: (f64, f64) = (100.0, 100.0);

/// Places every node on a grid starting at `origin`, wrapping after [`NODES_PER_ROW`].
pub fn position_nodes(nodes: &mut [FlowNode], origin: Option<(f64, f64)>) {
    let (start_x, start_y) = origin.unwrap_or(DEFAULT_ORIGIN);
    for (index, node) in nodes.iter_mut().enumerate() {
        let column = (index % NODES_PER_ROW) as f64;
        let row = (index / NODES_PER_ROW) as f64;
        node.set_position(start_x + column * GRID_SPACING, start_y + row * GRID_SPACING);
    }
}

/// Grid-places only the nodes that have no numeric position, keeping the rest where the
/// model put them. Unpositioned nodes are laid out below the lowest positioned one.
pub(crate) fn place_unpositioned(nodes: &mut [FlowNode]) {
    let lowest = nodes
        .iter()
        .filter_map(FlowNode::position)
        .map(|(_, y)| y)
        .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |a| a.max(y))));
    let origin = match lowest {
        Some(y) => (DEFAULT_ORIGIN.0, y + GRID_SPACING),
        None => DEFAULT_ORIGIN,
    };

    let mut pending: Vec<&mut FlowNode> = nodes
        .iter_mut()
        .filter(|n| n.position().is_none())
        .collect();
    for (index, node) in pending.iter_mut().enumerate() {
        let column = (index % NODES_PER_ROW) as f64;
        let row = (index / NODES_PER_ROW) as f64;
        node.set_position(origin.0 + column * GRID_SPACING, origin.1 + row * GRID_SPACING);
    }
}

/// A ready-made set of nodes with a short description.
#[derive(Debug, Clone)]
pub struct FlowTemplate {
    pub description: String,
    pub nodes: Vec<FlowNode>,
}

/// A timestamp inject node wired to an active sidebar debug node.
pub fn basic_flow(description: Option<&str>) -> FlowTemplate {
    let mut ids = RandomIds;
    let inject_id = ids.next_id();
    let debug_id = ids.next_id();

    let inject = FlowNode::new(&inject_id, "inject")
        .with("name", json!("Start"))
        .with("topic", json!(""))
        .with("payload", json!(""))
        .with("payloadType", json!("date"))
        .with("repeat", json!(""))
        .with("crontab", json!(""))
        .with("once", json!(false))
        .with("onceDelay", json!(0.1))
        .with("x", json!(100))
        .with("y", json!(100))
        .with_wires(vec![vec![debug_id.clone()]]);

    let debug = FlowNode::new(&debug_id, "debug")
        .with("name", json!("Output"))
        .with("active", json!(true))
        .with("tosidebar", json!(true))
        .with("console", json!(false))
        .with("tostatus", json!(false))
        .with("complete", json!("false"))
        .with("x", json!(300))
        .with("y", json!(100));

    FlowTemplate {
        description: description.unwrap_or("Basic flow template").to_string(),
        nodes: vec![inject, debug],
    }
}
