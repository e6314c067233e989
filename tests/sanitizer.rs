//! Tests for the sanitation steps, driven directly through `Sanitizer`.
mod common;
use common::*;
use flowport::flow::SanitizeWarning;
use flowport::prelude::*;
use flowport::sanitizer::SequentialIds;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn sanitizer(policy: RemapPolicy) -> Sanitizer {
    Sanitizer::builder()
        .with_policy(policy)
        .with_id_generator(Box::new(SequentialIds::new("gen")))
        .build()
}

fn candidates(value: Value) -> Vec<Value> {
    value.into_candidates().unwrap()
}

fn workspace(ws: &str) -> SanitizeContext {
    SanitizeContext::capture(&MemoryHost::new().with_workspace(ws))
}

#[test]
fn test_records_without_usable_type_are_dropped() {
    let input = candidates(json!([
        {"id": "a", "type": "inject"},
        {"id": "b"},
        {"id": "c", "type": ""},
        {"id": "d", "type": "   "},
        {"id": "e", "type": null},
        {"id": "f", "type": {"nested": true}},
        "not an object",
        {"id": "g", "type": 7}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));

    let ids: Vec<&str> = batch.ids().collect();
    assert_eq!(ids, vec!["a", "g"]);
    assert_eq!(batch.nodes[1].node_type, "7");
    assert_batch_integrity(&batch.nodes);
}

#[test]
fn test_missing_and_empty_ids_are_generated() {
    let input = candidates(json!([
        {"type": "inject"},
        {"id": "", "type": "debug"},
        {"id": 42, "type": "function"}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));

    let ids: Vec<&str> = batch.ids().collect();
    assert_eq!(ids, vec!["gen1", "gen2", "42"]);
}

#[test]
fn test_conservative_keeps_free_ids_and_renames_collisions() {
    let host = populated_host();
    let ctx = SanitizeContext::capture(&host);
    let input = candidates(json!([
        {"id": "existing1", "type": "inject", "wires": [["mine"]]},
        {"id": "mine", "type": "debug", "active": true, "tosidebar": true}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &ctx);

    assert_eq!(batch.nodes[0].id, "gen1");
    assert_eq!(batch.nodes[1].id, "mine");
    assert_eq!(batch.nodes[0].wires, vec![vec!["mine".to_string()]]);
    assert_eq!(batch.remap.resolve("existing1"), Some("gen1"));
    assert_eq!(batch.remap.renamed().count(), 1);
}

#[test]
fn test_conservative_rewrites_wires_to_renamed_targets() {
    let host = populated_host();
    let ctx = SanitizeContext::capture(&host);
    let input = candidates(json!([
        {"id": "source", "type": "inject", "wires": [["existing2"]]},
        {"id": "existing2", "type": "debug", "active": true, "tosidebar": true}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &ctx);

    assert_eq!(batch.nodes[1].id, "gen1");
    assert_eq!(batch.nodes[0].wires, vec![vec!["gen1".to_string()]]);
    assert!(!batch.ids().any(|id| id == "existing2"));
}

#[test]
fn test_duplicate_ids_in_batch_resolve_to_first_claim() {
    let input = candidates(json!([
        {"id": "x", "type": "inject", "wires": [["y"]]},
        {"id": "y", "type": "function"},
        {"id": "y", "type": "debug"}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));

    let ids: Vec<&str> = batch.ids().collect();
    assert_eq!(ids, vec!["x", "y", "gen1"]);
    assert_eq!(batch.nodes[0].wires, vec![vec!["y".to_string()]]);
    assert_batch_integrity(&batch.nodes);
}

#[test]
fn test_aggressive_renames_everything_and_drops_external_refs() {
    let input = candidates(json!([
        {"id": "a", "type": "inject", "wires": [["b", "outside"]]},
        {"id": "b", "type": "debug"}
    ]));
    let batch = sanitizer(RemapPolicy::Aggressive).sanitize(input, &workspace("ws"));

    let ids: Vec<&str> = batch.ids().collect();
    assert_eq!(ids, vec!["gen1", "gen2"]);
    assert_eq!(batch.nodes[0].wires, vec![vec!["gen2".to_string()]]);
    assert_eq!(batch.remap.len(), 2);
}

#[test]
fn test_wire_shapes_are_normalized() {
    let input = candidates(json!([
        {"id": "a", "type": "switch", "wires": [["b", null], "b", [3]]},
        {"id": "b", "type": "function", "wires": "nonsense"},
        {"id": "3", "type": "function"}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));

    assert_eq!(
        batch.nodes[0].wires,
        vec![vec!["b".to_string()], vec![], vec!["3".to_string()]]
    );
    assert!(batch.nodes[1].wires.is_empty());
}

#[rstest]
#[case("tab")]
#[case("Tab")]
#[case("TAB")]
#[case("  tab ")]
fn test_tab_nodes_are_excluded(#[case] tab_type: &str) {
    let input = candidates(json!([
        {"id": "t", "type": tab_type, "label": "Flow"},
        {"id": "a", "type": "inject", "z": "t", "wires": [["t"]]}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));

    assert_eq!(batch.len(), 1);
    assert_eq!(batch.nodes[0].id, "a");
    assert_eq!(batch.nodes[0].wires, vec![Vec::<String>::new()]);
}

#[test]
fn test_dangling_targets_are_pruned_and_ports_kept() {
    let input = candidates(json!([
        {"id": "a", "type": "switch", "wires": [["ghost"], ["b"]]},
        {"id": "b", "type": "function"}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));

    assert_eq!(
        batch.nodes[0].wires,
        vec![Vec::<String>::new(), vec!["b".to_string()]]
    );
    assert_batch_integrity(&batch.nodes);
}

#[test]
fn test_workspace_overrides_authored_z() {
    let input = candidates(json!([{"id": "a", "type": "inject", "z": "flow1"}]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("real-ws"));

    assert_eq!(batch.nodes[0].z.as_deref(), Some("real-ws"));
    assert!(batch.warnings.is_empty());
}

#[test]
fn test_unresolved_workspace_keeps_z_and_warns() {
    let input = candidates(json!([
        {"id": "a", "type": "inject", "z": "flow1"},
        {"id": "b", "type": "inject"}
    ]));
    let ctx = SanitizeContext::capture(&MemoryHost::new().with_workspace(""));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &ctx);

    assert_eq!(batch.nodes[0].z.as_deref(), Some("flow1"));
    assert_eq!(batch.nodes[1].z, None);
    assert_eq!(batch.warnings, vec![SanitizeWarning::WorkspaceUnresolved]);
}

#[test]
fn test_unknown_fields_survive() {
    let input = candidates(json!([
        {"id": "f", "type": "function", "name": "calc", "func": "return msg;", "outputs": 2}
    ]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));

    let node = &batch.nodes[0];
    assert_eq!(node.name(), Some("calc"));
    assert_eq!(node.get("func"), Some(&json!("return msg;")));
    assert_eq!(node.get("outputs"), Some(&json!(2)));
}

#[test]
fn test_snapshot_does_not_alias_batch() {
    let input = candidates(json!([{"id": "a", "type": "inject", "name": "before"}]));
    let mut batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));
    let snapshot = batch.snapshot();

    batch.nodes[0].extra.insert("name".to_string(), json!("after"));
    assert_eq!(snapshot[0].name(), Some("before"));

    batch.seal();
    assert_eq!(batch.snapshot()[0].name(), Some("after"));
    assert_eq!(snapshot[0].name(), Some("before"));
}

#[test]
fn test_empty_input_gives_empty_batch() {
    let input = candidates(json!([{"type": "tab"}, {"id": "x"}]));
    let batch = sanitizer(RemapPolicy::Conservative).sanitize(input, &workspace("ws"));
    assert!(batch.is_empty());
}

#[test]
fn test_auto_layout_places_only_unpositioned_nodes() {
    let input = candidates(json!([
        {"id": "a", "type": "inject", "x": 300, "y": 200},
        {"id": "b", "type": "function"},
        {"id": "c", "type": "debug"}
    ]));
    let mut sanitizer = Sanitizer::builder().with_auto_layout(true).build();
    let batch = sanitizer.sanitize(input, &workspace("ws"));

    assert_eq!(batch.nodes[0].position(), Some((300.0, 200.0)));
    assert_eq!(batch.nodes[1].position(), Some((100.0, 350.0)));
    assert_eq!(batch.nodes[2].position(), Some((250.0, 350.0)));
}
