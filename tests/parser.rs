//! Tests for fenced-block extraction and candidate normalization.
mod common;
use common::*;
use flowport::flow::IntoCandidates;
use flowport::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_message_without_block_is_not_found() {
    let result = parse_message("no code here");
    assert!(matches!(result, Err(ParseError::NoJsonBlock)));
    assert_eq!(extract_json_block("no code here"), None);
}

#[test]
fn test_first_block_wins() {
    let message = "first:\n```json\n[{\"type\":\"a\"}]\n```\nsecond:\n```json\n[{\"type\":\"b\"}]\n```";
    assert_eq!(extract_json_block(message), Some("[{\"type\":\"a\"}]"));

    let candidates = parse_message(message).unwrap();
    assert_eq!(candidates, vec![json!({"type": "a"})]);
}

#[test]
fn test_untagged_block_is_ignored() {
    let message = "```\n[{\"type\":\"inject\"}]\n```";
    assert!(matches!(parse_message(message), Err(ParseError::NoJsonBlock)));
}

#[test]
fn test_block_tolerates_whitespace_around_fences() {
    let message = "```json   \n[{\"type\":\"inject\"}]\n   ```";
    assert_eq!(parse_message(message).unwrap().len(), 1);
}

#[test]
fn test_invalid_json_keeps_offending_text() {
    let message = fenced("[{\"type\": \"inject\",}]");
    match parse_message(&message) {
        Err(ParseError::InvalidJson { text, .. }) => assert_eq!(text, "[{\"type\": \"inject\",}]"),
        other => panic!("Expected InvalidJson, got {:?}", other),
    }
}

#[test]
fn test_three_shapes_normalize_to_candidates() {
    let bare = parse_message(&fenced(r#"[{"type":"inject"},{"type":"debug"}]"#)).unwrap();
    let wrapped =
        parse_message(&fenced(r#"{"label":"x","nodes":[{"type":"inject"},{"type":"debug"}]}"#))
            .unwrap();
    let single = parse_message(&fenced(r#"{"type":"inject","name":"solo"}"#)).unwrap();

    assert_eq!(bare, wrapped);
    assert_eq!(single, vec![json!({"type": "inject", "name": "solo"})]);
}

#[test]
fn test_scalar_body_yields_no_candidates() {
    assert_eq!(parse_message(&fenced("42")).unwrap(), Vec::<serde_json::Value>::new());
    assert_eq!(parse_message(&fenced(r#""flow""#)).unwrap(), Vec::<serde_json::Value>::new());
}

#[test]
fn test_blank_nodes_field_means_single_node() {
    let candidates =
        parse_message(&fenced(r#"{"type":"inject","payload":"x","nodes":null}"#)).unwrap();
    assert_eq!(
        candidates,
        vec![json!({"type": "inject", "payload": "x", "nodes": null})]
    );

    let candidates = json!({"type": "debug", "nodes": false}).into_candidates().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["type"], "debug");
}

#[test]
fn test_non_array_nodes_field_is_unsupported() {
    assert!(matches!(
        json!({"nodes": "oops"}).into_candidates(),
        Err(ParseError::UnsupportedShape { found: "a string" })
    ));
    assert!(matches!(
        parse_message(&fenced(r#"{"nodes": {"type": "inject"}}"#)),
        Err(ParseError::UnsupportedShape { found: "an object" })
    ));
}

#[test]
fn test_parsing_is_idempotent() {
    let message = fenced(TWO_NODES_WITH_TAB);
    assert_eq!(parse_message(&message).unwrap(), parse_message(&message).unwrap());
}

#[test]
fn test_has_importable_flow() {
    assert!(has_importable_flow(&fenced("[]")));
    assert!(has_importable_flow(&fenced(r#"{"nodes": []}"#)));
    assert!(!has_importable_flow(&fenced(r#"{"type": "inject"}"#)));
    assert!(!has_importable_flow(&fenced(r#"{"type": "inject", "nodes": null}"#)));
    assert!(!has_importable_flow(&fenced("not json")));
    assert!(!has_importable_flow("plain text"));
}

#[test]
fn test_typed_nodes_convert_to_candidates() {
    let nodes = vec![FlowNode::new("n1", "inject").with("payload", json!("hi"))];
    let candidates = nodes.into_candidates().unwrap();
    assert_eq!(
        candidates,
        vec![json!({"id": "n1", "type": "inject", "wires": [], "payload": "hi"})]
    );
}
