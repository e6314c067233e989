use super::node::FlowNode;
use crate::error::ParseError;
use serde_json::Value;

/// A trait for anything that can be turned into the ordered candidate records fed to the sanitizer.
///
/// Candidates are kept as raw JSON values because model output is untrusted: a record
/// may lack a `type`, carry a numeric `id` or have `wires` of the wrong shape, and the
/// sanitizer is the one place that decides what to do about it.
///
/// # Example
///
/// ```rust
/// use flowport::flow::IntoCandidates;
/// use serde_json::json;
///
/// let flow = json!({ "nodes": [{ "type": "inject" }, { "type": "debug" }] });
/// let candidates = flow.into_candidates().unwrap();
/// assert_eq!(candidates.len(), 2);
/// ```
pub trait IntoCandidates {
    fn into_candidates(self) -> Result<Vec<Value>, ParseError>;
}

/// Accepts the three shapes a model tends to produce: a bare array of nodes, an object
/// with a `nodes` array, or a single node object.
///
/// A `nodes` key holding `null`, `false`, `0` or `""` counts as absent. A top-level scalar
/// yields no candidates, so the import ends as an empty batch rather than a parse failure.
impl IntoCandidates for Value {
    fn into_candidates(self) -> Result<Vec<Value>, ParseError> {
        match self {
            Value::Array(items) => Ok(items),
            Value::Object(mut map) => match map.remove("nodes") {
                Some(Value::Array(items)) => Ok(items),
                Some(other) if !is_blank(&other) => Err(ParseError::UnsupportedShape {
                    found: json_kind(&other),
                }),
                Some(blank) => {
                    map.insert("nodes".to_string(), blank);
                    Ok(vec![Value::Object(map)])
                }
                None => Ok(vec![Value::Object(map)]),
            },
            _ => Ok(Vec::new()),
        }
    }
}

/// Lets already-typed nodes (templates, host exports) go through the same pipeline.
impl IntoCandidates for Vec<FlowNode> {
    fn into_candidates(self) -> Result<Vec<Value>, ParseError> {
        Ok(self
            .into_iter()
            .filter_map(|node| serde_json::to_value(node).ok())
            .collect())
    }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
