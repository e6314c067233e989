//! Extraction of the fenced JSON flow block from free-form assistant text.
//!
//! The parser looks for the *first* block opened with a JSON language tag and closed by a
//! triple backtick, parses its body and normalizes the result into candidate records.
//! It never tries to recover a partial flow: a missing block or a body that is not valid
//! JSON is reported as a [`ParseError`] and nothing else happens.

use crate::error::ParseError;
use crate::flow::IntoCandidates;
use crate::flow::conversion::is_blank;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static JSON_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```json\s*\n([\s\S]*?)\n\s*```").expect("fenced block pattern is valid")
});

/// Returns the body of the first fenced JSON block, if any.
pub fn extract_json_block(message: &str) -> Option<&str> {
    JSON_BLOCK
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses the first fenced JSON block into a raw JSON value.
pub fn parse_block(message: &str) -> Result<Value, ParseError> {
    let body = extract_json_block(message).ok_or(ParseError::NoJsonBlock)?;
    serde_json::from_str(body).map_err(|source| ParseError::InvalidJson {
        source,
        text: body.to_string(),
    })
}

/// Parses a message into the ordered candidate records for the sanitizer.
pub fn parse_message(message: &str) -> Result<Vec<Value>, ParseError> {
    parse_block(message)?.into_candidates()
}

/// True when the message carries a block that looks like a flow: an array, or an object
/// with a non-blank `nodes` field. Chat front-ends use this to decide whether to offer an import.
pub fn has_importable_flow(message: &str) -> bool {
    match parse_block(message) {
        Ok(Value::Array(_)) => true,
        Ok(Value::Object(map)) => map.get("nodes").is_some_and(|nodes| !is_blank(nodes)),
        _ => false,
    }
}
