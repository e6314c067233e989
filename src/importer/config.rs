use crate::sanitizer::RemapPolicy;
use serde::{Deserialize, Serialize};
use std::fs;

/// When a validation report blocks a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortPolicy {
    /// Any issue aborts, informational ones included.
    #[default]
    AnyIssue,
    /// Only error-severity issues abort.
    ErrorsOnly,
}

/// Serializable import settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub remap_policy: RemapPolicy,
    pub abort_policy: AbortPolicy,
    pub auto_layout: bool,
}

impl ImportConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}
