use crate::validator::Issue;
use thiserror::Error;

/// Errors raised while extracting a flow from an assistant message.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("No JSON flow found in message")]
    NoJsonBlock,

    #[error("Flow block is not valid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        /// The offending block body, kept for diagnostics.
        text: String,
    },

    #[error("Flow `nodes` field must be an array, found {found}")]
    UnsupportedShape { found: &'static str },
}

/// Errors reported by a host document while committing nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Event '{event}' failed: {message}")]
    Event { event: String, message: String },

    #[error("Node id '{0}' already exists in the document")]
    DuplicateId(String),

    #[error("{0}")]
    Rejected(String),
}

/// Reasons an import stopped before or during the commit.
///
/// The import coordinator converts each of these into a single user-facing
/// notification; none of them escapes to the host.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("No valid nodes found (removed tab/blank nodes)")]
    EmptyBatch,

    #[error("Flow appears malformed: {} issue(s) found", issues.len())]
    ValidationFailed { issues: Vec<Issue> },

    #[error("Node '{node_id}' has an invalid shape: {reason}")]
    InvalidNodeShape { node_id: String, reason: String },

    #[error("Host rejected the import: {0}")]
    HostCommit(#[from] HostError),
}

/// Errors from the conversation manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Chat '{0}' not found")]
    NotFound(String),
}

/// Errors from the flat-file chat store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid chat file name '{0}'")]
    InvalidFileName(String),

    #[error("No stored chat with id '{0}'")]
    ChatNotFound(String),
}
