use super::{EventEmitter, SharedEmitter};
use crate::error::HostError;
use serde_json::Value;
use tracing::warn;

/// Message fragment of the editor defect raised by some listeners while a bulk insert
/// emits its events (a listener calls `indexOf` on a value that is not there yet).
pub const KNOWN_EMIT_DEFECT: &str = "indexOf";

/// Wraps the host emitter for the duration of a commit.
///
/// Every event is delegated to the wrapped emitter. An error carrying the known defect
/// signature is logged and swallowed so it cannot abort the insert halfway through;
/// any other error is passed back unchanged.
pub struct KnownDefectFilter {
    inner: SharedEmitter,
    signature: &'static str,
}

impl KnownDefectFilter {
    pub fn new(inner: SharedEmitter) -> Self {
        Self {
            inner,
            signature: KNOWN_EMIT_DEFECT,
        }
    }

    pub fn is_known_defect(&self, error: &HostError) -> bool {
        match error {
            HostError::Event { message, .. } => message.contains(self.signature),
            _ => false,
        }
    }
}

impl EventEmitter for KnownDefectFilter {
    fn emit(&self, event: &str, payload: &Value) -> Result<(), HostError> {
        match self.inner.emit(event, payload) {
            Err(err) if self.is_known_defect(&err) => {
                warn!(event, error = %err, "suppressed known emitter defect during import");
                Ok(())
            }
            other => other,
        }
    }
}
