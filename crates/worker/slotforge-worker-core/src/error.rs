//! Error types for the worker dispatcher

use serde::{Deserialize, Serialize};

use crate::protocol::TaskKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DispatchError {
    /// The worker answered with an `ERROR` response.
    #[error("Worker error: {reason}")]
    Worker { reason: String },

    /// The pool shut down (or the worker died) before the task resolved.
    #[error("Task {id} was dropped before it resolved")]
    Disconnected { id: String },

    /// `wait_timeout` elapsed. The task itself keeps running.
    #[error("Task {id} did not resolve within {millis} ms")]
    Timeout { id: String, millis: u64 },

    /// A worker thread could not be started.
    #[error("Failed to spawn worker: {reason}")]
    Spawn { reason: String },

    /// The request data does not match the task kind.
    #[error("Invalid {kind:?} payload: {reason}")]
    InvalidPayload { kind: TaskKind, reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl DispatchError {
    /// Whether resubmitting the same task might succeed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Disconnected { .. })
    }

    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Worker { .. } => "worker",
            Self::Disconnected { .. } | Self::Timeout { .. } => "lifecycle",
            Self::Spawn { .. } => "spawn",
            Self::InvalidPayload { .. } => "validation",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
