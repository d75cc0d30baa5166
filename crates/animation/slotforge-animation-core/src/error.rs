//! Error types for clip generation, playback and export

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// Clip keyframes or timing violate the clip invariants.
    #[error("Invalid clip {id}: {reason}")]
    InvalidClip { id: String, reason: String },

    #[error("Clip not found: {id}")]
    ClipNotFound { id: String },

    /// A motion profile carries out-of-range parameters.
    #[error("Invalid motion profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("Export to {format} failed: {reason}")]
    Export { format: String, reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimationError {
    pub(crate) fn invalid_clip(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidClip {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidClip { .. } | Self::InvalidProfile { .. } => "validation",
            Self::ClipNotFound { .. } => "data",
            Self::Export { .. } => "export",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
