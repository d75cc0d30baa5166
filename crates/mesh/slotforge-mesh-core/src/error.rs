//! Error types for mesh processing.
//!
//! Degenerate geometry is never an error; these cover malformed inputs at the
//! edges of the crate (pixel buffers, serialized requests).

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MeshError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid image buffer: expected {expected} bytes, got {actual}")]
    InvalidImageBuffer { expected: usize, actual: usize },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl MeshError {
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidDimensions { .. } | Self::InvalidImageBuffer { .. } => "image",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for MeshError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
