//! Mesh pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::simplify::DEFAULT_TOLERANCE_FACTOR;

/// Configuration for [`crate::MeshProcessor`]. Every field has a default so a
/// partial JSON object is enough to override one knob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Multiplier in the simplification tolerance formula.
    pub simplify_tolerance_factor: f32,
    /// Alpha values strictly above this count as opaque when tracing.
    pub alpha_threshold: u8,
    pub quality: QualityThresholds,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance_factor: DEFAULT_TOLERANCE_FACTOR,
            alpha_threshold: 10,
            quality: QualityThresholds::default(),
        }
    }
}

/// Minimum score (0..100) for each grade above `low`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub ultra: f32,
    pub high: f32,
    pub medium: f32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            ultra: 85.0,
            high: 70.0,
            medium: 50.0,
        }
    }
}
