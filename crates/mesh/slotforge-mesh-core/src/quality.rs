//! Mesh quality scoring.
//!
//! Four independent axes contribute up to 25 points each: vertex density,
//! triangle coverage, shape complexity and a fixed consistency baseline.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::QualityThresholds;

const AXIS_MAX: f32 = 25.0;
const CONSISTENCY_BASELINE: f32 = 20.0;
/// Isoperimetric ratio treated as ideal; compact but not perfectly round.
const IDEAL_ISOPERIMETRIC: f32 = 2.0;
const COMPLEXITY_FALLOFF: f32 = 5.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshQuality {
    Low,
    Medium,
    High,
    Ultra,
}

impl MeshQuality {
    pub fn from_score(score: f32, thresholds: &QualityThresholds) -> Self {
        if score >= thresholds.ultra {
            MeshQuality::Ultra
        } else if score >= thresholds.high {
            MeshQuality::High
        } else if score >= thresholds.medium {
            MeshQuality::Medium
        } else {
            MeshQuality::Low
        }
    }
}

/// Per-axis breakdown, mostly useful for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityBreakdown {
    pub density: f32,
    pub coverage: f32,
    pub complexity: f32,
    pub consistency: f32,
}

impl QualityBreakdown {
    pub fn total(&self) -> f32 {
        self.density + self.coverage + self.complexity + self.consistency
    }
}

/// `perimeter² / (4π·area)`; 1 for a circle. Zero area yields infinity.
pub fn isoperimetric_ratio(area: f32, perimeter: f32) -> f32 {
    if area <= 0.0 {
        return f32::INFINITY;
    }
    perimeter * perimeter / (4.0 * PI * area)
}

fn density_score(vertices: usize) -> f32 {
    match vertices {
        n if n >= 20 => 25.0,
        n if n >= 15 => 20.0,
        n if n >= 10 => 15.0,
        n if n >= 6 => 10.0,
        _ => 5.0,
    }
}

fn coverage_score(vertices: usize, triangle_count: usize) -> f32 {
    if vertices < 3 {
        return 0.0;
    }
    let max = (vertices - 2) as f32;
    (triangle_count as f32 / max).min(1.0) * AXIS_MAX
}

fn complexity_score(area: f32, perimeter: f32) -> f32 {
    let ratio = isoperimetric_ratio(area, perimeter);
    if !ratio.is_finite() {
        return 0.0;
    }
    (AXIS_MAX - (ratio - IDEAL_ISOPERIMETRIC).abs() * COMPLEXITY_FALLOFF).max(0.0)
}

/// Score a mesh from its simplified vertex count, triangle count, area and perimeter.
pub fn score(vertices: usize, triangle_count: usize, area: f32, perimeter: f32) -> QualityBreakdown {
    QualityBreakdown {
        density: density_score(vertices),
        coverage: coverage_score(vertices, triangle_count),
        complexity: complexity_score(area, perimeter),
        consistency: CONSISTENCY_BASELINE,
    }
}
