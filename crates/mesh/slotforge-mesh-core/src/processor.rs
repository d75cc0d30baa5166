//! Contour -> ProcessedMesh pipeline.
//!
//! Steps, in order: coordinate conversion, cleanup of unusable points, target
//! vertex budget, simplification, triangulation, descriptors, quality grade.

use serde::{Deserialize, Serialize};

use crate::config::MeshConfig;
use crate::element::ElementKind;
use crate::geometry::{area, bounding_box, perimeter, BoundingBox, Point};
use crate::quality::{self, MeshQuality};
use crate::sampler::{trace_contour, ImageSampler};
use crate::simplify::simplify_with_factor;
use crate::triangulate::triangulate;

/// Coordinate space of the incoming contour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordSpace {
    #[default]
    Pixels,
    /// Percent of image width/height (0..100).
    Percent,
}

/// One mesh-processing request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshRequest {
    pub points: Vec<Point>,
    #[serde(default)]
    pub space: CoordSpace,
    /// Free-form role name, resolved with [`ElementKind::from_name`].
    pub element_type: String,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(default)]
    pub target_point_count: Option<usize>,
}

impl MeshRequest {
    pub fn pixels(points: Vec<Point>, element_type: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            points,
            space: CoordSpace::Pixels,
            element_type: element_type.into(),
            image_width: width,
            image_height: height,
            target_point_count: None,
        }
    }

    pub fn with_target(mut self, target: usize) -> Self {
        self.target_point_count = Some(target);
        self
    }
}

/// Immutable result of a processing request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedMesh {
    pub element_type: ElementKind,
    pub original_points: Vec<Point>,
    pub simplified_points: Vec<Point>,
    /// Flat index triples into `simplified_points`.
    pub triangles: Vec<u32>,
    pub bounding_box: BoundingBox,
    pub area: f32,
    pub perimeter: f32,
    pub quality: MeshQuality,
    pub quality_score: f32,
}

impl ProcessedMesh {
    /// Whether the mesh can be rendered (has at least one triangle).
    #[inline]
    pub fn is_renderable(&self) -> bool {
        !self.triangles.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// Stateless mesh builder. Cheap to clone; one per worker.
#[derive(Clone, Debug, Default)]
pub struct MeshProcessor {
    cfg: MeshConfig,
}

impl MeshProcessor {
    pub fn new(cfg: MeshConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.cfg
    }

    /// Run the full pipeline. Never fails: fewer than 3 usable points produce a
    /// mesh with no triangles, zero area/perimeter and `low` quality.
    pub fn process(&self, request: &MeshRequest) -> ProcessedMesh {
        let kind = ElementKind::from_name(&request.element_type);
        let original = to_pixel_space(request);
        let usable = usable_points(&original);

        if usable.len() < 3 {
            log::warn!(
                "mesh: degenerate contour for '{}' ({} usable points)",
                request.element_type,
                usable.len()
            );
            return self.degenerate(kind, original, usable);
        }

        let target = request
            .target_point_count
            .unwrap_or_else(|| kind.default_target_points())
            .min(usable.len());
        let simplified = simplify_with_factor(&usable, target, self.cfg.simplify_tolerance_factor);
        let triangles = triangulate(&simplified);
        let mesh_area = area(&simplified);
        let mesh_perimeter = perimeter(&simplified);

        let breakdown = quality::score(
            simplified.len(),
            triangles.len() / 3,
            mesh_area,
            mesh_perimeter,
        );
        let score = breakdown.total();
        let grade = MeshQuality::from_score(score, &self.cfg.quality);
        log::debug!(
            "mesh: '{}' as {}: {} -> {} points, {} triangles, quality {:?} ({:.1})",
            request.element_type,
            kind,
            original.len(),
            simplified.len(),
            triangles.len() / 3,
            grade,
            score
        );

        ProcessedMesh {
            element_type: kind,
            bounding_box: bounding_box(&simplified),
            original_points: original,
            simplified_points: simplified,
            triangles,
            area: mesh_area,
            perimeter: mesh_perimeter,
            quality: grade,
            quality_score: score,
        }
    }

    /// Trace the silhouette of `sampler` and process it as a pixel-space contour.
    pub fn process_image<S: ImageSampler + ?Sized>(
        &self,
        sampler: &S,
        element_type: &str,
        target_point_count: Option<usize>,
    ) -> ProcessedMesh {
        let contour = trace_contour(sampler, self.cfg.alpha_threshold);
        let request = MeshRequest {
            points: contour,
            space: CoordSpace::Pixels,
            element_type: element_type.to_string(),
            image_width: sampler.width(),
            image_height: sampler.height(),
            target_point_count,
        };
        self.process(&request)
    }

    fn degenerate(&self, kind: ElementKind, original: Vec<Point>, usable: Vec<Point>) -> ProcessedMesh {
        let breakdown = quality::score(usable.len(), 0, 0.0, 0.0);
        ProcessedMesh {
            element_type: kind,
            bounding_box: bounding_box(&usable),
            original_points: original,
            simplified_points: usable,
            triangles: Vec::new(),
            area: 0.0,
            perimeter: 0.0,
            quality: MeshQuality::Low,
            quality_score: breakdown.total(),
        }
    }
}

fn to_pixel_space(request: &MeshRequest) -> Vec<Point> {
    match request.space {
        CoordSpace::Pixels => request.points.clone(),
        CoordSpace::Percent => {
            let (w, h) = (request.image_width as f32, request.image_height as f32);
            request
                .points
                .iter()
                .map(|p| Point::new(p.x / 100.0 * w, p.y / 100.0 * h))
                .collect()
        }
    }
}

/// Drop non-finite points and consecutive duplicates, including a closing
/// duplicate of the first point.
fn usable_points(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points.iter().filter(|p| p.is_finite()) {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}
