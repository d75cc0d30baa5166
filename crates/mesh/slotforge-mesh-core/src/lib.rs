//! Slotforge Mesh Core (engine-agnostic)
//!
//! Turns sprite silhouettes into renderable triangle meshes: contour tracing,
//! geometric descriptors, vertex reduction, ear-clipping triangulation and a
//! quality grade. Everything here is synchronous and allocation-light so it can
//! run on any thread or inside a wasm worker.

pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod processor;
pub mod quality;
pub mod sampler;
pub mod simplify;
pub mod triangulate;

// Re-exports for consumers (dispatcher, animation adapters)
pub use config::{MeshConfig, QualityThresholds};
pub use element::ElementKind;
pub use error::MeshError;
pub use geometry::{
    area, bounding_box, centroid, perimeter, properties, signed_area, BoundingBox,
    GeometryProperties, Point,
};
pub use processor::{CoordSpace, MeshProcessor, MeshRequest, ProcessedMesh};
pub use quality::{MeshQuality, QualityBreakdown};
pub use sampler::{
    contour_to_percent, detect_pixel_bounds, trace_contour, AlphaMask, ImageSampler, PixelBounds,
    RgbaImage,
};
pub use simplify::simplify;
pub use triangulate::{triangulate, triangulate_flat};
