//! Baked-frames JSON: the mesh plus every clip sampled at a fixed frame rate.

use std::sync::Arc;

use serde_json::{json, Value as Json};
use slotforge_mesh::ProcessedMesh;

use crate::baking::{bake_clip, BakedClip, BakingConfig};
use crate::data::AnimationClip;
use crate::error::AnimationError;

pub const BAKED_FORMAT_VERSION: u32 = 1;

pub fn export_baked(
    element_id: &str,
    mesh: &ProcessedMesh,
    clips: &[Arc<AnimationClip>],
    cfg: &BakingConfig,
) -> Result<Json, AnimationError> {
    let baked: Vec<BakedClip> = clips.iter().map(|clip| bake_clip(clip, cfg)).collect();
    Ok(json!({
        "format": "baked",
        "version": BAKED_FORMAT_VERSION,
        "elementId": element_id,
        "mesh": {
            "vertices": mesh.simplified_points,
            "triangles": mesh.triangles,
            "boundingBox": mesh.bounding_box,
        },
        "clips": serde_json::to_value(baked)?,
    }))
}
