//! Export adapters: translate finished clips plus their mesh into
//! third-party animation formats as `serde_json::Value`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slotforge_mesh::ProcessedMesh;

use crate::baking::BakingConfig;
use crate::data::AnimationClip;
use crate::error::AnimationError;

pub mod baked;
pub mod spine;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Spine 3.8 skeleton JSON (one bone, slot and mesh attachment per element).
    Spine,
    /// Frame-sampled property tracks.
    Baked,
}

impl ExportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Spine => "spine",
            ExportFormat::Baked => "baked",
        }
    }
}

/// Export the clips of one element. Every clip must belong to `element_id`.
pub fn export(
    format: ExportFormat,
    element_id: &str,
    mesh: &ProcessedMesh,
    clips: &[Arc<AnimationClip>],
    baking: &BakingConfig,
) -> Result<serde_json::Value, AnimationError> {
    if let Some(stray) = clips.iter().find(|c| c.element_id != element_id) {
        return Err(export_error(
            format,
            format!("clip {} belongs to element {}", stray.id, stray.element_id),
        ));
    }
    let value = match format {
        ExportFormat::Spine => spine::export_spine(element_id, mesh, clips)?,
        ExportFormat::Baked => baked::export_baked(element_id, mesh, clips, baking)?,
    };
    log::debug!(
        "exported {} clips of {element_id} as {}",
        clips.len(),
        format.name()
    );
    Ok(value)
}

pub(crate) fn export_error(format: ExportFormat, reason: impl Into<String>) -> AnimationError {
    AnimationError::Export {
        format: format.name().to_string(),
        reason: reason.into(),
    }
}
