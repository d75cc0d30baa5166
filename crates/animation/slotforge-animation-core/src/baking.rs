//! Baking API: sample a clip at a fixed frame rate into per-property tracks.

use serde::{Deserialize, Serialize};

use crate::data::AnimationClip;
use crate::sampling::sample_property;
use crate::value::{Property, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked samples.
    pub frame_rate: f32,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self { frame_rate: 60.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedTrack {
    pub property: Property,
    /// One value per frame, frame 0 at time 0, last frame at the clip end.
    pub values: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakedClip {
    pub clip_id: String,
    pub element_id: String,
    pub frame_rate: f32,
    /// Seconds.
    pub duration: f32,
    pub frame_count: usize,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub tracks: Vec<BakedTrack>,
}

/// Bake every animated property of `clip`.
pub fn bake_clip(clip: &AnimationClip, cfg: &BakingConfig) -> BakedClip {
    let fr = if cfg.frame_rate.is_finite() && cfg.frame_rate > 0.0 {
        cfg.frame_rate
    } else {
        60.0
    };
    let fr = fr.max(1.0);
    let duration = clip.duration.max(0.0);
    let frame_count = (duration * fr).ceil() as usize + 1; // inclusive of end

    let tracks = clip
        .properties()
        .into_iter()
        .map(|property| {
            let values = (0..frame_count)
                .filter_map(|f| {
                    let t = (f as f32 / fr).min(duration);
                    let u = if duration > 0.0 { t / duration } else { 0.0 };
                    sample_property(clip, property, u)
                })
                .collect();
            BakedTrack { property, values }
        })
        .collect();

    BakedClip {
        clip_id: clip.id.clone(),
        element_id: clip.element_id.clone(),
        frame_rate: fr,
        duration,
        frame_count,
        looping: clip.looping,
        tracks,
    }
}
