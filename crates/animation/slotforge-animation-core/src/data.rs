//! Clip data model: keyframes in normalized time, owned by exactly one clip.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::AnimationError;
use crate::value::{Property, Value};

/// Kind of clip generated per element. Also orders playback priority.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipType {
    Idle,
    Win,
    Scatter,
    Wild,
    Bonus,
    Intro,
}

impl ClipType {
    /// Generation order of a clip set.
    pub const ALL: [ClipType; 6] = [
        ClipType::Idle,
        ClipType::Win,
        ClipType::Scatter,
        ClipType::Wild,
        ClipType::Bonus,
        ClipType::Intro,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClipType::Idle => "idle",
            ClipType::Win => "win",
            ClipType::Scatter => "scatter",
            ClipType::Wild => "wild",
            ClipType::Bonus => "bonus",
            ClipType::Intro => "intro",
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            ClipType::Idle => 1,
            ClipType::Scatter => 2,
            ClipType::Win => 3,
            ClipType::Wild => 4,
            ClipType::Bonus => 5,
            ClipType::Intro => 6,
        }
    }

    pub fn loops(&self) -> bool {
        matches!(self, ClipType::Idle | ClipType::Scatter)
    }

    pub fn blend_mode(&self) -> BlendMode {
        match self {
            ClipType::Scatter => BlendMode::Additive,
            _ => BlendMode::Normal,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Replaces lower-priority values, weighted.
    #[default]
    Normal,
    /// Offsets lower-priority values by `(value - rest) * weight`.
    Additive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationKeyframe {
    /// Normalized time in [0,1] within the clip duration.
    pub time: f32,
    pub properties: BTreeMap<Property, Value>,
    /// Easing of the segment that starts at this keyframe.
    #[serde(default)]
    pub easing: Easing,
}

impl AnimationKeyframe {
    pub fn new(time: f32, easing: Easing) -> Self {
        Self {
            time,
            properties: BTreeMap::new(),
            easing,
        }
    }

    pub fn with(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.properties.insert(property, value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationClip {
    pub id: String,
    pub element_id: String,
    #[serde(rename = "type")]
    pub clip_type: ClipType,
    pub keyframes: Vec<AnimationKeyframe>,
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Seconds.
    pub duration: f32,
    pub priority: u8,
    pub blend_mode: BlendMode,
}

impl AnimationClip {
    /// Check keyframe ordering (ascending, first 0, last 1), finite values and a
    /// positive duration.
    pub fn validate(&self) -> Result<(), AnimationError> {
        let invalid = |reason: String| AnimationError::invalid_clip(&self.id, reason);
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(invalid(format!("duration must be > 0, got {}", self.duration)));
        }
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            return Err(invalid("clip has no keyframes".into()));
        };
        if first.time != 0.0 || last.time != 1.0 {
            return Err(invalid(format!(
                "keyframes must span [0,1], got [{}, {}]",
                first.time, last.time
            )));
        }
        let mut previous = f32::NEG_INFINITY;
        for (idx, key) in self.keyframes.iter().enumerate() {
            if !key.time.is_finite() || key.time < previous {
                return Err(invalid(format!("keyframe {idx} is out of order")));
            }
            previous = key.time;
            if let Some((prop, _)) = key.properties.iter().find(|(_, v)| !v.is_finite()) {
                return Err(invalid(format!(
                    "keyframe {idx} has a non-finite {}",
                    prop.name()
                )));
            }
        }
        Ok(())
    }

    /// Every property animated by at least one keyframe, in property order.
    pub fn properties(&self) -> BTreeSet<Property> {
        self.keyframes
            .iter()
            .flat_map(|k| k.properties.keys().copied())
            .collect()
    }

    /// Looping clips never complete; one-shots complete after `duration`.
    #[inline]
    pub fn is_one_shot(&self) -> bool {
        !self.looping
    }
}
