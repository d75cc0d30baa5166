//! Configuration for clip generation and timeline playback.

use serde::{Deserialize, Serialize};

use crate::data::ClipType;
use crate::playback::{LoopMode, PlaybackMode};

/// Clip durations in seconds, per clip type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipDurations {
    pub idle: f32,
    pub win: f32,
    pub scatter: f32,
    pub wild: f32,
    pub bonus: f32,
    pub intro: f32,
}

impl Default for ClipDurations {
    fn default() -> Self {
        Self {
            idle: 2.0,
            win: 1.5,
            scatter: 3.0,
            wild: 1.2,
            bonus: 2.0,
            intro: 1.0,
        }
    }
}

impl ClipDurations {
    pub fn get(&self, clip_type: ClipType) -> f32 {
        match clip_type {
            ClipType::Idle => self.idle,
            ClipType::Win => self.win,
            ClipType::Scatter => self.scatter,
            ClipType::Wild => self.wild,
            ClipType::Bonus => self.bonus,
            ClipType::Intro => self.intro,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub durations: ClipDurations,
    /// Multiplier on every translation amplitude.
    pub amplitude_scale: f32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            durations: ClipDurations::default(),
            amplitude_scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub loop_mode: LoopMode,
    pub playback_mode: PlaybackMode,
    /// Start offset between consecutive clips in simultaneous mode, seconds.
    pub stagger: f32,
    /// Initial playback speed multiplier.
    pub speed: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            loop_mode: LoopMode::Forever,
            playback_mode: PlaybackMode::Simultaneous,
            stagger: 0.0,
            speed: 1.0,
        }
    }
}
