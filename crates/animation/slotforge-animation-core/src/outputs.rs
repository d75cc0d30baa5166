//! Output contracts of the timeline engine.
//!
//! Every update produces one [`TimelineSnapshot`]: the clock, the resolved
//! per-element poses and the semantic events raised since the last snapshot.

use serde::{Deserialize, Serialize};

use crate::accumulate::ElementPoses;
use crate::playback::{Direction, LoopMode, TimelineStatus};

/// Discrete signals raised by control calls and ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[non_exhaustive]
pub enum TimelineEvent {
    Started,
    Paused,
    Resumed,
    Stopped,
    Seeked { from: f32, to: f32 },
    /// The clock wrapped (forever mode).
    Looped { count: u32 },
    /// Ping-pong direction flipped.
    Reversed { direction: Direction },
    #[serde(rename_all = "camelCase")]
    ClipCompleted { clip_id: String },
    /// Once mode reached the end, or no clip was left active.
    Ended { time: f32 },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    pub time: f32,
    pub duration: f32,
    /// `time / duration`, 0 for an empty timeline.
    pub progress: f32,
    pub status: TimelineStatus,
    pub direction: Direction,
    pub speed: f32,
    pub loop_mode: LoopMode,
    pub active_clips: Vec<String>,
    pub poses: ElementPoses,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

impl TimelineSnapshot {
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.status == TimelineStatus::Playing
    }

    pub fn has_event(&self, pred: impl Fn(&TimelineEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}
