//! Playback enums and the clock arithmetic behind the loop modes.

use serde::{Deserialize, Serialize};

/// How the timeline clock behaves at its duration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopMode {
    /// Clamp at the end and stop.
    Once,
    /// Wrap to zero.
    #[default]
    #[serde(alias = "loop")]
    Forever,
    /// Bounce between 0 and the duration.
    #[serde(alias = "pingpong", alias = "pingPong")]
    PingPong,
}

/// How clip start offsets are laid out on the timeline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Every clip starts at `index * stagger`.
    #[default]
    Simultaneous,
    /// Each clip starts when the previous one ends.
    Sequential,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Floored modulo; the result has the sign of `b`. Returns 0 when `b == 0`.
pub fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// Advance a ping-pong clock by `delta` (always >= 0, in travel distance).
///
/// The clock is unfolded into a phase on `[0, 2 * span)`: forward time `t` is
/// phase `t`, backward time `t` is phase `2 * span - t`. The phase advances and
/// wraps, then folds back into a time and a direction. Any `delta` lands in
/// range, however large.
pub fn advance_ping_pong(time: f32, direction: Direction, delta: f32, span: f32) -> (f32, Direction) {
    if span <= 0.0 {
        return (0.0, Direction::Forward);
    }
    let period = 2.0 * span;
    let phase = match direction {
        Direction::Forward => time,
        Direction::Backward => period - time,
    };
    let phase = fmod(phase + delta, period);
    if phase <= span {
        (phase, Direction::Forward)
    } else {
        (period - phase, Direction::Backward)
    }
}
