//! Frame sources feeding [`TimelineEngine::run`](crate::timeline::TimelineEngine::run).
//!
//! A browser host wraps `requestAnimationFrame` deltas; tests and offline
//! tools use [`FixedStep`] or a closure.

/// Yields the host time (seconds) elapsed since the previous frame, or `None`
/// when the source is exhausted.
pub trait FrameSource {
    fn next_delta(&mut self) -> Option<f32>;
}

/// A fixed number of equal steps.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedStep {
    step: f32,
    remaining: Option<usize>,
}

impl FixedStep {
    /// `frames` steps of `step` seconds each.
    pub fn new(step: f32, frames: usize) -> Self {
        Self {
            step,
            remaining: Some(frames),
        }
    }

    /// `1 / fps` per frame, never exhausted.
    pub fn unbounded(fps: f32) -> Self {
        let step = if fps.is_finite() && fps > 0.0 { 1.0 / fps } else { 1.0 / 60.0 };
        Self {
            step,
            remaining: None,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

impl FrameSource for FixedStep {
    fn next_delta(&mut self) -> Option<f32> {
        match self.remaining.as_mut() {
            Some(0) => None,
            Some(n) => {
                *n -= 1;
                Some(self.step)
            }
            None => Some(self.step),
        }
    }
}

impl<F> FrameSource for F
where
    F: FnMut() -> Option<f32>,
{
    fn next_delta(&mut self) -> Option<f32> {
        self()
    }
}
