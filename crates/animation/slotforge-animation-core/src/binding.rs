//! Render targets: where resolved element poses are written each tick.
//!
//! The engine never draws. Hosts bind one [`RenderTarget`] per element id and
//! receive property writes; the canvas/DOM side lives behind the trait.

use std::sync::{Arc, Mutex, PoisonError};

use crate::value::{Pose, Property, Value};

pub trait RenderTarget: Send {
    fn apply(&mut self, property: Property, value: &Value);
}

/// Records the latest value per property plus a write counter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseBuffer {
    pub pose: Pose,
    pub writes: usize,
}

impl PoseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: Property) -> Option<Value> {
        self.pose.get(&property).copied()
    }

    pub fn scalar(&self, property: Property) -> Option<f32> {
        self.get(property).and_then(|v| v.as_scalar())
    }
}

impl RenderTarget for PoseBuffer {
    fn apply(&mut self, property: Property, value: &Value) {
        self.pose.insert(property, *value);
        self.writes += 1;
    }
}

/// Shared targets let the host keep reading what the engine writes.
impl<T: RenderTarget> RenderTarget for Arc<Mutex<T>> {
    fn apply(&mut self, property: Property, value: &Value) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(property, value);
    }
}

/// Convenience constructor for a shared [`PoseBuffer`].
pub fn shared_buffer() -> Arc<Mutex<PoseBuffer>> {
    Arc::new(Mutex::new(PoseBuffer::new()))
}

/// Write every property of `pose` into `target`.
pub(crate) fn write_pose(target: &mut dyn RenderTarget, pose: &Pose) {
    for (property, value) in pose {
        target.apply(*property, value);
    }
}
