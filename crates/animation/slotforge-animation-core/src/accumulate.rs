//! Priority-ordered resolution of per-clip contributions into element poses.

use std::collections::BTreeMap;

use crate::data::BlendMode;
use crate::value::Pose;

/// Resolved poses keyed by element id.
pub type ElementPoses = BTreeMap<String, Pose>;

#[derive(Clone, Debug)]
struct Contribution {
    element_id: String,
    priority: u8,
    /// Insertion order; breaks priority ties.
    order: usize,
    blend_mode: BlendMode,
    weight: f32,
    pose: Pose,
}

/// Collects sampled clip poses for one tick, then resolves them per
/// (element, property) in ascending priority:
/// - normal: `acc = lerp(acc, value, weight)`, so a weight-1 clip wins outright
///   over everything below it;
/// - additive: `acc += (value - rest) * weight`.
///
/// Every property starts from its rest value.
#[derive(Debug, Default)]
pub struct Accumulator {
    entries: Vec<Contribution>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        element_id: &str,
        priority: u8,
        blend_mode: BlendMode,
        weight: f32,
        pose: Pose,
    ) {
        if weight.is_nan() || weight <= 0.0 || pose.is_empty() {
            return;
        }
        let order = self.entries.len();
        self.entries.push(Contribution {
            element_id: element_id.to_string(),
            priority,
            order,
            blend_mode,
            weight: weight.min(1.0),
            pose,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finalize(mut self) -> ElementPoses {
        self.entries.sort_by_key(|c| (c.priority, c.order));
        let mut out = ElementPoses::new();
        for c in &self.entries {
            let pose = out.entry(c.element_id.clone()).or_default();
            for (property, value) in &c.pose {
                let rest = property.rest_value();
                let acc = pose.entry(*property).or_insert(rest);
                *acc = match c.blend_mode {
                    BlendMode::Normal => acc.lerp(value, c.weight),
                    BlendMode::Additive => acc.add_offset(value, &rest, c.weight),
                };
            }
        }
        out
    }
}
