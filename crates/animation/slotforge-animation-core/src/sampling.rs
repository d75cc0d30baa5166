//! Clip sampling.
//!
//! Model:
//! - Keyframes carry normalized times in [0,1] and a partial property map.
//! - A property is interpolated between the keyframes that define it; keyframes
//!   that do not mention it are skipped.
//! - Segment [Ki -> K(i+1)] timing uses Ki's easing; values blend linearly on the
//!   eased time (overshooting easings overshoot the value too).
//! - Outside the defined range the nearest keyframe value holds.

use crate::data::AnimationClip;
use crate::easing::Easing;
use crate::value::{Pose, Property, Value};

struct Stop {
    time: f32,
    value: Value,
    easing: Easing,
}

/// Find the segment [i, i+1] that contains normalized time u, and return
/// (i, i+1, local_t). Before the first stop returns (0, 0, 0); after the last
/// returns (last, last, 0).
fn find_segment(stops: &[Stop], u: f32) -> (usize, usize, f32) {
    let n = stops.len();
    if n == 0 || n == 1 || u <= stops[0].time {
        return (0, 0, 0.0);
    }
    if u >= stops[n - 1].time {
        return (n - 1, n - 1, 0.0);
    }
    for i in 0..(n - 1) {
        let t0 = stops[i].time;
        let t1 = stops[i + 1].time;
        if u >= t0 && u <= t1 {
            let denom = (t1 - t0).max(f32::EPSILON);
            return (i, i + 1, ((u - t0) / denom).clamp(0.0, 1.0));
        }
    }
    (n - 1, n - 1, 0.0)
}

/// Value of `property` at normalized time `u`, or `None` when no keyframe
/// animates it.
pub fn sample_property(clip: &AnimationClip, property: Property, u: f32) -> Option<Value> {
    let stops: Vec<Stop> = clip
        .keyframes
        .iter()
        .filter_map(|k| {
            k.properties.get(&property).map(|value| Stop {
                time: k.time,
                value: *value,
                easing: k.easing,
            })
        })
        .collect();
    if stops.is_empty() {
        return None;
    }
    let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };
    let (i0, i1, lt) = find_segment(&stops, u);
    if i0 == i1 {
        return Some(stops[i0].value);
    }
    let left = &stops[i0];
    let right = &stops[i1];
    Some(left.value.lerp(&right.value, left.easing.apply(lt)))
}

/// Sample every animated property of `clip` at normalized time `u`.
pub fn sample_clip(clip: &AnimationClip, u: f32) -> Pose {
    clip.properties()
        .into_iter()
        .filter_map(|p| sample_property(clip, p, u).map(|v| (p, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AnimationKeyframe, BlendMode, ClipType};
    use approx::assert_relative_eq;

    fn clip(keys: Vec<AnimationKeyframe>) -> AnimationClip {
        AnimationClip {
            id: "e:win".into(),
            element_id: "e".into(),
            clip_type: ClipType::Win,
            keyframes: keys,
            looping: false,
            duration: 1.0,
            priority: 3,
            blend_mode: BlendMode::Normal,
        }
    }

    fn scalar(clip: &AnimationClip, p: Property, u: f32) -> f32 {
        sample_property(clip, p, u)
            .and_then(|v| v.as_scalar())
            .unwrap_or(f32::NAN)
    }

    #[test]
    fn sparse_properties_skip_keyframes() {
        let c = clip(vec![
            AnimationKeyframe::new(0.0, Easing::Linear)
                .with(Property::X, 0.0)
                .with(Property::Glow, 0.0),
            AnimationKeyframe::new(0.5, Easing::Linear).with(Property::Glow, 1.0),
            AnimationKeyframe::new(1.0, Easing::Linear)
                .with(Property::X, 10.0)
                .with(Property::Glow, 0.0),
        ]);
        // X ignores the middle keyframe entirely.
        assert_relative_eq!(scalar(&c, Property::X, 0.5), 5.0);
        assert_relative_eq!(scalar(&c, Property::Glow, 0.25), 0.5);
        assert_relative_eq!(scalar(&c, Property::Glow, 0.75), 0.5);
        assert!(sample_property(&c, Property::Alpha, 0.5).is_none());
    }

    #[test]
    fn left_keyframe_easing_applies() {
        let c = clip(vec![
            AnimationKeyframe::new(0.0, Easing::Step).with(Property::Y, 1.0),
            AnimationKeyframe::new(1.0, Easing::Linear).with(Property::Y, 2.0),
        ]);
        assert_relative_eq!(scalar(&c, Property::Y, 0.9), 1.0);
        assert_relative_eq!(scalar(&c, Property::Y, 1.0), 2.0);
    }

    #[test]
    fn out_of_range_time_clamps() {
        let c = clip(vec![
            AnimationKeyframe::new(0.0, Easing::EaseIn).with(Property::Tint, [1.0, 1.0, 1.0, 1.0]),
            AnimationKeyframe::new(1.0, Easing::EaseIn).with(Property::Tint, [1.0, 0.0, 0.0, 1.0]),
        ]);
        let pose = sample_clip(&c, 4.0);
        assert_eq!(pose[&Property::Tint], Value::Color([1.0, 0.0, 0.0, 1.0]));
        let pose = sample_clip(&c, f32::NAN);
        assert_eq!(pose[&Property::Tint], Value::Color([1.0, 1.0, 1.0, 1.0]));
    }
}
