//! Spine 3.8 skeleton JSON.
//!
//! Spine is y-up with counter-clockwise rotation; the pipeline is y-down with
//! clockwise rotation, so y and angles are negated. The bone sits at the mesh
//! bounding-box center and vertices are bone-relative. Glow has no Spine
//! counterpart and is left out; alpha folds into the slot color.

use std::sync::Arc;

use serde_json::{json, Map, Value as Json};
use slotforge_mesh::ProcessedMesh;

use super::{export_error, ExportFormat};
use crate::data::{AnimationClip, AnimationKeyframe};
use crate::error::AnimationError;
use crate::sampling::sample_property;
use crate::value::{Property, WHITE};

pub const SPINE_VERSION: &str = "3.8.99";

const LINEAR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

pub fn export_spine(
    element_id: &str,
    mesh: &ProcessedMesh,
    clips: &[Arc<AnimationClip>],
) -> Result<Json, AnimationError> {
    if mesh.triangles.is_empty() {
        return Err(export_error(
            ExportFormat::Spine,
            format!("mesh of {element_id} has no triangles"),
        ));
    }
    let bbox = &mesh.bounding_box;
    let center = bbox.center();

    let mut vertices = Vec::with_capacity(mesh.simplified_points.len() * 2);
    let mut uvs = Vec::with_capacity(mesh.simplified_points.len() * 2);
    for p in &mesh.simplified_points {
        vertices.push(p.x - center.x);
        vertices.push(-(p.y - center.y));
        uvs.push(normalize(p.x - bbox.x, bbox.width));
        uvs.push(normalize(p.y - bbox.y, bbox.height));
    }

    let mut animations = Map::new();
    for clip in clips {
        animations.insert(clip.clip_type.name().to_string(), clip_animation(element_id, clip));
    }

    Ok(json!({
        "skeleton": {
            "spine": SPINE_VERSION,
            "x": bbox.x,
            "y": -(bbox.y + bbox.height),
            "width": bbox.width,
            "height": bbox.height,
        },
        "bones": [
            { "name": "root" },
            { "name": element_id, "parent": "root", "x": center.x, "y": -center.y },
        ],
        "slots": [
            { "name": element_id, "bone": element_id, "attachment": element_id },
        ],
        "skins": [{
            "name": "default",
            "attachments": {
                element_id: {
                    element_id: {
                        "type": "mesh",
                        "uvs": uvs,
                        "triangles": mesh.triangles,
                        "vertices": vertices,
                        "hull": mesh.simplified_points.len(),
                        "width": bbox.width,
                        "height": bbox.height,
                    }
                }
            }
        }],
        "animations": animations,
    }))
}

fn clip_animation(element_id: &str, clip: &AnimationClip) -> Json {
    let mut rotate = Vec::new();
    let mut translate = Vec::new();
    let mut scale = Vec::new();
    let mut rgba = Vec::new();

    for key in &clip.keyframes {
        let time = key.time * clip.duration;
        let at = |p: Property| sample_scalar(clip, p, key.time);
        if key.properties.contains_key(&Property::Rotation) {
            rotate.push(with_curve(json!({ "time": time, "angle": -at(Property::Rotation) }), key));
        }
        if defines_any(key, &[Property::X, Property::Y]) {
            translate.push(with_curve(
                json!({ "time": time, "x": at(Property::X), "y": -at(Property::Y) }),
                key,
            ));
        }
        if defines_any(key, &[Property::ScaleX, Property::ScaleY]) {
            scale.push(with_curve(
                json!({ "time": time, "x": at(Property::ScaleX), "y": at(Property::ScaleY) }),
                key,
            ));
        }
        if defines_any(key, &[Property::Tint, Property::Alpha]) {
            let tint = sample_property(clip, Property::Tint, key.time)
                .and_then(|v| v.as_color())
                .unwrap_or(WHITE);
            let alpha = at(Property::Alpha);
            let color = [tint[0], tint[1], tint[2], tint[3] * alpha];
            rgba.push(with_curve(json!({ "time": time, "color": hex_color(color) }), key));
        }
    }

    let mut bone = Map::new();
    for (name, keys) in [("rotate", rotate), ("translate", translate), ("scale", scale)] {
        if !keys.is_empty() {
            bone.insert(name.to_string(), Json::Array(keys));
        }
    }
    let mut anim = Map::new();
    if !bone.is_empty() {
        anim.insert("bones".into(), json!({ element_id: bone }));
    }
    if !rgba.is_empty() {
        anim.insert("slots".into(), json!({ element_id: { "rgba": rgba } }));
    }
    Json::Object(anim)
}

fn defines_any(key: &AnimationKeyframe, props: &[Property]) -> bool {
    props.iter().any(|p| key.properties.contains_key(p))
}

fn sample_scalar(clip: &AnimationClip, property: Property, u: f32) -> f32 {
    sample_property(clip, property, u)
        .and_then(|v| v.as_scalar())
        .or_else(|| property.rest_value().as_scalar())
        .unwrap_or(0.0)
}

/// Spine curves describe the segment leaving a key. Linear is the default and
/// is omitted.
fn with_curve(mut frame: Json, key: &AnimationKeyframe) -> Json {
    if let Some(obj) = frame.as_object_mut() {
        match key.easing.as_cubic_bezier() {
            None => {
                obj.insert("curve".into(), json!("stepped"));
            }
            Some(ctrl) if ctrl == LINEAR => {}
            Some([c1, c2, c3, c4]) => {
                obj.insert("curve".into(), json!(c1));
                obj.insert("c2".into(), json!(c2));
                obj.insert("c3".into(), json!(c3));
                obj.insert("c4".into(), json!(c4));
            }
        }
    }
    frame
}

fn hex_color(c: [f32; 4]) -> String {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        byte(c[0]),
        byte(c[1]),
        byte(c[2]),
        byte(c[3])
    )
}

#[inline]
fn normalize(v: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        v / extent
    } else {
        0.0
    }
}
