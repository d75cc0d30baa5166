//! Animatable properties and their typed values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Transform/appearance channel of a symbol element. Rotation is in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    X,
    Y,
    Rotation,
    ScaleX,
    ScaleY,
    Alpha,
    /// RGBA multiplier.
    Tint,
    /// Glow intensity, 0 = none.
    Glow,
}

impl Property {
    pub const ALL: [Property; 8] = [
        Property::X,
        Property::Y,
        Property::Rotation,
        Property::ScaleX,
        Property::ScaleY,
        Property::Alpha,
        Property::Tint,
        Property::Glow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Rotation => "rotation",
            Property::ScaleX => "scaleX",
            Property::ScaleY => "scaleY",
            Property::Alpha => "alpha",
            Property::Tint => "tint",
            Property::Glow => "glow",
        }
    }

    /// Value of the property when nothing animates it.
    pub fn rest_value(&self) -> Value {
        match self {
            Property::X | Property::Y | Property::Rotation | Property::Glow => Value::Scalar(0.0),
            Property::ScaleX | Property::ScaleY | Property::Alpha => Value::Scalar(1.0),
            Property::Tint => Value::Color(WHITE),
        }
    }
}

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Scalar channels serialize as numbers, colors as `[r, g, b, a]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f32),
    Color([f32; 4]),
}

impl Value {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Scalar(_) => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Value::Scalar(v) => v.is_finite(),
            Value::Color(c) => c.iter().all(|v| v.is_finite()),
        }
    }

    /// Component-wise interpolation. Mismatched kinds keep `self`.
    pub fn lerp(&self, other: &Value, t: f32) -> Value {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(lerp_f32(*a, *b, t)),
            (Value::Color(a), Value::Color(b)) => Value::Color([
                lerp_f32(a[0], b[0], t),
                lerp_f32(a[1], b[1], t),
                lerp_f32(a[2], b[2], t),
                lerp_f32(a[3], b[3], t),
            ]),
            _ => *self,
        }
    }

    /// `self + (value - rest) * weight`, component-wise.
    pub fn add_offset(&self, value: &Value, rest: &Value, weight: f32) -> Value {
        match (self, value, rest) {
            (Value::Scalar(a), Value::Scalar(v), Value::Scalar(r)) => {
                Value::Scalar(a + (v - r) * weight)
            }
            (Value::Color(a), Value::Color(v), Value::Color(r)) => {
                let mut out = *a;
                for ((o, v), r) in out.iter_mut().zip(v).zip(r) {
                    *o += (v - r) * weight;
                }
                Value::Color(out)
            }
            _ => *self,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Scalar(v)
    }
}

impl From<[f32; 4]> for Value {
    fn from(c: [f32; 4]) -> Self {
        Value::Color(c)
    }
}

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Resolved property values of one element.
pub type Pose = BTreeMap<Property, Value>;
