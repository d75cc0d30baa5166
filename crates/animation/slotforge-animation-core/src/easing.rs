//! Segment easing curves.
//!
//! Easings travel as strings (`"easeInOut"`, `"power2.out"`, `"bounce"`,
//! `"cubic-bezier(0.25,0.1,0.25,1)"`). Parsing is lossy on purpose: an unknown
//! name becomes `Linear` and is logged at `debug`.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Overshoots past 1 before settling.
    BackOut,
    BounceOut,
    ElasticOut,
    /// Holds the left value for the whole segment.
    Step,
    /// CSS-style control points `(x1, y1, x2, y2)`.
    CubicBezier([f32; 4]),
}

const EASE_IN: [f32; 4] = [0.42, 0.0, 1.0, 1.0];
const EASE_OUT: [f32; 4] = [0.0, 0.0, 0.58, 1.0];
const EASE_IN_OUT: [f32; 4] = [0.42, 0.0, 0.58, 1.0];
const CSS_EASE: [f32; 4] = [0.25, 0.1, 0.25, 1.0];

const ALIASES: &[(&str, Easing)] = &[
    ("linear", Easing::Linear),
    ("none", Easing::Linear),
    ("power0", Easing::Linear),
    ("easein", Easing::EaseIn),
    ("in", Easing::EaseIn),
    ("power1in", Easing::EaseIn),
    ("power2in", Easing::EaseIn),
    ("quadin", Easing::EaseIn),
    ("sinein", Easing::EaseIn),
    ("easeout", Easing::EaseOut),
    ("out", Easing::EaseOut),
    ("power1out", Easing::EaseOut),
    ("power2out", Easing::EaseOut),
    ("power2", Easing::EaseOut),
    ("quadout", Easing::EaseOut),
    ("sineout", Easing::EaseOut),
    ("easeinout", Easing::EaseInOut),
    ("inout", Easing::EaseInOut),
    ("power1inout", Easing::EaseInOut),
    ("power2inout", Easing::EaseInOut),
    ("quadinout", Easing::EaseInOut),
    ("sineinout", Easing::EaseInOut),
    ("ease", Easing::CubicBezier(CSS_EASE)),
    ("backout", Easing::BackOut),
    ("easeoutback", Easing::BackOut),
    ("back", Easing::BackOut),
    ("bounceout", Easing::BounceOut),
    ("easeoutbounce", Easing::BounceOut),
    ("bounce", Easing::BounceOut),
    ("elasticout", Easing::ElasticOut),
    ("easeoutelastic", Easing::ElasticOut),
    ("elastic", Easing::ElasticOut),
    ("step", Easing::Step),
    ("steps", Easing::Step),
    ("stepped", Easing::Step),
    ("hold", Easing::Step),
];

impl Easing {
    /// Parse an easing name; `None` when it is not recognised.
    pub fn parse(name: &str) -> Option<Easing> {
        let trimmed = name.trim();
        if let Some(args) = trimmed
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_bezier_args(args).map(Easing::CubicBezier);
        }
        let key: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, easing)| *easing)
    }

    /// Parse, falling back to `Linear` for unknown names.
    pub fn from_name_lossy(name: &str) -> Easing {
        Easing::parse(name).unwrap_or_else(|| {
            log::debug!("unknown easing '{name}'; using linear");
            Easing::Linear
        })
    }

    /// Map segment-local `t ∈ [0,1]` to eased progress. The result may leave
    /// [0,1] for overshooting curves.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => bezier_ease_t(t, EASE_IN),
            Easing::EaseOut => bezier_ease_t(t, EASE_OUT),
            Easing::EaseInOut => bezier_ease_t(t, EASE_IN_OUT),
            Easing::BackOut => back_out(t),
            Easing::BounceOut => bounce_out(t),
            Easing::ElasticOut => elastic_out(t),
            Easing::Step => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Easing::CubicBezier(ctrl) => bezier_ease_t(t, *ctrl),
        }
    }

    /// Closest cubic-bezier description, for formats that only know beziers.
    /// `None` for `Step`.
    pub fn as_cubic_bezier(&self) -> Option<[f32; 4]> {
        match self {
            Easing::Linear => Some([0.0, 0.0, 1.0, 1.0]),
            Easing::EaseIn => Some(EASE_IN),
            Easing::EaseOut => Some(EASE_OUT),
            Easing::EaseInOut => Some(EASE_IN_OUT),
            Easing::BackOut => Some([0.34, 1.56, 0.64, 1.0]),
            Easing::BounceOut => Some([0.33, 1.2, 0.68, 1.0]),
            Easing::ElasticOut => Some([0.3, 1.6, 0.5, 1.0]),
            Easing::Step => None,
            Easing::CubicBezier(ctrl) => Some(*ctrl),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Easing::Linear => "linear".into(),
            Easing::EaseIn => "easeIn".into(),
            Easing::EaseOut => "easeOut".into(),
            Easing::EaseInOut => "easeInOut".into(),
            Easing::BackOut => "backOut".into(),
            Easing::BounceOut => "bounceOut".into(),
            Easing::ElasticOut => "elasticOut".into(),
            Easing::Step => "step".into(),
            Easing::CubicBezier([x1, y1, x2, y2]) => format!("cubic-bezier({x1},{y1},{x2},{y2})"),
        }
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Easing::from_name_lossy(&name)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.name()
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

fn parse_bezier_args(args: &str) -> Option<[f32; 4]> {
    let parsed: Vec<f32> = args
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parsed.as_slice() {
        [x1, y1, x2, y2] if parsed.iter().all(|v| v.is_finite()) => {
            Some([x1.clamp(0.0, 1.0), *y1, x2.clamp(0.0, 1.0), *y2])
        }
        _ => None,
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x curve by binary search, then evaluate y.
fn bezier_ease_t(t: f32, [x1, y1, x2, y2]: [f32; 4]) -> f32 {
    // Bezier(0,0,1,1) is exactly linear.
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

fn back_out(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u * u * u + C1 * u * u
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

fn elastic_out(t: f32) -> f32 {
    const C4: f32 = std::f32::consts::TAU / 3.0;
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
    }
}
