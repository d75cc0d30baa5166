//! Motion profiles: the parameters that shape each generated clip.
//!
//! A profile is built from the element's structural role. Translations are
//! fractions of the mesh bounding-box height and only become pixels when
//! keyframes are produced; rotation, scale, alpha and glow envelopes are pure
//! role parameters.

use serde::{Deserialize, Serialize};
use slotforge_mesh::ElementKind;

use crate::data::{AnimationKeyframe, ClipType};
use crate::easing::Easing;
use crate::error::AnimationError;
use crate::value::{Property, WHITE};

/// Base motion amplitudes of a role.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMotion {
    /// Translation as a fraction of bounding-box height.
    pub translate: f32,
    /// Rotation swing in degrees.
    pub rotate: f32,
    /// Scale delta around 1.
    pub scale: f32,
}

impl RoleMotion {
    pub fn for_kind(kind: ElementKind) -> Self {
        let (translate, rotate, scale) = match kind {
            ElementKind::Wing => (0.04, 18.0, 0.06),
            ElementKind::Body => (0.03, 3.0, 0.04),
            ElementKind::Head => (0.03, 8.0, 0.03),
            ElementKind::Tail => (0.02, 20.0, 0.02),
            ElementKind::Arm => (0.03, 15.0, 0.03),
            ElementKind::Leg => (0.02, 10.0, 0.02),
            ElementKind::Antenna => (0.02, 25.0, 0.02),
            ElementKind::Eye => (0.01, 0.0, 0.12),
            ElementKind::Generic => (0.03, 5.0, 0.05),
        };
        Self {
            translate,
            rotate,
            scale,
        }
    }
}

/// Parameters of one clip, one variant per clip type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MotionProfile {
    /// Gentle float with a breathing scale.
    #[serde(rename_all = "camelCase")]
    Idle {
        float_fraction: f32,
        sway_degrees: f32,
        breathe_scale: f32,
    },
    /// Jump, pulse and glow, settling back to rest.
    #[serde(rename_all = "camelCase")]
    Win {
        jump_fraction: f32,
        spin_degrees: f32,
        pulse_scale: f32,
        glow: f32,
    },
    /// Drift and flicker offsets layered on top of other clips.
    #[serde(rename_all = "camelCase")]
    Scatter {
        drift_fraction: f32,
        shimmer_degrees: f32,
        flicker_alpha: f32,
    },
    #[serde(rename_all = "camelCase")]
    Wild {
        shake_fraction: f32,
        wobble_degrees: f32,
        flash_tint: [f32; 4],
        glow: f32,
    },
    #[serde(rename_all = "camelCase")]
    Bonus {
        bounce_fraction: f32,
        pop_scale: f32,
        glow: f32,
    },
    /// Fade and grow in from below.
    #[serde(rename_all = "camelCase")]
    Intro {
        rise_fraction: f32,
        start_scale: f32,
        spin_degrees: f32,
    },
}

const WILD_FLASH: [f32; 4] = [1.0, 0.85, 0.3, 1.0];

impl MotionProfile {
    /// Profile of `clip_type` for an element of role `kind`.
    pub fn for_role(clip_type: ClipType, kind: ElementKind) -> Self {
        let r = RoleMotion::for_kind(kind);
        match clip_type {
            ClipType::Idle => MotionProfile::Idle {
                float_fraction: r.translate,
                sway_degrees: r.rotate * 0.25,
                breathe_scale: r.scale * 0.5,
            },
            ClipType::Win => MotionProfile::Win {
                jump_fraction: r.translate * 3.0,
                spin_degrees: r.rotate,
                pulse_scale: r.scale * 3.0,
                glow: 0.8,
            },
            ClipType::Scatter => MotionProfile::Scatter {
                drift_fraction: r.translate,
                shimmer_degrees: r.rotate * 0.5,
                flicker_alpha: 0.3,
            },
            ClipType::Wild => MotionProfile::Wild {
                shake_fraction: r.translate * 1.5,
                wobble_degrees: r.rotate * 0.75,
                flash_tint: WILD_FLASH,
                glow: 1.0,
            },
            ClipType::Bonus => MotionProfile::Bonus {
                bounce_fraction: r.translate * 4.0,
                pop_scale: r.scale * 4.0,
                glow: 0.6,
            },
            ClipType::Intro => MotionProfile::Intro {
                rise_fraction: r.translate * 3.0,
                start_scale: 0.2,
                spin_degrees: r.rotate * 2.0,
            },
        }
    }

    pub fn clip_type(&self) -> ClipType {
        match self {
            MotionProfile::Idle { .. } => ClipType::Idle,
            MotionProfile::Win { .. } => ClipType::Win,
            MotionProfile::Scatter { .. } => ClipType::Scatter,
            MotionProfile::Wild { .. } => ClipType::Wild,
            MotionProfile::Bonus { .. } => ClipType::Bonus,
            MotionProfile::Intro { .. } => ClipType::Intro,
        }
    }

    pub fn validate(&self) -> Result<(), AnimationError> {
        let clip = self.clip_type().name();
        let check = |name: &str, v: f32, lo: f32, hi: f32| {
            if v.is_finite() && (lo..=hi).contains(&v) {
                Ok(())
            } else {
                Err(AnimationError::InvalidProfile {
                    reason: format!("{clip}.{name} = {v} is outside [{lo}, {hi}]"),
                })
            }
        };
        match self {
            MotionProfile::Idle {
                float_fraction,
                sway_degrees,
                breathe_scale,
            } => {
                check("floatFraction", *float_fraction, 0.0, 1.0)?;
                check("swayDegrees", *sway_degrees, -360.0, 360.0)?;
                check("breatheScale", *breathe_scale, 0.0, 1.0)
            }
            MotionProfile::Win {
                jump_fraction,
                spin_degrees,
                pulse_scale,
                glow,
            } => {
                check("jumpFraction", *jump_fraction, 0.0, 1.0)?;
                check("spinDegrees", *spin_degrees, -360.0, 360.0)?;
                check("pulseScale", *pulse_scale, 0.0, 1.0)?;
                check("glow", *glow, 0.0, 1.0)
            }
            MotionProfile::Scatter {
                drift_fraction,
                shimmer_degrees,
                flicker_alpha,
            } => {
                check("driftFraction", *drift_fraction, 0.0, 1.0)?;
                check("shimmerDegrees", *shimmer_degrees, -360.0, 360.0)?;
                check("flickerAlpha", *flicker_alpha, 0.0, 1.0)
            }
            MotionProfile::Wild {
                shake_fraction,
                wobble_degrees,
                flash_tint,
                glow,
            } => {
                check("shakeFraction", *shake_fraction, 0.0, 1.0)?;
                check("wobbleDegrees", *wobble_degrees, -360.0, 360.0)?;
                for c in flash_tint {
                    check("flashTint", *c, 0.0, 1.0)?;
                }
                check("glow", *glow, 0.0, 1.0)
            }
            MotionProfile::Bonus {
                bounce_fraction,
                pop_scale,
                glow,
            } => {
                check("bounceFraction", *bounce_fraction, 0.0, 1.0)?;
                check("popScale", *pop_scale, 0.0, 1.0)?;
                check("glow", *glow, 0.0, 1.0)
            }
            MotionProfile::Intro {
                rise_fraction,
                start_scale,
                spin_degrees,
            } => {
                check("riseFraction", *rise_fraction, 0.0, 1.0)?;
                check("startScale", *start_scale, 0.01, 1.0)?;
                check("spinDegrees", *spin_degrees, -360.0, 360.0)
            }
        }
    }

    /// Keyframes in normalized time. Translations are in pixels:
    /// `fraction * bbox_height * amplitude_scale`.
    pub fn keyframes(&self, bbox_height: f32, amplitude_scale: f32) -> Vec<AnimationKeyframe> {
        let px = |fraction: f32| fraction * bbox_height.max(0.0) * amplitude_scale;
        use Easing::*;
        use Property::*;
        let key = AnimationKeyframe::new;
        match *self {
            MotionProfile::Idle {
                float_fraction,
                sway_degrees,
                breathe_scale,
            } => {
                let lift = px(float_fraction);
                let rest = |t| {
                    key(t, EaseInOut)
                        .with(Y, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                };
                vec![
                    rest(0.0),
                    key(0.25, EaseInOut)
                        .with(Y, -lift * 0.5)
                        .with(Rotation, sway_degrees)
                        .with(ScaleX, 1.0 + breathe_scale * 0.5)
                        .with(ScaleY, 1.0 + breathe_scale * 0.5),
                    key(0.5, EaseInOut)
                        .with(Y, -lift)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.0 + breathe_scale)
                        .with(ScaleY, 1.0 + breathe_scale),
                    key(0.75, EaseInOut)
                        .with(Y, -lift * 0.5)
                        .with(Rotation, -sway_degrees)
                        .with(ScaleX, 1.0 + breathe_scale * 0.5)
                        .with(ScaleY, 1.0 + breathe_scale * 0.5),
                    rest(1.0),
                ]
            }
            MotionProfile::Win {
                jump_fraction,
                spin_degrees,
                pulse_scale,
                glow,
            } => {
                let jump = px(jump_fraction);
                vec![
                    key(0.0, EaseOut)
                        .with(Y, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Glow, 0.0),
                    key(0.2, BounceOut)
                        .with(Y, -jump)
                        .with(Rotation, spin_degrees * 0.5)
                        .with(ScaleX, 1.0 + pulse_scale)
                        .with(ScaleY, 1.0 + pulse_scale)
                        .with(Glow, glow),
                    key(0.5, EaseInOut)
                        .with(Y, 0.0)
                        .with(Rotation, -spin_degrees * 0.5)
                        .with(ScaleX, 1.0 + pulse_scale * 0.5)
                        .with(ScaleY, 1.0 + pulse_scale * 0.5)
                        .with(Glow, glow),
                    key(0.75, EaseOut)
                        .with(Y, -jump * 0.4)
                        .with(Rotation, spin_degrees * 0.25)
                        .with(ScaleX, 1.0 + pulse_scale * 0.75)
                        .with(ScaleY, 1.0 + pulse_scale * 0.75)
                        .with(Glow, glow * 0.5),
                    key(1.0, Linear)
                        .with(Y, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Glow, 0.0),
                ]
            }
            MotionProfile::Scatter {
                drift_fraction,
                shimmer_degrees,
                flicker_alpha,
            } => {
                let drift = px(drift_fraction);
                let rest = |t| key(t, EaseInOut).with(X, 0.0).with(Rotation, 0.0).with(Alpha, 1.0);
                vec![
                    rest(0.0),
                    key(0.25, EaseInOut)
                        .with(X, drift)
                        .with(Rotation, shimmer_degrees)
                        .with(Alpha, 1.0 - flicker_alpha * 0.5),
                    key(0.5, EaseInOut)
                        .with(X, 0.0)
                        .with(Rotation, 0.0)
                        .with(Alpha, 1.0 - flicker_alpha),
                    key(0.75, EaseInOut)
                        .with(X, -drift)
                        .with(Rotation, -shimmer_degrees)
                        .with(Alpha, 1.0 - flicker_alpha * 0.5),
                    rest(1.0),
                ]
            }
            MotionProfile::Wild {
                shake_fraction,
                wobble_degrees,
                flash_tint,
                glow,
            } => {
                let shake = px(shake_fraction);
                vec![
                    key(0.0, Linear)
                        .with(X, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Tint, WHITE)
                        .with(Glow, 0.0),
                    key(0.15, Linear)
                        .with(X, shake)
                        .with(Rotation, wobble_degrees)
                        .with(Tint, flash_tint)
                        .with(Glow, glow),
                    key(0.3, Linear)
                        .with(X, -shake)
                        .with(Rotation, -wobble_degrees),
                    key(0.45, EaseOut)
                        .with(X, shake * 0.5)
                        .with(Rotation, wobble_degrees * 0.5),
                    key(0.6, ElasticOut)
                        .with(X, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.1)
                        .with(ScaleY, 1.1)
                        .with(Tint, flash_tint)
                        .with(Glow, glow),
                    key(1.0, Linear)
                        .with(X, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Tint, WHITE)
                        .with(Glow, 0.0),
                ]
            }
            MotionProfile::Bonus {
                bounce_fraction,
                pop_scale,
                glow,
            } => {
                let bounce = px(bounce_fraction);
                vec![
                    key(0.0, EaseOut)
                        .with(Y, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Glow, 0.0),
                    key(0.3, BounceOut)
                        .with(Y, -bounce)
                        .with(ScaleX, 1.0 + pop_scale)
                        .with(ScaleY, 1.0 + pop_scale)
                        .with(Glow, glow),
                    key(0.6, BackOut)
                        .with(Y, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Glow, glow),
                    key(0.8, EaseInOut)
                        .with(ScaleX, 1.0 + pop_scale * 0.5)
                        .with(ScaleY, 1.0 + pop_scale * 0.5)
                        .with(Glow, glow * 0.5),
                    key(1.0, Linear)
                        .with(Y, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Glow, 0.0),
                ]
            }
            MotionProfile::Intro {
                rise_fraction,
                start_scale,
                spin_degrees,
            } => {
                let rise = px(rise_fraction);
                vec![
                    key(0.0, BackOut)
                        .with(Y, rise)
                        .with(Rotation, -spin_degrees)
                        .with(ScaleX, start_scale)
                        .with(ScaleY, start_scale)
                        .with(Alpha, 0.0),
                    key(0.6, EaseOut)
                        .with(Y, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.05)
                        .with(ScaleY, 1.05)
                        .with(Alpha, 1.0),
                    key(1.0, Linear)
                        .with(Y, 0.0)
                        .with(Rotation, 0.0)
                        .with(ScaleX, 1.0)
                        .with(ScaleY, 1.0)
                        .with(Alpha, 1.0),
                ]
            }
        }
    }
}
