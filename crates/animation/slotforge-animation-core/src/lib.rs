//! Slotforge Animation Core (engine-agnostic)
//!
//! Procedural keyframe clips for symbol elements and the timeline that plays
//! them: clip generation from a processed mesh, sampling, priority/blend
//! resolution, loop and composition modes, render-target writes, baking and
//! export to authoring formats. No rendering happens here; hosts bind
//! [`RenderTarget`]s and read [`TimelineSnapshot`]s.

pub mod accumulate;
pub mod baking;
pub mod binding;
pub mod config;
pub mod data;
pub mod easing;
pub mod error;
pub mod export;
pub mod library;
pub mod outputs;
pub mod playback;
pub mod profile;
pub mod sampling;
pub mod scheduler;
pub mod timeline;
pub mod value;

// Re-exports for consumers (wasm adapter, tools)
pub use accumulate::{Accumulator, ElementPoses};
pub use baking::{bake_clip, BakedClip, BakedTrack, BakingConfig};
pub use binding::{shared_buffer, PoseBuffer, RenderTarget};
pub use config::{ClipDurations, LibraryConfig, TimelineConfig};
pub use data::{AnimationClip, AnimationKeyframe, BlendMode, ClipType};
pub use easing::Easing;
pub use error::AnimationError;
pub use export::{export, ExportFormat};
pub use library::{clip_id, ClipLibrary};
pub use outputs::{TimelineEvent, TimelineSnapshot};
pub use playback::{Direction, LoopMode, PlaybackMode, TimelineStatus};
pub use profile::{MotionProfile, RoleMotion};
pub use sampling::{sample_clip, sample_property};
pub use scheduler::{FixedStep, FrameSource};
pub use timeline::{TimelineEngine, TimelineState, UpdateCallback};
pub use value::{Pose, Property, Value};
