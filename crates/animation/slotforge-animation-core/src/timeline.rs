//! Timeline engine: one logical clock over a set of clip tracks.
//!
//! Each tick:
//! 1) advance the clock under the loop mode (once / forever / ping-pong);
//! 2) retire one-shot clips whose local time reached their duration;
//! 3) sample every active track at its normalized local time;
//! 4) resolve contributions per (element, property) by priority and blend mode;
//! 5) write poses to bound render targets, then invoke the update callback once.
//!
//! One-shot clips leave the active set once per play session. Only `stop()` (or
//! `play()` after the session ended) brings them back.

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::accumulate::{Accumulator, ElementPoses};
use crate::binding::{write_pose, RenderTarget};
use crate::config::TimelineConfig;
use crate::data::AnimationClip;
use crate::outputs::{TimelineEvent, TimelineSnapshot};
use crate::playback::{advance_ping_pong, fmod, Direction, LoopMode, PlaybackMode, TimelineStatus};
use crate::sampling::sample_clip;
use crate::scheduler::FrameSource;

pub type UpdateCallback = Box<dyn FnMut(&TimelineSnapshot) + Send>;

#[derive(Debug)]
struct Track {
    clip: Arc<AnimationClip>,
    /// Timeline time at which the clip starts.
    offset: f32,
    weight: f32,
    active: bool,
}

impl Track {
    /// Normalized clip time at timeline time `t`, `None` before the clip starts.
    fn local_u(&self, t: f32) -> Option<f32> {
        let local = t - self.offset;
        if local < 0.0 {
            return None;
        }
        let d = self.clip.duration;
        let u = if self.clip.looping {
            fmod(local, d) / d
        } else {
            (local / d).min(1.0)
        };
        Some(u)
    }
}

/// Read-only view of the engine's clock and track set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    pub current_time: f32,
    pub duration: f32,
    pub is_playing: bool,
    pub status: TimelineStatus,
    pub direction: Direction,
    pub playback_speed: f32,
    pub loop_mode: LoopMode,
    pub playback_mode: PlaybackMode,
    pub active_clips: Vec<String>,
    pub blend_weights: BTreeMap<String, f32>,
}

pub struct TimelineEngine {
    tracks: Vec<Track>,
    targets: HashMap<String, Box<dyn RenderTarget>>,
    on_update: Option<UpdateCallback>,
    time: f32,
    duration: f32,
    status: TimelineStatus,
    direction: Direction,
    speed: f32,
    loop_mode: LoopMode,
    playback_mode: PlaybackMode,
    stagger: f32,
    /// The last session ran to its end; the next `play()` rewinds.
    ended: bool,
    disposed: bool,
    events: Vec<TimelineEvent>,
    poses: ElementPoses,
}

impl std::fmt::Debug for TimelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineEngine")
            .field("tracks", &self.tracks)
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .field("time", &self.time)
            .field("duration", &self.duration)
            .field("status", &self.status)
            .field("direction", &self.direction)
            .field("speed", &self.speed)
            .field("loop_mode", &self.loop_mode)
            .field("playback_mode", &self.playback_mode)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl TimelineEngine {
    pub fn new(cfg: TimelineConfig) -> Self {
        let speed = if cfg.speed.is_finite() && cfg.speed > 0.0 {
            cfg.speed
        } else {
            1.0
        };
        Self {
            tracks: Vec::new(),
            targets: HashMap::new(),
            on_update: None,
            time: 0.0,
            duration: 0.0,
            status: TimelineStatus::Stopped,
            direction: Direction::Forward,
            speed,
            loop_mode: cfg.loop_mode,
            playback_mode: cfg.playback_mode,
            stagger: sanitize_stagger(cfg.stagger),
            ended: false,
            disposed: false,
            events: Vec::new(),
            poses: ElementPoses::new(),
        }
    }

    // ---------- Track set ----------

    /// Add a clip at full weight. A clip with the same id is replaced in place
    /// and keeps its weight.
    pub fn add_clip(&mut self, clip: Arc<AnimationClip>) {
        if self.disposed {
            return;
        }
        if let Some(track) = self.tracks.iter_mut().find(|t| t.clip.id == clip.id) {
            track.clip = clip;
            track.active = true;
        } else {
            self.tracks.push(Track {
                clip,
                offset: 0.0,
                weight: 1.0,
                active: true,
            });
        }
        self.recompute_layout();
    }

    pub fn remove_clip(&mut self, clip_id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.clip.id != clip_id);
        let removed = self.tracks.len() != before;
        if removed {
            self.recompute_layout();
        }
        removed
    }

    pub fn clear_clips(&mut self) {
        self.tracks.clear();
        self.recompute_layout();
    }

    /// Clamped to [0,1]. Returns false for an unknown clip or a non-finite weight.
    pub fn set_blend_weight(&mut self, clip_id: &str, weight: f32) -> bool {
        if !weight.is_finite() {
            log::debug!("timeline: ignoring non-finite weight for {clip_id}");
            return false;
        }
        match self.tracks.iter_mut().find(|t| t.clip.id == clip_id) {
            Some(track) => {
                track.weight = weight.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    // ---------- Host wiring ----------

    /// Route poses of `element_id` to `target`. Replaces any previous binding.
    pub fn bind_target(&mut self, element_id: impl Into<String>, target: impl RenderTarget + 'static) {
        if self.disposed {
            return;
        }
        self.targets.insert(element_id.into(), Box::new(target));
    }

    pub fn unbind_target(&mut self, element_id: &str) -> bool {
        self.targets.remove(element_id).is_some()
    }

    pub fn on_update(&mut self, callback: impl FnMut(&TimelineSnapshot) + Send + 'static) {
        if self.disposed {
            return;
        }
        self.on_update = Some(Box::new(callback));
    }

    // ---------- Modes ----------

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
        if mode != LoopMode::PingPong {
            self.direction = Direction::Forward;
        }
    }

    pub fn set_playback_mode(&mut self, mode: PlaybackMode) {
        if self.playback_mode != mode {
            self.playback_mode = mode;
            self.recompute_layout();
        }
    }

    pub fn set_stagger(&mut self, stagger: f32) {
        self.stagger = sanitize_stagger(stagger);
        self.recompute_layout();
    }

    /// Non-finite or non-positive multipliers are ignored.
    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed;
        } else {
            log::debug!("timeline: ignoring speed {speed}");
        }
    }

    // ---------- Transport ----------

    pub fn play(&mut self) {
        if self.disposed || self.status == TimelineStatus::Playing {
            return;
        }
        if self.tracks.is_empty() {
            log::debug!("timeline: play ignored, no clips");
            return;
        }
        let resumed = self.status == TimelineStatus::Paused;
        if self.ended {
            self.rewind();
        }
        self.status = TimelineStatus::Playing;
        self.events.push(if resumed {
            TimelineEvent::Resumed
        } else {
            TimelineEvent::Started
        });
    }

    pub fn pause(&mut self) {
        if self.disposed || self.status != TimelineStatus::Playing {
            return;
        }
        self.status = TimelineStatus::Paused;
        self.events.push(TimelineEvent::Paused);
    }

    /// Back to time 0 facing forward with every track re-activated, and the
    /// first-keyframe pose written. Calling it again changes nothing.
    pub fn stop(&mut self) {
        if self.disposed {
            return;
        }
        if self.status != TimelineStatus::Stopped {
            self.events.push(TimelineEvent::Stopped);
        }
        self.status = TimelineStatus::Stopped;
        self.rewind();
        self.poses = self.evaluate_start_pose();
        self.emit();
    }

    /// Jump to `time` (clamped to the duration) and re-evaluate. Direction and
    /// the active set are kept; NaN/infinite times are ignored.
    pub fn seek(&mut self, time: f32) {
        if self.disposed {
            return;
        }
        if !time.is_finite() {
            log::debug!("timeline: ignoring seek to {time}");
            return;
        }
        let from = self.time;
        self.time = time.clamp(0.0, self.duration);
        self.events.push(TimelineEvent::Seeked {
            from,
            to: self.time,
        });
        self.poses = self.evaluate(self.time, &[]);
        self.emit();
    }

    /// Advance by `dt` seconds of host time. Returns the snapshot handed to the
    /// update callback, or `None` when not playing.
    pub fn tick(&mut self, dt: f32) -> Option<TimelineSnapshot> {
        if self.disposed || self.status != TimelineStatus::Playing {
            return None;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let delta = dt * self.speed;

        let (peak, reached_end) = self.advance_clock(delta);

        // One-shots that reached their end this tick show their final pose once.
        let mut completed = Vec::new();
        for (idx, track) in self.tracks.iter_mut().enumerate() {
            if track.active
                && !track.clip.looping
                && peak - track.offset >= track.clip.duration
            {
                track.active = false;
                completed.push(idx);
                log::debug!("timeline: clip {} completed", track.clip.id);
                self.events.push(TimelineEvent::ClipCompleted {
                    clip_id: track.clip.id.clone(),
                });
            }
        }

        self.poses = self.evaluate(self.time, &completed);

        let none_active = !self.tracks.iter().any(|t| t.active);
        if reached_end || none_active {
            self.status = TimelineStatus::Stopped;
            self.ended = true;
            self.events.push(TimelineEvent::Ended { time: self.time });
        }

        Some(self.emit())
    }

    /// Drive the engine from `source` until it stops playing or the source runs
    /// dry. Returns the number of ticks.
    pub fn run(&mut self, source: &mut dyn FrameSource) -> usize {
        let mut frames = 0;
        while self.is_playing() {
            let Some(dt) = source.next_delta() else {
                break;
            };
            self.tick(dt);
            frames += 1;
        }
        frames
    }

    /// Drop the callback, targets and tracks. Every later call is a no-op and
    /// the callback is never invoked again.
    pub fn dispose(&mut self) {
        self.on_update = None;
        self.targets.clear();
        self.tracks.clear();
        self.events.clear();
        self.poses.clear();
        self.status = TimelineStatus::Stopped;
        self.duration = 0.0;
        self.time = 0.0;
        self.disposed = true;
    }

    // ---------- Read-only views ----------

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.status == TimelineStatus::Playing
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn current_time(&self) -> f32 {
        self.time
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn status(&self) -> TimelineStatus {
        self.status
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn active_clips(&self) -> Vec<String> {
        self.tracks
            .iter()
            .filter(|t| t.active)
            .map(|t| t.clip.id.clone())
            .collect()
    }

    /// Start offset of a clip on the timeline.
    pub fn clip_offset(&self, clip_id: &str) -> Option<f32> {
        self.tracks
            .iter()
            .find(|t| t.clip.id == clip_id)
            .map(|t| t.offset)
    }

    pub fn state(&self) -> TimelineState {
        TimelineState {
            current_time: self.time,
            duration: self.duration,
            is_playing: self.is_playing(),
            status: self.status,
            direction: self.direction,
            playback_speed: self.speed,
            loop_mode: self.loop_mode,
            playback_mode: self.playback_mode,
            active_clips: self.active_clips(),
            blend_weights: self
                .tracks
                .iter()
                .map(|t| (t.clip.id.clone(), t.weight))
                .collect(),
        }
    }

    /// Snapshot of the current clock and last evaluated poses, without events.
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            time: self.time,
            duration: self.duration,
            progress: self.progress(),
            status: self.status,
            direction: self.direction,
            speed: self.speed,
            loop_mode: self.loop_mode,
            active_clips: self.active_clips(),
            poses: self.poses.clone(),
            events: Vec::new(),
        }
    }

    // ---------- Internals ----------

    fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Move the clock by `delta`. Returns the furthest forward time touched
    /// during the step (for one-shot completion) and whether once mode hit the end.
    fn advance_clock(&mut self, delta: f32) -> (f32, bool) {
        let d = self.duration;
        match self.loop_mode {
            LoopMode::Once => {
                let raw = self.time + delta;
                if raw >= d {
                    self.time = d;
                    (d, true)
                } else {
                    self.time = raw;
                    (raw, false)
                }
            }
            LoopMode::Forever => {
                let raw = self.time + delta;
                if d > 0.0 && raw >= d {
                    let count = (raw / d).floor() as u32;
                    self.time = fmod(raw, d);
                    self.events.push(TimelineEvent::Looped { count });
                } else {
                    self.time = raw;
                }
                (raw, false)
            }
            LoopMode::PingPong => {
                let start = self.time;
                let peak = match self.direction {
                    Direction::Forward => (start + delta).min(d),
                    Direction::Backward if delta > start => start.max((delta - start).min(d)),
                    Direction::Backward => start,
                };
                let (time, direction) = advance_ping_pong(start, self.direction, delta, d);
                if direction != self.direction {
                    self.events.push(TimelineEvent::Reversed { direction });
                }
                self.time = time;
                self.direction = direction;
                (peak, false)
            }
        }
    }

    /// Sample active tracks (plus `completed`, pinned to their last keyframe)
    /// at timeline time `t` and resolve.
    fn evaluate(&self, t: f32, completed: &[usize]) -> ElementPoses {
        let mut acc = Accumulator::new();
        for (idx, track) in self.tracks.iter().enumerate() {
            let u = if completed.contains(&idx) {
                Some(1.0)
            } else if track.active {
                track.local_u(t)
            } else {
                None
            };
            if let Some(u) = u {
                let clip = &track.clip;
                acc.add(
                    &clip.element_id,
                    clip.priority,
                    clip.blend_mode,
                    track.weight,
                    sample_clip(clip, u),
                );
            }
        }
        acc.finalize()
    }

    /// Every track at its first keyframe, offsets ignored.
    fn evaluate_start_pose(&self) -> ElementPoses {
        let mut acc = Accumulator::new();
        for track in &self.tracks {
            let clip = &track.clip;
            acc.add(
                &clip.element_id,
                clip.priority,
                clip.blend_mode,
                track.weight,
                sample_clip(clip, 0.0),
            );
        }
        acc.finalize()
    }

    fn rewind(&mut self) {
        self.time = 0.0;
        self.direction = Direction::Forward;
        self.ended = false;
        for track in &mut self.tracks {
            track.active = true;
        }
    }

    /// Write poses to targets and hand one snapshot (carrying the pending
    /// events) to the callback.
    fn emit(&mut self) -> TimelineSnapshot {
        for (element_id, pose) in &self.poses {
            if let Some(target) = self.targets.get_mut(element_id) {
                write_pose(target.as_mut(), pose);
            }
        }
        let mut snapshot = self.snapshot();
        snapshot.events = std::mem::take(&mut self.events);
        if let Some(callback) = self.on_update.as_mut() {
            callback(&snapshot);
        }
        snapshot
    }

    fn recompute_layout(&mut self) {
        let mut cursor = 0.0f32;
        let mut duration = 0.0f32;
        for (idx, track) in self.tracks.iter_mut().enumerate() {
            track.offset = match self.playback_mode {
                PlaybackMode::Simultaneous => idx as f32 * self.stagger,
                PlaybackMode::Sequential => cursor,
            };
            cursor += track.clip.duration;
            duration = duration.max(track.offset + track.clip.duration);
        }
        self.duration = duration;
        if self.time > duration {
            self.time = duration;
        }
        if self.tracks.is_empty() && self.status == TimelineStatus::Playing {
            self.status = TimelineStatus::Stopped;
            self.ended = true;
            self.events.push(TimelineEvent::Ended { time: self.time });
        }
    }
}

fn sanitize_stagger(stagger: f32) -> f32 {
    if stagger.is_finite() && stagger >= 0.0 {
        stagger
    } else {
        log::debug!("timeline: ignoring stagger {stagger}");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AnimationKeyframe, BlendMode, ClipType};
    use crate::easing::Easing;
    use crate::value::Property;
    use approx::assert_relative_eq;

    fn ramp(id: &str, duration: f32, looping: bool) -> Arc<AnimationClip> {
        Arc::new(AnimationClip {
            id: id.into(),
            element_id: "e".into(),
            clip_type: if looping { ClipType::Idle } else { ClipType::Win },
            keyframes: vec![
                AnimationKeyframe::new(0.0, Easing::Linear).with(Property::X, 0.0),
                AnimationKeyframe::new(1.0, Easing::Linear).with(Property::X, 10.0),
            ],
            looping,
            duration,
            priority: if looping { 1 } else { 3 },
            blend_mode: BlendMode::Normal,
        })
    }

    #[test]
    fn sequential_layout_accumulates_offsets() {
        let mut tl = TimelineEngine::new(TimelineConfig {
            playback_mode: PlaybackMode::Sequential,
            ..TimelineConfig::default()
        });
        tl.add_clip(ramp("a", 1.0, false));
        tl.add_clip(ramp("b", 2.0, false));
        tl.add_clip(ramp("c", 0.5, false));
        assert_eq!(tl.clip_offset("c"), Some(3.0));
        assert_relative_eq!(tl.duration(), 3.5);

        tl.set_playback_mode(PlaybackMode::Simultaneous);
        assert_eq!(tl.clip_offset("c"), Some(0.0));
        assert_relative_eq!(tl.duration(), 2.0);
        tl.set_stagger(0.25);
        assert_eq!(tl.clip_offset("c"), Some(0.5));
        assert_relative_eq!(tl.duration(), 2.25);
    }

    #[test]
    fn weights_clamp_and_unknown_ids_are_reported() {
        let mut tl = TimelineEngine::default();
        tl.add_clip(ramp("a", 1.0, true));
        assert!(tl.set_blend_weight("a", 3.0));
        assert!(!tl.set_blend_weight("nope", 0.5));
        assert!(!tl.set_blend_weight("a", f32::NAN));
        assert_eq!(tl.state().blend_weights["a"], 1.0);
        tl.set_blend_weight("a", -2.0);
        assert_eq!(tl.state().blend_weights["a"], 0.0);
    }

    #[test]
    fn removing_last_clip_while_playing_ends_session() {
        let mut tl = TimelineEngine::default();
        tl.add_clip(ramp("a", 1.0, true));
        tl.play();
        assert!(tl.remove_clip("a"));
        assert_eq!(tl.status(), TimelineStatus::Stopped);
        assert!(tl.tick(0.1).is_none());
    }

    #[test]
    fn ping_pong_peak_completes_one_shot_at_the_turn() {
        let mut tl = TimelineEngine::new(TimelineConfig {
            loop_mode: LoopMode::PingPong,
            ..TimelineConfig::default()
        });
        tl.add_clip(ramp("loop", 1.0, true));
        tl.add_clip(ramp("shot", 1.0, false));
        tl.play();
        let snap = tl.tick(1.25).expect("playing");
        assert_relative_eq!(snap.time, 0.75, epsilon = 1e-5);
        assert_eq!(snap.direction, Direction::Backward);
        assert!(snap.has_event(|e| matches!(e, TimelineEvent::ClipCompleted { clip_id } if clip_id == "shot")));
        assert_eq!(snap.active_clips, vec!["loop".to_string()]);
    }
}
