use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use proptest::prelude::*;
use slotforge_animation::{
    shared_buffer, AnimationClip, AnimationKeyframe, BlendMode, ClipType, Direction, Easing,
    FixedStep, LoopMode, PlaybackMode, PoseBuffer, Property, TimelineConfig, TimelineEngine,
    TimelineEvent, TimelineStatus, Value,
};

fn clip(
    id: &str,
    element: &str,
    duration: f32,
    looping: bool,
    priority: u8,
    blend_mode: BlendMode,
    property: Property,
    from: f32,
    to: f32,
) -> Arc<AnimationClip> {
    Arc::new(AnimationClip {
        id: id.into(),
        element_id: element.into(),
        clip_type: if looping { ClipType::Idle } else { ClipType::Win },
        keyframes: vec![
            AnimationKeyframe::new(0.0, Easing::Linear).with(property, from),
            AnimationKeyframe::new(1.0, Easing::Linear).with(property, to),
        ],
        looping,
        duration,
        priority,
        blend_mode,
    })
}

/// Looping X ramp 0 -> 10 on element "e".
fn idle_ramp(duration: f32) -> Arc<AnimationClip> {
    clip("e:idle", "e", duration, true, 1, BlendMode::Normal, Property::X, 0.0, 10.0)
}

fn engine(loop_mode: LoopMode) -> TimelineEngine {
    TimelineEngine::new(TimelineConfig {
        loop_mode,
        ..TimelineConfig::default()
    })
}

fn x_of(buffer: &Arc<Mutex<PoseBuffer>>) -> f32 {
    buffer
        .lock()
        .expect("buffer lock")
        .scalar(Property::X)
        .unwrap_or(f32::NAN)
}

fn writes(buffer: &Arc<Mutex<PoseBuffer>>) -> usize {
    buffer.lock().expect("buffer lock").writes
}

#[test]
fn stop_is_idempotent() {
    let mut tl = engine(LoopMode::Forever);
    let buffer = shared_buffer();
    tl.bind_target("e", buffer.clone());
    tl.add_clip(idle_ramp(1.0));
    tl.add_clip(clip("e:win", "e", 0.2, false, 3, BlendMode::Normal, Property::Y, 0.0, 5.0));
    tl.play();
    tl.tick(0.3);
    assert_eq!(tl.active_clips(), vec!["e:idle".to_string()]);

    tl.stop();
    let first_state = tl.state();
    let first_pose = buffer.lock().expect("lock").pose.clone();
    tl.stop();

    assert_eq!(tl.state(), first_state);
    assert_eq!(buffer.lock().expect("lock").pose, first_pose);
    assert_eq!(first_state.current_time, 0.0);
    assert_eq!(first_state.direction, Direction::Forward);
    assert_eq!(first_state.status, TimelineStatus::Stopped);
    assert_eq!(first_state.active_clips.len(), 2);
    assert_eq!(first_pose[&Property::X], Value::Scalar(0.0));
}

#[test]
fn once_mode_clamps_and_stops_then_play_rewinds() {
    let mut tl = engine(LoopMode::Once);
    let buffer = shared_buffer();
    tl.bind_target("e", buffer.clone());
    tl.add_clip(idle_ramp(1.0));
    tl.play();
    tl.tick(0.6);
    let snap = tl.tick(0.6).expect("still playing at start of tick");

    assert_eq!(snap.time, 1.0);
    assert_eq!(snap.status, TimelineStatus::Stopped);
    assert!(snap.has_event(|e| matches!(e, TimelineEvent::Ended { .. })));
    // Final pose of a looping clip at its duration wraps to u = 0.
    assert_relative_eq!(x_of(&buffer), 0.0);
    assert!(tl.tick(0.1).is_none());

    tl.play();
    assert_eq!(tl.current_time(), 0.0);
    let snap = tl.tick(0.25).expect("playing");
    assert_relative_eq!(snap.time, 0.25);
    assert!(snap.has_event(|e| matches!(e, TimelineEvent::Started)));
}

#[test]
fn forever_wraps_and_reports_loop_count() {
    let mut tl = engine(LoopMode::Forever);
    tl.add_clip(idle_ramp(1.0));
    tl.play();
    let snap = tl.tick(2.5).expect("playing");
    assert_relative_eq!(snap.time, 0.5);
    assert!(snap.has_event(|e| matches!(e, TimelineEvent::Looped { count: 2 })));
    assert!(snap.is_playing());
}

proptest! {
    #[test]
    fn forever_time_is_elapsed_modulo_duration(duration in 0.25f32..4.0, factor in 1.0f32..20.0) {
        let raw = duration * factor;
        let mut tl = engine(LoopMode::Forever);
        tl.add_clip(idle_ramp(duration));
        tl.play();
        tl.tick(raw);
        prop_assert_eq!(tl.current_time(), raw % duration);
        prop_assert!(tl.current_time() < duration);
    }

    #[test]
    fn forever_accumulated_ticks_stay_on_the_modulo(
        duration in 0.5f32..3.0,
        steps in prop::collection::vec(0.0f32..0.5, 1..40),
    ) {
        let mut tl = engine(LoopMode::Forever);
        tl.add_clip(idle_ramp(duration));
        tl.play();
        let mut raw = 0.0f64;
        for dt in &steps {
            tl.tick(*dt);
            raw += *dt as f64;
        }
        let expected = (raw % duration as f64) as f32;
        let diff = (tl.current_time() - expected).abs();
        // Distance on the circle of circumference `duration`.
        prop_assert!(diff.min(duration - diff) < 1e-3, "time {} expected {}", tl.current_time(), expected);
    }
}

#[test]
fn ping_pong_reverses_and_seek_keeps_direction() {
    let mut tl = engine(LoopMode::PingPong);
    tl.add_clip(idle_ramp(2.0));
    tl.play();
    tl.tick(1.5);
    let snap = tl.tick(1.0).expect("playing");
    assert_relative_eq!(snap.time, 1.5);
    assert_eq!(snap.direction, Direction::Backward);
    assert!(snap.has_event(|e| matches!(
        e,
        TimelineEvent::Reversed {
            direction: Direction::Backward
        }
    )));

    tl.seek(1.0);
    assert_eq!(tl.direction(), Direction::Backward);
    let snap = tl.tick(0.25).expect("playing");
    assert_relative_eq!(snap.time, 0.75);

    // Bounce off zero: 0.75 back, 1.25 forward.
    let snap = tl.tick(2.0).expect("playing");
    assert_relative_eq!(snap.time, 1.25, epsilon = 1e-5);
    assert_eq!(snap.direction, Direction::Forward);
}

#[test]
fn seek_clamps_ignores_nan_and_writes_immediately() {
    let mut tl = engine(LoopMode::Forever);
    let buffer = shared_buffer();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    tl.on_update(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    tl.bind_target("e", buffer.clone());
    tl.add_clip(clip("e:win", "e", 2.0, false, 3, BlendMode::Normal, Property::X, 0.0, 10.0));

    tl.seek(99.0);
    assert_eq!(tl.current_time(), 2.0);
    assert_relative_eq!(x_of(&buffer), 10.0);
    tl.seek(-1.0);
    assert_eq!(tl.current_time(), 0.0);
    tl.seek(1.0);
    assert_relative_eq!(x_of(&buffer), 5.0);

    tl.seek(f32::NAN);
    assert_eq!(tl.current_time(), 1.0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Seeking never retires or revives clips and never starts playback.
    assert_eq!(tl.status(), TimelineStatus::Stopped);
    assert_eq!(tl.active_clips(), vec!["e:win".to_string()]);
}

#[test]
fn invalid_speeds_are_ignored() {
    let mut tl = engine(LoopMode::Forever);
    tl.add_clip(idle_ramp(10.0));
    tl.set_speed(2.0);
    tl.set_speed(0.0);
    tl.set_speed(-1.0);
    tl.set_speed(f32::NAN);
    tl.set_speed(f32::INFINITY);
    assert_eq!(tl.state().playback_speed, 2.0);
    tl.play();
    let snap = tl.tick(0.25).expect("playing");
    assert_relative_eq!(snap.time, 0.5);
}

#[test]
fn higher_priority_one_shot_overrides_then_retires() {
    let mut tl = engine(LoopMode::Forever);
    let buffer = shared_buffer();
    tl.bind_target("e", buffer.clone());
    // Win is added first; priority, not order, decides.
    tl.add_clip(clip("e:win", "e", 1.0, false, 3, BlendMode::Normal, Property::X, 100.0, 200.0));
    tl.add_clip(idle_ramp(1.0));
    tl.play();

    tl.tick(0.5);
    assert_relative_eq!(x_of(&buffer), 150.0, epsilon = 1e-4);

    let snap = tl.tick(0.6).expect("playing");
    assert!(snap.has_event(
        |e| matches!(e, TimelineEvent::ClipCompleted { clip_id } if clip_id == "e:win")
    ));
    // The completing tick shows the final keyframe once.
    assert_relative_eq!(x_of(&buffer), 200.0, epsilon = 1e-4);
    assert_eq!(snap.active_clips, vec!["e:idle".to_string()]);

    tl.tick(0.1);
    assert_relative_eq!(x_of(&buffer), 2.0, epsilon = 1e-4);
}

#[test]
fn blend_weight_mixes_normal_clips() {
    let mut tl = engine(LoopMode::Forever);
    tl.add_clip(clip("e:a", "e", 1.0, true, 1, BlendMode::Normal, Property::Y, 10.0, 10.0));
    tl.add_clip(clip("e:b", "e", 1.0, true, 3, BlendMode::Normal, Property::Y, 30.0, 30.0));
    tl.set_blend_weight("e:b", 0.25);
    tl.play();
    let snap = tl.tick(0.1).expect("playing");
    let y = snap.poses["e"][&Property::Y].as_scalar().unwrap_or(f32::NAN);
    assert_relative_eq!(y, 15.0, epsilon = 1e-4);
}

#[test]
fn additive_clip_offsets_the_base_pose() {
    let mut tl = engine(LoopMode::Forever);
    tl.add_clip(clip("e:idle", "e", 1.0, true, 1, BlendMode::Normal, Property::ScaleX, 1.2, 1.2));
    tl.add_clip(clip("e:scatter", "e", 1.0, true, 2, BlendMode::Additive, Property::ScaleX, 0.9, 0.9));
    tl.play();
    let snap = tl.tick(0.1).expect("playing");
    let sx = snap.poses["e"][&Property::ScaleX].as_scalar().unwrap_or(f32::NAN);
    assert_relative_eq!(sx, 1.1, epsilon = 1e-5);
}

#[test]
fn sequential_mode_starts_clips_back_to_back() {
    let mut tl = TimelineEngine::new(TimelineConfig {
        loop_mode: LoopMode::Once,
        playback_mode: PlaybackMode::Sequential,
        ..TimelineConfig::default()
    });
    tl.add_clip(clip("a:win", "a", 1.0, false, 3, BlendMode::Normal, Property::X, 0.0, 10.0));
    tl.add_clip(clip("b:win", "b", 1.0, false, 3, BlendMode::Normal, Property::X, 0.0, 10.0));
    assert_relative_eq!(tl.duration(), 2.0);
    tl.play();

    let snap = tl.tick(0.5).expect("playing");
    assert!(snap.poses.contains_key("a"));
    assert!(!snap.poses.contains_key("b"));

    let snap = tl.tick(1.0).expect("playing");
    assert!(snap.has_event(
        |e| matches!(e, TimelineEvent::ClipCompleted { clip_id } if clip_id == "a:win")
    ));
    let bx = snap.poses["b"][&Property::X].as_scalar().unwrap_or(f32::NAN);
    assert_relative_eq!(bx, 5.0, epsilon = 1e-4);
    assert_eq!(snap.active_clips, vec!["b:win".to_string()]);
}

#[test]
fn engine_stops_when_every_one_shot_completed() {
    let mut tl = engine(LoopMode::Forever);
    tl.add_clip(clip("e:win", "e", 1.0, false, 3, BlendMode::Normal, Property::X, 0.0, 1.0));
    tl.play();
    tl.tick(0.5);
    let snap = tl.tick(0.5).expect("playing");
    assert_eq!(snap.status, TimelineStatus::Stopped);
    assert!(snap.active_clips.is_empty());
    assert!(snap.has_event(|e| matches!(e, TimelineEvent::Ended { .. })));

    // A new session brings the clip back.
    tl.play();
    assert_eq!(tl.active_clips(), vec!["e:win".to_string()]);
}

#[test]
fn pause_freezes_clock_and_writes() {
    let mut tl = engine(LoopMode::Forever);
    let buffer = shared_buffer();
    tl.bind_target("e", buffer.clone());
    tl.add_clip(idle_ramp(1.0));
    tl.play();
    tl.tick(0.2);
    let before = writes(&buffer);

    tl.pause();
    assert!(tl.tick(0.2).is_none());
    assert_eq!(writes(&buffer), before);
    assert_relative_eq!(tl.current_time(), 0.2);

    tl.play();
    let snap = tl.tick(0.2).expect("resumed");
    assert!(snap.has_event(|e| matches!(e, TimelineEvent::Paused)));
    assert!(snap.has_event(|e| matches!(e, TimelineEvent::Resumed)));
    assert_relative_eq!(snap.time, 0.4);
}

#[test]
fn disposed_engine_never_calls_back() {
    let mut tl = engine(LoopMode::Forever);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    tl.on_update(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    tl.add_clip(idle_ramp(1.0));
    tl.play();
    tl.tick(0.1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tl.dispose();
    tl.play();
    assert!(tl.tick(0.1).is_none());
    tl.seek(0.5);
    tl.stop();
    tl.add_clip(idle_ramp(1.0));
    tl.on_update(|_| panic!("callback after dispose"));
    tl.play();
    tl.tick(0.1);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(tl.is_disposed());
    assert!(tl.active_clips().is_empty());
}

#[test]
fn run_drives_until_once_mode_ends() {
    let mut tl = engine(LoopMode::Once);
    tl.add_clip(idle_ramp(1.0));
    tl.play();
    let frames = tl.run(&mut FixedStep::new(0.25, 100));
    assert_eq!(frames, 4);
    assert_eq!(tl.status(), TimelineStatus::Stopped);

    tl.play();
    let mut deltas = vec![0.1f32, 0.1].into_iter();
    let frames = tl.run(&mut move || deltas.next());
    assert_eq!(frames, 2);
    assert!(tl.is_playing());
}
