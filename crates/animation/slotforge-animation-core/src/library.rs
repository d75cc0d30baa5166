//! Clip registry and procedural clip generation.

use std::sync::Arc;

use hashbrown::HashMap;
use slotforge_mesh::{ElementKind, ProcessedMesh};

use crate::config::{ClipDurations, LibraryConfig};
use crate::data::{AnimationClip, ClipType};
use crate::error::AnimationError;
use crate::profile::MotionProfile;

/// Owns every generated clip, keyed by clip id (`"{elementId}:{type}"`).
///
/// Clips are immutable once generated and handed out as `Arc`s; removing a clip
/// from the library does not invalidate handles already held by a timeline.
#[derive(Debug, Default)]
pub struct ClipLibrary {
    cfg: LibraryConfig,
    clips: HashMap<String, Arc<AnimationClip>>,
    /// Clip ids per element, in generation order.
    by_element: HashMap<String, Vec<String>>,
}

pub fn clip_id(element_id: &str, clip_type: ClipType) -> String {
    format!("{element_id}:{}", clip_type.name())
}

impl ClipLibrary {
    /// Invalid durations or amplitude scale fall back to their defaults.
    pub fn new(cfg: LibraryConfig) -> Self {
        Self {
            cfg: sanitize(cfg),
            clips: HashMap::new(),
            by_element: HashMap::new(),
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.cfg
    }

    /// Generate (or regenerate) the six clips of an element, in the order idle,
    /// win, scatter, wild, bonus, intro.
    pub fn generate_clips(
        &mut self,
        element_id: &str,
        element_type: &str,
        mesh: &ProcessedMesh,
    ) -> Vec<Arc<AnimationClip>> {
        let kind = ElementKind::from_name(element_type);
        let mut out = Vec::with_capacity(ClipType::ALL.len());
        for clip_type in ClipType::ALL {
            let profile = MotionProfile::for_role(clip_type, kind);
            let clip = self
                .generate_clip(element_id, &profile, mesh)
                .or_else(|err| self.generic_fallback(element_id, clip_type, mesh, err));
            match clip {
                Ok(clip) => out.push(clip),
                Err(err) => log::error!("clip generation failed for {element_id}: {err}"),
            }
        }
        log::debug!(
            "generated {} clips for {element_id} ({})",
            out.len(),
            kind.name()
        );
        out
    }

    /// Generate one clip from an explicit profile and register it.
    pub fn generate_clip(
        &mut self,
        element_id: &str,
        profile: &MotionProfile,
        mesh: &ProcessedMesh,
    ) -> Result<Arc<AnimationClip>, AnimationError> {
        self.build_clip(element_id, profile, mesh.bounding_box.height)
    }

    /// Generic profile at the mesh height, then motionless translations.
    fn generic_fallback(
        &mut self,
        element_id: &str,
        clip_type: ClipType,
        mesh: &ProcessedMesh,
        err: AnimationError,
    ) -> Result<Arc<AnimationClip>, AnimationError> {
        log::warn!(
            "{} clip for {element_id} falls back to the generic profile: {err}",
            clip_type.name()
        );
        let generic = MotionProfile::for_role(clip_type, ElementKind::Generic);
        self.build_clip(element_id, &generic, mesh.bounding_box.height)
            .or_else(|_| self.build_clip(element_id, &generic, 0.0))
    }

    fn build_clip(
        &mut self,
        element_id: &str,
        profile: &MotionProfile,
        bbox_height: f32,
    ) -> Result<Arc<AnimationClip>, AnimationError> {
        profile.validate()?;
        let clip_type = profile.clip_type();
        let clip = AnimationClip {
            id: clip_id(element_id, clip_type),
            element_id: element_id.to_string(),
            clip_type,
            keyframes: profile.keyframes(bbox_height, self.cfg.amplitude_scale),
            looping: clip_type.loops(),
            duration: self.cfg.durations.get(clip_type),
            priority: clip_type.priority(),
            blend_mode: clip_type.blend_mode(),
        };
        clip.validate()?;
        Ok(self.insert(clip))
    }

    /// Register a clip built elsewhere. Replaces any clip with the same id.
    pub fn insert(&mut self, clip: AnimationClip) -> Arc<AnimationClip> {
        let moved = self
            .clips
            .get(&clip.id)
            .is_some_and(|old| old.element_id != clip.element_id);
        if moved {
            self.remove(&clip.id);
        }
        let clip = Arc::new(clip);
        let ids = self.by_element.entry(clip.element_id.clone()).or_default();
        if !ids.contains(&clip.id) {
            ids.push(clip.id.clone());
        }
        self.clips.insert(clip.id.clone(), Arc::clone(&clip));
        clip
    }

    pub fn get(&self, id: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(id).cloned()
    }

    /// Like [`get`](Self::get) but reports a missing id as an error.
    pub fn require(&self, id: &str) -> Result<Arc<AnimationClip>, AnimationError> {
        self.get(id)
            .ok_or_else(|| AnimationError::ClipNotFound { id: id.to_string() })
    }

    pub fn clips_for_element(&self, element_id: &str) -> Vec<Arc<AnimationClip>> {
        self.by_element
            .get(element_id)
            .map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<AnimationClip>> {
        let clip = self.clips.remove(id)?;
        if let Some(ids) = self.by_element.get_mut(&clip.element_id) {
            ids.retain(|other| other != id);
            if ids.is_empty() {
                self.by_element.remove(&clip.element_id);
            }
        }
        Some(clip)
    }

    /// Remove every clip of an element; returns how many were removed.
    pub fn remove_element(&mut self, element_id: &str) -> usize {
        let Some(ids) = self.by_element.remove(element_id) else {
            return 0;
        };
        ids.iter().filter(|id| self.clips.remove(*id).is_some()).count()
    }

    pub fn clear(&mut self) {
        self.clips.clear();
        self.by_element.clear();
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

fn sanitize(mut cfg: LibraryConfig) -> LibraryConfig {
    let defaults = ClipDurations::default();
    for clip_type in ClipType::ALL {
        let d = cfg.durations.get(clip_type);
        if !d.is_finite() || d <= 0.0 {
            log::warn!(
                "invalid {} duration {d}; using {}",
                clip_type.name(),
                defaults.get(clip_type)
            );
            *duration_mut(&mut cfg.durations, clip_type) = defaults.get(clip_type);
        }
    }
    if !cfg.amplitude_scale.is_finite() || cfg.amplitude_scale < 0.0 {
        log::warn!("invalid amplitude scale {}; using 1.0", cfg.amplitude_scale);
        cfg.amplitude_scale = 1.0;
    }
    cfg
}

fn duration_mut(d: &mut ClipDurations, clip_type: ClipType) -> &mut f32 {
    match clip_type {
        ClipType::Idle => &mut d.idle,
        ClipType::Win => &mut d.win,
        ClipType::Scatter => &mut d.scatter,
        ClipType::Wild => &mut d.wild,
        ClipType::Bonus => &mut d.bonus,
        ClipType::Intro => &mut d.intro,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotforge_mesh::{MeshProcessor, MeshRequest, Point};

    fn square_mesh() -> ProcessedMesh {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        MeshProcessor::default().process(&MeshRequest::pixels(pts, "body", 100, 100))
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut lib = ClipLibrary::default();
        let mesh = square_mesh();
        lib.generate_clips("a", "body", &mesh);
        lib.generate_clips("b", "wing", &mesh);
        assert_eq!(lib.len(), 12);

        assert!(lib.remove("a:win").is_some());
        assert!(lib.remove("a:win").is_none());
        assert_eq!(lib.clips_for_element("a").len(), 5);

        assert_eq!(lib.remove_element("b"), 6);
        assert!(lib.clips_for_element("b").is_empty());
        assert_eq!(lib.len(), 5);
    }

    #[test]
    fn regeneration_replaces_in_place() {
        let mut lib = ClipLibrary::default();
        let mesh = square_mesh();
        let first = lib.generate_clips("a", "body", &mesh);
        let second = lib.generate_clips("a", "head", &mesh);
        assert_eq!(lib.len(), 6);
        assert_eq!(first[0].id, second[0].id);
        assert_ne!(first[0].keyframes, second[0].keyframes);
    }

    #[test]
    fn bad_config_falls_back() {
        let mut cfg = LibraryConfig::default();
        cfg.durations.win = -1.0;
        cfg.amplitude_scale = f32::NAN;
        let lib = ClipLibrary::new(cfg);
        assert_eq!(lib.config().durations.win, 1.5);
        assert_eq!(lib.config().amplitude_scale, 1.0);
        assert!(matches!(
            lib.require("missing"),
            Err(AnimationError::ClipNotFound { .. })
        ));
    }
}
