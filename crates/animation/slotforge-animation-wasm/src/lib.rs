use std::collections::BTreeMap;

use js_sys::JSON;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use slotforge_animation::{
    AnimationClip, BakingConfig, ClipLibrary, ExportFormat, LibraryConfig, LoopMode,
    PlaybackMode, TimelineConfig, TimelineEngine,
};
use slotforge_mesh::{MeshConfig, MeshProcessor, MeshRequest, ProcessedMesh};

/// Constructor options. Every section is optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub mesh: MeshConfig,
    pub library: LibraryConfig,
    pub timeline: TimelineConfig,
    pub baking: BakingConfig,
}

/// Browser-side session: processed element meshes, their clip library and
/// one timeline.
#[wasm_bindgen]
pub struct AnimationLab {
    processor: MeshProcessor,
    library: ClipLibrary,
    timeline: TimelineEngine,
    baking: BakingConfig,
    meshes: BTreeMap<String, ProcessedMesh>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsError> {
    if jsvalue_is_undefined_or_null(&value) {
        return Err(JsError::new(&format!("{what}: value is null/undefined")));
    }
    swb::from_value(value).map_err(|e| JsError::new(&format!("{what} parse error: {e}")))
}

/// Plain objects rather than JS `Map`s so hosts can index poses directly.
fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("{what} encode error: {e}")))
}

#[wasm_bindgen]
impl AnimationLab {
    /// Create a session. Pass a config object (see `LabConfig`) or undefined/null.
    ///   new AnimationLab({ timeline: { loop_mode: "ping-pong" } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AnimationLab, JsError> {
        console_error_panic_hook::set_once();

        let cfg: LabConfig = if jsvalue_is_undefined_or_null(&config) {
            LabConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(AnimationLab::with_config(cfg))
    }

    /// Run the mesh pipeline on a contour request without storing anything.
    #[wasm_bindgen(js_name = process_mesh)]
    pub fn process_mesh(&self, request: JsValue) -> Result<JsValue, JsError> {
        let request: MeshRequest = from_js(request, "process_mesh")?;
        to_js(&self.processor.process(&request), "process_mesh")
    }

    /// Process an element's contour, keep its mesh and (re)generate its six
    /// clips. Returns `{ mesh, clipIds }`.
    ///
    /// A degenerate contour for an element that already has a renderable mesh
    /// is rejected and the previous mesh and clips stay in place.
    #[wasm_bindgen(js_name = add_element)]
    pub fn add_element(&mut self, element_id: String, request: JsValue) -> Result<JsValue, JsError> {
        let request: MeshRequest = from_js(request, "add_element")?;
        let clip_ids = self
            .insert_element(&element_id, &request)
            .map_err(|e| JsError::new(&e))?;
        let mesh = self.meshes.get(&element_id);
        to_js(
            &serde_json::json!({ "mesh": mesh, "clipIds": clip_ids }),
            "add_element",
        )
    }

    /// Drop an element, its clips and their timeline tracks. Returns the
    /// number of clips removed.
    #[wasm_bindgen(js_name = remove_element)]
    pub fn remove_element(&mut self, element_id: &str) -> u32 {
        for clip in self.library.clips_for_element(element_id) {
            self.timeline.remove_clip(&clip.id);
        }
        self.meshes.remove(element_id);
        self.library.remove_element(element_id) as u32
    }

    /// Clip JSON by id, or null.
    #[wasm_bindgen]
    pub fn clip(&self, clip_id: &str) -> Result<JsValue, JsError> {
        match self.library.get(clip_id) {
            Some(clip) => to_js(clip.as_ref(), "clip"),
            None => Ok(JsValue::NULL),
        }
    }

    /// Register a hand-authored clip. Returns its id.
    #[wasm_bindgen(js_name = load_clip)]
    pub fn load_clip(&mut self, clip_json: JsValue) -> Result<String, JsError> {
        if jsvalue_is_undefined_or_null(&clip_json) {
            return Err(JsError::new("load_clip: clip_json is null/undefined"));
        }
        // Stringify so the clip goes through the same serde_json path as files.
        let s = JSON::stringify(&clip_json)
            .map_err(|e| JsError::new(&format!("load_clip stringify error: {e:?}")))?
            .as_string()
            .ok_or_else(|| JsError::new("load_clip: stringify produced non-string"))?;
        let clip: AnimationClip = serde_json::from_str(&s)
            .map_err(|e| JsError::new(&format!("load_clip parse error: {e}")))?;
        clip.validate().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(self.library.insert(clip).id.clone())
    }

    // ----- timeline -----

    /// Put a library clip on the timeline.
    #[wasm_bindgen(js_name = add_to_timeline)]
    pub fn add_to_timeline(&mut self, clip_id: &str) -> Result<(), JsError> {
        let clip = self
            .library
            .require(clip_id)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.timeline.add_clip(clip);
        Ok(())
    }

    #[wasm_bindgen(js_name = remove_from_timeline)]
    pub fn remove_from_timeline(&mut self, clip_id: &str) -> bool {
        self.timeline.remove_clip(clip_id)
    }

    #[wasm_bindgen(js_name = clear_timeline)]
    pub fn clear_timeline(&mut self) {
        self.timeline.clear_clips();
    }

    #[wasm_bindgen(js_name = set_blend_weight)]
    pub fn set_blend_weight(&mut self, clip_id: &str, weight: f32) -> bool {
        self.timeline.set_blend_weight(clip_id, weight)
    }

    /// "once" | "loop" | "ping-pong"
    #[wasm_bindgen(js_name = set_loop_mode)]
    pub fn set_loop_mode(&mut self, mode: JsValue) -> Result<(), JsError> {
        let mode: LoopMode = from_js(mode, "set_loop_mode")?;
        self.timeline.set_loop_mode(mode);
        Ok(())
    }

    /// "simultaneous" | "sequential"
    #[wasm_bindgen(js_name = set_playback_mode)]
    pub fn set_playback_mode(&mut self, mode: JsValue) -> Result<(), JsError> {
        let mode: PlaybackMode = from_js(mode, "set_playback_mode")?;
        self.timeline.set_playback_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(js_name = set_speed)]
    pub fn set_speed(&mut self, speed: f32) {
        self.timeline.set_speed(speed);
    }

    #[wasm_bindgen(js_name = set_stagger)]
    pub fn set_stagger(&mut self, seconds: f32) {
        self.timeline.set_stagger(seconds);
    }

    #[wasm_bindgen]
    pub fn play(&mut self) {
        self.timeline.play();
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.timeline.stop();
    }

    #[wasm_bindgen]
    pub fn seek(&mut self, time: f32) {
        self.timeline.seek(time);
    }

    /// Advance by dt seconds. Returns the snapshot JSON, or null when the
    /// timeline is not playing.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt: f32) -> Result<JsValue, JsError> {
        match self.timeline.tick(dt) {
            Some(snapshot) => to_js(&snapshot, "tick"),
            None => Ok(JsValue::NULL),
        }
    }

    /// Current poses and transport without advancing.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.timeline.snapshot(), "snapshot")
    }

    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.timeline.state(), "state")
    }

    #[wasm_bindgen(js_name = is_playing)]
    pub fn is_playing(&self) -> bool {
        self.timeline.is_playing()
    }

    /// Export an element's mesh and clips. `format` is "spine" or "baked".
    #[wasm_bindgen]
    pub fn export(&self, element_id: &str, format: JsValue) -> Result<JsValue, JsError> {
        let format: ExportFormat = from_js(format, "export")?;
        let doc = self
            .export_json(element_id, format)
            .map_err(|e| JsError::new(&e))?;
        to_js(&doc, "export")
    }

    /// Worker protocol body run with this session's mesh configuration.
    #[wasm_bindgen(js_name = worker_message)]
    pub fn worker_message(&self, message: &str) -> String {
        slotforge_worker::handle_message(&self.processor, message)
    }

    /// Stop for good and release everything the session holds.
    #[wasm_bindgen]
    pub fn dispose(&mut self) {
        self.timeline.dispose();
        self.library.clear();
        self.meshes.clear();
    }
}

/// Body of a browser web worker: one JSON request string in, one JSON
/// response string out (`{ id, type: "SUCCESS" | "ERROR", data?, error? }`).
/// `config` is an optional mesh config object (see `MeshConfig`).
#[wasm_bindgen(js_name = handle_worker_message)]
pub fn handle_worker_message(message: &str, config: JsValue) -> Result<String, JsError> {
    let cfg: MeshConfig = if jsvalue_is_undefined_or_null(&config) {
        MeshConfig::default()
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
    };
    Ok(slotforge_worker::handle_message(&MeshProcessor::new(cfg), message))
}

// Plain Rust side of the session, shared by the bindings above and native hosts.
impl AnimationLab {
    pub fn with_config(cfg: LabConfig) -> Self {
        AnimationLab {
            processor: MeshProcessor::new(cfg.mesh),
            library: ClipLibrary::new(cfg.library),
            timeline: TimelineEngine::new(cfg.timeline),
            baking: cfg.baking,
            meshes: BTreeMap::new(),
        }
    }

    /// Process and store an element, returning its clip ids.
    pub fn insert_element(
        &mut self,
        element_id: &str,
        request: &MeshRequest,
    ) -> Result<Vec<String>, String> {
        let mesh = self.processor.process(request);
        let has_good_mesh = self
            .meshes
            .get(element_id)
            .is_some_and(ProcessedMesh::is_renderable);
        if !mesh.is_renderable() && has_good_mesh {
            log::warn!("add_element: degenerate contour for {element_id}; keeping previous mesh");
            return Err(format!(
                "add_element: contour for {element_id} is degenerate; previous mesh kept"
            ));
        }
        let clips = self
            .library
            .generate_clips(element_id, &request.element_type, &mesh);
        // Regenerated clips replace the ones already on the timeline in place.
        for clip in &clips {
            if self.timeline.clip_offset(&clip.id).is_some() {
                self.timeline.add_clip(clip.clone());
            }
        }
        self.meshes.insert(element_id.to_string(), mesh);
        Ok(clips.iter().map(|c| c.id.clone()).collect())
    }

    pub fn mesh(&self, element_id: &str) -> Option<&ProcessedMesh> {
        self.meshes.get(element_id)
    }

    pub fn export_json(
        &self,
        element_id: &str,
        format: ExportFormat,
    ) -> Result<serde_json::Value, String> {
        let mesh = self
            .meshes
            .get(element_id)
            .ok_or_else(|| format!("export: unknown element {element_id}"))?;
        let clips = self.library.clips_for_element(element_id);
        slotforge_animation::export(format, element_id, mesh, &clips, &self.baking)
            .map_err(|e| e.to_string())
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
