#![cfg(target_arch = "wasm32")]
use js_sys::{Reflect, JSON};
use slotforge_animation_wasm::{abi_version, handle_worker_message, AnimationLab};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js(text: &str) -> JsValue {
    JSON::parse(text).unwrap()
}

fn square_request() -> JsValue {
    js(r#"{
        "elementType": "body",
        "imageWidth": 128,
        "imageHeight": 128,
        "points": [{"x":0,"y":0},{"x":100,"y":0},{"x":100,"y":100},{"x":0,"y":100}]
    }"#)
}

fn get(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults_and_partial_config() {
    assert!(AnimationLab::new(JsValue::UNDEFINED).is_ok());
    assert!(AnimationLab::new(js(r#"{"timeline":{"loop_mode":"ping-pong"}}"#)).is_ok());
    assert!(AnimationLab::new(js(r#"{"timeline":{"loop_mode":"sideways"}}"#)).is_err());
}

#[wasm_bindgen_test]
fn element_clips_play_on_the_timeline() {
    let mut lab = AnimationLab::new(JsValue::NULL).unwrap();
    let added = lab.add_element("sym".into(), square_request()).unwrap();
    let ids = js_sys::Array::from(&get(&added, "clipIds"));
    assert_eq!(ids.length(), 6);
    assert_eq!(ids.get(1).as_string().as_deref(), Some("sym:win"));

    assert!(lab.tick(0.1).unwrap().is_null());
    lab.add_to_timeline("sym:idle").unwrap();
    lab.add_to_timeline("sym:win").unwrap();
    assert!(lab.add_to_timeline("sym:nope").is_err());

    lab.play();
    assert!(lab.is_playing());
    let snap = lab.tick(0.25).unwrap();
    let poses = get(&snap, "poses");
    let pose = get(&poses, "sym");
    assert!(get(&pose, "y").as_f64().is_some());
}

#[wasm_bindgen_test]
fn export_needs_a_known_element() {
    let mut lab = AnimationLab::new(JsValue::NULL).unwrap();
    assert!(lab.export("sym", JsValue::from_str("spine")).is_err());
    lab.add_element("sym".into(), square_request()).unwrap();
    let doc = lab.export("sym", JsValue::from_str("spine")).unwrap();
    assert!(get(&doc, "bones").is_object());
    assert_eq!(lab.remove_element("sym"), 6);
    assert!(lab.clip("sym:idle").unwrap().is_null());
}

#[wasm_bindgen_test]
fn worker_messages_round_trip() {
    let reply = handle_worker_message(
        r#"{"id":"m1","type":"CALCULATE_PROPERTIES","data":{"points":[{"x":0,"y":0},{"x":10,"y":0},{"x":10,"y":10},{"x":0,"y":10}]}}"#,
        JsValue::UNDEFINED,
    )
    .unwrap();
    let v: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(v["id"], "m1");
    assert_eq!(v["type"], "SUCCESS");

    let reply = handle_worker_message("not json", JsValue::NULL).unwrap();
    let v: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(v["type"], "ERROR");
}

#[wasm_bindgen_test]
fn worker_messages_accept_a_mesh_config() {
    let message = r#"{"id":"m2","type":"PROCESS_MESH","data":{"elementType":"body","imageWidth":128,"imageHeight":128,"points":[{"x":0,"y":0},{"x":100,"y":0},{"x":100,"y":100},{"x":0,"y":100}]}}"#;
    let reply = handle_worker_message(message, js(r#"{"quality":{"ultra":0}}"#)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(v["data"]["quality"], "ultra");
    assert!(handle_worker_message(message, js(r#"{"alpha_threshold":"high"}"#)).is_err());
}

#[wasm_bindgen_test]
fn degenerate_readd_keeps_the_previous_element() {
    let mut lab = AnimationLab::new(JsValue::NULL).unwrap();
    lab.add_element("sym".into(), square_request()).unwrap();
    let win_before = JSON::stringify(&lab.clip("sym:win").unwrap()).unwrap();
    let spine_before = JSON::stringify(&lab.export("sym", JsValue::from_str("spine")).unwrap()).unwrap();

    let degenerate = js(r#"{"elementType":"body","imageWidth":128,"imageHeight":128,"points":[]}"#);
    assert!(lab.add_element("sym".into(), degenerate).is_err());

    let win_after = JSON::stringify(&lab.clip("sym:win").unwrap()).unwrap();
    let spine_after = JSON::stringify(&lab.export("sym", JsValue::from_str("spine")).unwrap()).unwrap();
    assert_eq!(win_after, win_before);
    assert_eq!(spine_after, spine_before);
}
