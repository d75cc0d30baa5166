use std::sync::Arc;

use approx::assert_relative_eq;
use serde_json::Value as Json;
use slotforge_animation::{
    export, AnimationClip, BakingConfig, ClipLibrary, ExportFormat, MotionProfile,
};
use slotforge_mesh::{ElementKind, MeshProcessor, MeshRequest, ProcessedMesh};

fn body() -> (ProcessedMesh, Vec<Arc<AnimationClip>>) {
    let request: MeshRequest =
        slotforge_test_fixtures::contours::load("square-body").expect("load contour fixture");
    let mesh = MeshProcessor::default().process(&request);
    let clips = ClipLibrary::default().generate_clips("sym", "body", &mesh);
    (mesh, clips)
}

fn f(v: &Json) -> f32 {
    v.as_f64().map(|x| x as f32).unwrap_or(f32::NAN)
}

#[test]
fn spine_skeleton_has_bone_slot_and_mesh_attachment() {
    let (mesh, clips) = body();
    let doc = export(ExportFormat::Spine, "sym", &mesh, &clips, &BakingConfig::default())
        .expect("spine export");

    assert_eq!(doc["skeleton"]["spine"], "3.8.99");
    assert_eq!(doc["bones"][0]["name"], "root");
    let bone = &doc["bones"][1];
    assert_eq!(bone["name"], "sym");
    assert_eq!(bone["parent"], "root");
    assert_relative_eq!(f(&bone["x"]), 50.0);
    assert_relative_eq!(f(&bone["y"]), -50.0);
    assert_eq!(doc["slots"][0]["bone"], "sym");

    let attachment = &doc["skins"][0]["attachments"]["sym"]["sym"];
    assert_eq!(attachment["type"], "mesh");
    let hull = attachment["hull"].as_u64().expect("hull") as usize;
    assert_eq!(hull, mesh.simplified_points.len());
    let vertices = attachment["vertices"].as_array().expect("vertices");
    let uvs = attachment["uvs"].as_array().expect("uvs");
    assert_eq!(vertices.len(), hull * 2);
    assert_eq!(uvs.len(), hull * 2);
    assert!(uvs.iter().map(f).all(|u| (0.0..=1.0).contains(&u)));
    // Bone-relative: the square is centered on the bone.
    assert!(vertices.iter().map(f).all(|v| v.abs() <= 50.0 + 1e-4));

    let triangles = attachment["triangles"].as_array().expect("triangles");
    assert_eq!(triangles.len(), mesh.triangles.len());
    assert!(triangles
        .iter()
        .all(|i| (i.as_u64().unwrap_or(u64::MAX) as usize) < hull));

    let animations = doc["animations"].as_object().expect("animations");
    let mut names: Vec<&str> = animations.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, ["bonus", "idle", "intro", "scatter", "wild", "win"]);
}

#[test]
fn spine_timelines_carry_seconds_negated_angles_and_curves() {
    let (mesh, clips) = body();
    let doc = export(ExportFormat::Spine, "sym", &mesh, &clips, &BakingConfig::default())
        .expect("spine export");

    let MotionProfile::Win { spin_degrees, .. } =
        MotionProfile::for_role(slotforge_animation::ClipType::Win, ElementKind::Body)
    else {
        panic!("win profile");
    };

    let rotate = doc["animations"]["win"]["bones"]["sym"]["rotate"]
        .as_array()
        .expect("rotate timeline");
    assert_eq!(rotate.len(), 5);
    // Keyframe at 0.2 of a 1.5s clip.
    assert_relative_eq!(f(&rotate[1]["time"]), 0.3, epsilon = 1e-5);
    assert_relative_eq!(f(&rotate[1]["angle"]), -spin_degrees * 0.5, epsilon = 1e-4);

    // Ease-out leaves the first key as a bezier; the final linear key has none.
    assert!(rotate[0]["curve"].is_number());
    assert!(rotate[0]["c4"].is_number());
    assert!(rotate[4].get("curve").is_none());

    let rgba = doc["animations"]["wild"]["slots"]["sym"]["rgba"]
        .as_array()
        .expect("rgba timeline");
    assert_eq!(rgba[0]["color"], "ffffffff");
    assert_eq!(rgba.len(), clips[3].keyframes.len());
}

#[test]
fn spine_rejects_degenerate_meshes() {
    let request: MeshRequest =
        slotforge_test_fixtures::contours::load("empty").expect("load contour fixture");
    let mesh = MeshProcessor::default().process(&request);
    let clips = ClipLibrary::default().generate_clips("ghost", "eye", &mesh);

    let err = export(ExportFormat::Spine, "ghost", &mesh, &clips, &BakingConfig::default())
        .expect_err("no triangles");
    assert_eq!(err.category(), "export");
    assert!(err.to_string().contains("spine"), "{err}");

    // Baked output does not need triangles.
    assert!(export(ExportFormat::Baked, "ghost", &mesh, &clips, &BakingConfig::default()).is_ok());
}

#[test]
fn export_refuses_clips_of_another_element() {
    let (mesh, mut clips) = body();
    let other = ClipLibrary::default().generate_clips("other", "body", &mesh);
    clips.push(other[0].clone());

    for format in [ExportFormat::Spine, ExportFormat::Baked] {
        let err = export(format, "sym", &mesh, &clips, &BakingConfig::default())
            .expect_err("stray clip");
        assert!(err.to_string().contains("other:idle"), "{err}");
    }
}

#[test]
fn baked_export_samples_every_clip_at_the_frame_rate() {
    let (mesh, clips) = body();
    let doc = export(
        ExportFormat::Baked,
        "sym",
        &mesh,
        &clips,
        &BakingConfig { frame_rate: 10.0 },
    )
    .expect("baked export");

    assert_eq!(doc["format"], "baked");
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["elementId"], "sym");
    assert_eq!(
        doc["mesh"]["triangles"].as_array().map(Vec::len),
        Some(mesh.triangles.len())
    );

    let baked = doc["clips"].as_array().expect("clips");
    assert_eq!(baked.len(), 6);
    // idle 2s, win 1.5s at 10fps, both ends inclusive.
    assert_eq!(baked[0]["frameCount"], 21);
    assert_eq!(baked[1]["frameCount"], 16);
    assert_eq!(baked[0]["loop"], true);
    for track in baked[1]["tracks"].as_array().expect("tracks") {
        assert_eq!(track["values"].as_array().map(Vec::len), Some(16));
    }
}

#[test]
fn export_format_names_parse_from_json() {
    let spine: ExportFormat = serde_json::from_str("\"spine\"").expect("spine");
    assert_eq!(spine, ExportFormat::Spine);
    assert_eq!(ExportFormat::Baked.name(), "baked");
    assert!(serde_json::from_str::<ExportFormat>("\"dragonbones\"").is_err());
}
