use approx::assert_relative_eq;
use slotforge_mesh::{
    contour_to_percent, detect_pixel_bounds, properties, simplify, trace_contour, triangulate,
    AlphaMask, CoordSpace, ElementKind, MeshConfig, MeshProcessor, MeshQuality, MeshRequest,
    Point,
};

fn load(name: &str) -> MeshRequest {
    slotforge_test_fixtures::contours::load(name).expect("load contour fixture")
}

#[test]
fn square_body_fixture_produces_two_triangle_mesh() {
    let processor = MeshProcessor::default();
    let mesh = processor.process(&load("square-body"));

    assert_eq!(mesh.element_type, ElementKind::Body);
    assert_eq!(mesh.simplified_points.len(), 4);
    assert_eq!(mesh.triangles.len(), 6);
    assert_relative_eq!(mesh.area, 10_000.0);
    assert_relative_eq!(mesh.perimeter, 400.0);
    assert_eq!(mesh.bounding_box.width, 100.0);
    assert_eq!(mesh.quality, MeshQuality::High);
    assert!(mesh.is_renderable());
}

#[test]
fn concave_fixture_keeps_every_corner() {
    let mesh = MeshProcessor::default().process(&load("l-shape"));
    assert_eq!(mesh.element_type, ElementKind::Leg);
    assert_eq!(mesh.simplified_points, mesh.original_points);
    assert_eq!(mesh.triangle_count(), 4);
    assert_relative_eq!(mesh.area, 1600.0);
    assert_relative_eq!(mesh.perimeter, 200.0);
}

#[test]
fn star_fixture_triangulates_fully() {
    let mesh = MeshProcessor::default().process(&load("star-wild"));
    // "wild_star" names no structural role.
    assert_eq!(mesh.element_type, ElementKind::Generic);
    assert_eq!(mesh.simplified_points.len(), 10);
    assert_eq!(mesh.triangles.len(), 3 * 8);
}

#[test]
fn percent_wing_fixture_is_reduced_to_its_target() {
    let request = load("wing-percent");
    assert_eq!(request.space, CoordSpace::Percent);
    let mesh = MeshProcessor::default().process(&request);

    assert_eq!(mesh.element_type, ElementKind::Wing);
    let n = mesh.simplified_points.len();
    assert!((3..=12).contains(&n), "got {n} points");
    assert_eq!(mesh.triangles.len(), 3 * (n - 2));
    // Pixel space: the wing spans 80% of a 256px wide image.
    assert!(mesh.bounding_box.width > 200.0 && mesh.bounding_box.width < 210.0);
    assert!(mesh.quality >= MeshQuality::Medium);
}

#[test]
fn empty_contour_is_low_quality_and_unrenderable() {
    let mesh = MeshProcessor::default().process(&load("empty"));
    assert!(mesh.simplified_points.is_empty());
    assert!(mesh.triangles.is_empty());
    assert_eq!(mesh.area, 0.0);
    assert_eq!(mesh.perimeter, 0.0);
    assert_eq!(mesh.quality, MeshQuality::Low);
}

#[test]
fn two_point_contour_keeps_its_points() {
    let request = MeshRequest::pixels(
        vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
        "antenna",
        32,
        32,
    );
    let mesh = MeshProcessor::default().process(&request);
    assert_eq!(mesh.simplified_points.len(), 2);
    assert!(mesh.triangles.is_empty());
    assert_eq!(mesh.quality, MeshQuality::Low);
}

#[test]
fn explicit_target_overrides_role_budget() {
    let ring: Vec<Point> = (0..40)
        .map(|i| {
            let a = i as f32 / 40.0 * std::f32::consts::TAU;
            let r = if i % 2 == 0 { 50.0 } else { 30.0 };
            Point::new(50.0 + r * a.cos(), 50.0 + r * a.sin())
        })
        .collect();
    let request = MeshRequest::pixels(ring, "body", 100, 100).with_target(8);
    let mesh = MeshProcessor::default().process(&request);
    assert_eq!(mesh.simplified_points.len(), 8);
    assert_eq!(mesh.triangles.len(), 3 * 6);
}

#[test]
fn traced_square_simplifies_to_its_corners() {
    let mask = AlphaMask::from_fn(16, 16, |x, y| {
        if (2..12).contains(&x) && (2..12).contains(&y) {
            255
        } else {
            0
        }
    });
    let bounds = detect_pixel_bounds(&mask, 10).expect("opaque pixels");
    assert_eq!((bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y), (2, 2, 11, 11));

    let contour = trace_contour(&mask, 10);
    assert_eq!(contour.len(), 36);
    assert_eq!(contour[0], Point::new(2.0, 2.0));

    let corners = simplify(&contour, 4);
    assert_eq!(
        corners,
        vec![
            Point::new(2.0, 2.0),
            Point::new(11.0, 2.0),
            Point::new(11.0, 11.0),
            Point::new(2.0, 11.0),
        ]
    );
    assert_eq!(triangulate(&corners).len(), 6);
    assert_relative_eq!(properties(&corners).area, 81.0);

    let pct = contour_to_percent(&corners, 16, 16);
    assert_relative_eq!(pct[2].x, 68.75);
}

#[test]
fn process_image_uses_alpha_threshold() {
    let mask = AlphaMask::from_fn(8, 8, |x, y| if x < 6 && y < 4 { 40 } else { 0 });
    let cfg = MeshConfig {
        alpha_threshold: 50,
        ..MeshConfig::default()
    };
    let hidden = MeshProcessor::new(cfg).process_image(&mask, "tail", None);
    assert!(hidden.simplified_points.is_empty());

    let visible = MeshProcessor::default().process_image(&mask, "tail", None);
    assert_eq!(visible.element_type, ElementKind::Tail);
    assert!(visible.is_renderable());
}

#[test]
fn processed_mesh_serializes_camel_case() {
    let mesh = MeshProcessor::default().process(&load("square-body"));
    let json = serde_json::to_value(&mesh).expect("serialize mesh");
    assert_eq!(json["elementType"], "body");
    assert_eq!(json["quality"], "high");
    assert!(json["simplifiedPoints"].is_array());
    assert!(json["boundingBox"]["width"].is_number());
}
