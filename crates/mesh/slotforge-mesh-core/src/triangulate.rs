//! Ear-clipping triangulation for simple polygons without holes.

use crate::geometry::{cross, signed_area, Point};

/// Relative tolerance under which a vertex turn counts as flat.
const FLAT_TOLERANCE: f32 = 1e-5;

/// Triangulate a simple polygon. Returns a flat list of index triples into
/// `points`, `3 × (n − 2)` long for a simple polygon of `n` vertices.
///
/// Collinear vertices are clipped as zero-area ears so the count stays exact.
/// If no ear can be found at some step (self-intersecting input) the result is
/// empty.
pub fn triangulate(points: &[Point]) -> Vec<u32> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let orientation = if signed_area(points) >= 0.0 { 1.0 } else { -1.0 };
    let mut ring: Vec<usize> = (0..n).collect();
    let mut out = Vec::with_capacity((n - 2) * 3);

    while ring.len() > 3 {
        let ear = find_ear(points, &ring, orientation, EarPass::Strict)
            .or_else(|| find_ear(points, &ring, orientation, EarPass::AllowFlat));
        let Some(pos) = ear else {
            log::warn!(
                "triangulate: no ear among {} remaining vertices; polygon is not simple",
                ring.len()
            );
            return Vec::new();
        };
        let k = ring.len();
        let (a, b, c) = (ring[(pos + k - 1) % k], ring[pos], ring[(pos + 1) % k]);
        out.extend_from_slice(&[a as u32, b as u32, c as u32]);
        ring.remove(pos);
    }
    out.extend(ring.iter().map(|&i| i as u32));
    out
}

/// Triangulate a flat `[x0, y0, x1, y1, ...]` coordinate list. A trailing odd
/// coordinate is ignored.
pub fn triangulate_flat(coords: &[f32]) -> Vec<u32> {
    let points: Vec<Point> = coords
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect();
    triangulate(&points)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EarPass {
    /// Strictly convex corner, no vertex inside or on the candidate triangle.
    Strict,
    /// Flat corners allowed, only vertices strictly inside block.
    AllowFlat,
}

fn find_ear(points: &[Point], ring: &[usize], orientation: f32, pass: EarPass) -> Option<usize> {
    let k = ring.len();
    (0..k).find(|&pos| {
        let a = points[ring[(pos + k - 1) % k]];
        let b = points[ring[pos]];
        let c = points[ring[(pos + 1) % k]];
        let turn = cross(a, b, c) * orientation;
        let flat_eps = FLAT_TOLERANCE * a.distance(&b) * b.distance(&c);
        let corner_ok = match pass {
            EarPass::Strict => turn > flat_eps,
            EarPass::AllowFlat => turn >= -flat_eps,
        };
        if !corner_ok {
            return false;
        }
        !ring.iter().any(|&other| {
            let p = points[other];
            if p == a || p == b || p == c {
                return false;
            }
            match pass {
                EarPass::Strict => in_triangle_inclusive(p, a, b, c),
                EarPass::AllowFlat => in_triangle_strict(p, a, b, c),
            }
        })
    })
}

#[inline]
fn orient(a: Point, b: Point, p: Point) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn in_triangle_inclusive(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = orient(a, b, p);
    let d2 = orient(b, c, p);
    let d3 = orient(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn in_triangle_strict(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = orient(a, b, p);
    let d2 = orient(b, c, p);
    let d3 = orient(c, a, p);
    (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
}
