//! Tolerance-driven polygon reduction for closed contours.
//!
//! Two passes: Douglas-Peucker over the closed ring with a tolerance derived from
//! the contour's size and the requested reduction, then Visvalingam removal of the
//! least significant vertices while the ring is still above the target. The
//! result is always an order-preserving subsequence of the input and never has
//! fewer than 3 points when the input had at least 3.

use crate::geometry::{bounding_box, Point};

/// Default multiplier applied to `min(bbox side) × reduction ratio`.
pub const DEFAULT_TOLERANCE_FACTOR: f32 = 0.1;

/// Simplify with the default tolerance factor.
pub fn simplify(points: &[Point], target_count: usize) -> Vec<Point> {
    simplify_with_factor(points, target_count, DEFAULT_TOLERANCE_FACTOR)
}

/// Douglas-Peucker tolerance for reducing `current` points to `target`.
pub fn tolerance_for(points: &[Point], target: usize, factor: f32) -> f32 {
    let current = points.len().max(1) as f32;
    let ratio = (1.0 - target as f32 / current).clamp(0.0, 1.0);
    bounding_box(points).min_side() * ratio * factor
}

/// Reduce `points` towards `target_count` vertices.
///
/// `target_count` below 3 is treated as 3. Inputs with 3 or fewer points are
/// returned unchanged.
pub fn simplify_with_factor(points: &[Point], target_count: usize, factor: f32) -> Vec<Point> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }
    let target = target_count.clamp(3, n);
    if target >= n {
        return points.to_vec();
    }

    let tolerance = tolerance_for(points, target, factor.max(0.0));
    let keep = douglas_peucker_ring(points, tolerance);
    let mut kept: Vec<usize> = (0..n).filter(|&i| keep[i]).collect();

    if kept.len() > target {
        visvalingam_reduce(points, &mut kept, target);
    }
    if kept.len() < 3 {
        pad_from_original(&mut kept, n);
    }
    log::trace!(
        "simplify: {} -> {} points (target {}, tolerance {:.3})",
        n,
        kept.len(),
        target,
        tolerance
    );
    kept.into_iter().map(|i| points[i]).collect()
}

/// Distance from `p` to the segment [a, b].
fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 <= f32::EPSILON {
        return p.distance(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Douglas-Peucker on a closed ring. The ring is split at vertex 0 and the
/// vertex farthest from it; index `n` in the unrolled range stands for vertex 0.
fn douglas_peucker_ring(points: &[Point], tolerance: f32) -> Vec<bool> {
    let n = points.len();
    let at = |i: usize| points[i % n];

    let mut far = 1;
    let mut far_d = -1.0f32;
    for (i, p) in points.iter().enumerate().skip(1) {
        let d = p.distance(&points[0]);
        if d > far_d {
            far_d = d;
            far = i;
        }
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;

    let mut stack = vec![(0usize, far), (far, n)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (a, b) = (at(start), at(end));
        let mut best = start;
        let mut best_d = -1.0f32;
        for i in (start + 1)..end {
            let d = segment_distance(at(i), a, b);
            if d > best_d {
                best_d = d;
                best = i;
            }
        }
        if best_d > tolerance {
            keep[best % n] = true;
            stack.push((start, best));
            stack.push((best, end));
        }
    }
    keep
}

fn triangle_area(a: Point, b: Point, c: Point) -> f32 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() * 0.5
}

/// Drop the vertex with the smallest effective area until `target` remain.
/// Ties resolve to the earliest ring position.
fn visvalingam_reduce(points: &[Point], kept: &mut Vec<usize>, target: usize) {
    while kept.len() > target {
        let k = kept.len();
        let mut min_pos = 0;
        let mut min_area = f32::INFINITY;
        for pos in 0..k {
            let prev = points[kept[(pos + k - 1) % k]];
            let cur = points[kept[pos]];
            let next = points[kept[(pos + 1) % k]];
            let a = triangle_area(prev, cur, next);
            if a < min_area {
                min_area = a;
                min_pos = pos;
            }
        }
        kept.remove(min_pos);
    }
}

/// Refill from the original ordering so the ring is a valid polygon again.
fn pad_from_original(kept: &mut Vec<usize>, n: usize) {
    for i in 0..n {
        if kept.len() >= 3 {
            break;
        }
        if !kept.contains(&i) {
            kept.push(i);
        }
    }
    kept.sort_unstable();
}
