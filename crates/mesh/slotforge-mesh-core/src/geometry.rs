//! Pure 2D geometry over pixel-space point sets.
//!
//! Every function here is total: degenerate inputs (too few points) produce a
//! neutral result instead of an error so that noisy contours stay usable.

use serde::{Deserialize, Serialize};

/// Pixel-space point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    #[inline]
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    #[inline]
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Geometric descriptors of a point set, as served by `CALCULATE_PROPERTIES`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryProperties {
    pub bounding_box: BoundingBox,
    pub area: f32,
    pub perimeter: f32,
    pub centroid: Point,
    pub vertex_count: usize,
}

/// Bounding box of `points`. Empty input yields a zero-sized box at the origin.
pub fn bounding_box(points: &[Point]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

/// Signed shoelace area. Positive for counter-clockwise rings in a y-up frame
/// (clockwise on screen). Fewer than 3 points yield 0.
pub fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    // Accumulate in f64 so rotations of the same ring agree bit-for-bit more often.
    let mut sum = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (sum * 0.5) as f32
}

/// Unsigned polygon area.
#[inline]
pub fn area(points: &[Point]) -> f32 {
    signed_area(points).abs()
}

/// Closed-ring perimeter (wraps last -> first). Fewer than 2 points yield 0.
pub fn perimeter(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].distance(&points[(i + 1) % n]))
        .sum()
}

/// Area-weighted centroid; falls back to the vertex mean for zero-area rings.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let a = signed_area(points);
    if a.abs() <= f32::EPSILON {
        let n = points.len() as f32;
        let (sx, sy) = points
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        return Point::new(sx / n, sy / n);
    }
    let n = points.len();
    let (mut cx, mut cy) = (0.0f64, 0.0f64);
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        cx += (p.x as f64 + q.x as f64) * cross;
        cy += (p.y as f64 + q.y as f64) * cross;
    }
    let k = 1.0 / (6.0 * a as f64);
    Point::new((cx * k) as f32, (cy * k) as f32)
}

/// All descriptors at once.
pub fn properties(points: &[Point]) -> GeometryProperties {
    GeometryProperties {
        bounding_box: bounding_box(points),
        area: area(points),
        perimeter: perimeter(points),
        centroid: centroid(points),
        vertex_count: points.len(),
    }
}

/// z-component of (b - a) x (c - b).
#[inline]
pub(crate) fn cross(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}
