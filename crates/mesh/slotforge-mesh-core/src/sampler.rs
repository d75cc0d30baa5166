//! Alpha-channel access and silhouette extraction.
//!
//! Pixel access goes through [`ImageSampler`] so the pipeline can run against
//! synthetic buffers in tests and against decoded images in hosts without
//! depending on any image-decoding library.

use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::geometry::{BoundingBox, Point};

/// Read-only alpha access to a raster image.
pub trait ImageSampler {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Alpha at (x, y). Callers stay within `width × height`.
    fn alpha_at(&self, x: u32, y: u32) -> u8;
}

/// Straight RGBA8 buffer, row-major.
#[derive(Clone, Debug)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaImage {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, MeshError> {
        if width == 0 || height == 0 {
            return Err(MeshError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(MeshError::InvalidImageBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

impl ImageSampler for RgbaImage {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    #[inline]
    fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }
}

/// Single-channel alpha buffer.
#[derive(Clone, Debug)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Result<Self, MeshError> {
        if width == 0 || height == 0 {
            return Err(MeshError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(MeshError::InvalidImageBuffer {
                expected,
                actual: alpha.len(),
            });
        }
        Ok(Self {
            width,
            height,
            alpha,
        })
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        let mut alpha = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                alpha.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            alpha,
        }
    }
}

impl ImageSampler for AlphaMask {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    #[inline]
    fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.alpha[y as usize * self.width as usize + x as usize]
    }
}

/// Inclusive pixel bounds of the opaque region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl PixelBounds {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn to_bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x: self.min_x as f32,
            y: self.min_y as f32,
            width: self.width() as f32,
            height: self.height() as f32,
        }
    }
}

/// Smallest rectangle containing every pixel with alpha above `threshold`.
pub fn detect_pixel_bounds<S: ImageSampler + ?Sized>(
    sampler: &S,
    threshold: u8,
) -> Option<PixelBounds> {
    let mut bounds: Option<PixelBounds> = None;
    for y in 0..sampler.height() {
        for x in 0..sampler.width() {
            if sampler.alpha_at(x, y) <= threshold {
                continue;
            }
            let b = bounds.get_or_insert(PixelBounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            });
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
    }
    bounds
}

/// Clockwise (on screen) 8-neighbourhood, starting east.
const DIRS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

fn dir_index(dx: i64, dy: i64) -> usize {
    DIRS.iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(WEST)
}

/// Trace the outer boundary of the first opaque region met in raster order
/// using Moore-neighbour tracing.
///
/// Returns the boundary pixels' coordinates in traversal order (clockwise on
/// screen) without a closing duplicate. An image with no opaque pixel yields an
/// empty contour; an isolated pixel yields a single point.
pub fn trace_contour<S: ImageSampler + ?Sized>(sampler: &S, threshold: u8) -> Vec<Point> {
    let (w, h) = (sampler.width() as i64, sampler.height() as i64);
    let opaque = |x: i64, y: i64| {
        x >= 0 && y >= 0 && x < w && y < h && sampler.alpha_at(x as u32, y as u32) > threshold
    };

    let Some(start) = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .find(|&(x, y)| opaque(x, y))
    else {
        return Vec::new();
    };

    let mut contour = vec![start];
    let mut current = start;
    // The raster scan guarantees the western neighbour of `start` is clear.
    let mut back = WEST;
    let max_steps = 4 * (w * h) as usize + 8;

    for _ in 0..max_steps {
        let step = (1..=8).map(|k| (back + k) % 8).find_map(|d| {
            let next = (current.0 + DIRS[d].0, current.1 + DIRS[d].1);
            opaque(next.0, next.1).then_some((next, d))
        });
        let Some((next, d)) = step else {
            break;
        };
        if current == start && contour.len() > 1 && next == contour[1] {
            break;
        }
        let prev_probe = DIRS[(d + 7) % 8];
        back = dir_index(
            current.0 + prev_probe.0 - next.0,
            current.1 + prev_probe.1 - next.1,
        );
        current = next;
        contour.push(current);
    }
    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }

    contour
        .into_iter()
        .map(|(x, y)| Point::new(x as f32, y as f32))
        .collect()
}

/// Express pixel-space points as percentages of the image dimensions.
pub fn contour_to_percent(points: &[Point], width: u32, height: u32) -> Vec<Point> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    points
        .iter()
        .map(|p| {
            Point::new(
                p.x / width as f32 * 100.0,
                p.y / height as f32 * 100.0,
            )
        })
        .collect()
}
