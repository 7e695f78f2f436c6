//! Rectangles and affine view transforms.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// An axis-aligned rectangle in glyph space or screen space.
///
/// Points are rectangles with zero width and height. Intersection treats a
/// degenerate axis as a half-open containment test, so a point sitting on the
/// shared edge of two pixels belongs to exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Create a rectangle from its minimum and maximum corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a rectangle from two arbitrary corners.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// A zero-size rectangle at `(x, y)`.
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// A `width` x `height` rectangle centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        let hw = width.abs() / 2.0;
        let hh = height.abs() / 2.0;
        Self::new(cx - hw, cy - hh, cx + hw, cy + hh)
    }

    /// The zero-area rectangle at the origin, used as the bounds of an empty set.
    pub fn zero() -> Self {
        Self::point(0.0, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check if this rectangle intersects another.
    ///
    /// Non-degenerate axes need a positive-length overlap; touching edges do
    /// not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        overlaps(self.min_x, self.max_x, other.min_x, other.max_x)
            && overlaps(self.min_y, self.max_y, other.min_y, other.max_y)
    }

    /// Half-open containment: `[min_x, max_x) x [min_y, max_y)`.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the rectangle by `dx` on the left and right and `dy` on top and bottom.
    pub fn expand(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Integer pixel columns and rows this rectangle covers when interpreted in
    /// screen space.
    ///
    /// Pixel `(px, py)` is the unit square `[px, px+1) x [py, py+1)`; the ranges
    /// returned here are exactly the pixels for which [`Rect::intersects`]
    /// holds against that square.
    pub fn covered_pixels(&self) -> (Range<i64>, Range<i64>) {
        (
            pixel_range(self.min_x, self.max_x),
            pixel_range(self.min_y, self.max_y),
        )
    }
}

fn overlaps(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    match (a0 == a1, b0 == b1) {
        (false, false) => a0 < b1 && a1 > b0,
        (true, false) => b0 <= a0 && a0 < b1,
        (false, true) => a0 <= b0 && b0 < a1,
        (true, true) => a0 == b0,
    }
}

fn pixel_range(min: f64, max: f64) -> Range<i64> {
    let start = min.floor();
    let end = if max > min { max.ceil() } else { start + 1.0 };
    (start as i64)..(end as i64)
}

/// Scale-and-translate mapping from glyph space to screen space.
///
/// `screen = glyph * scale + translate`, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub fn new(scale_x: f64, scale_y: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale_x,
            scale_y,
            translate_x,
            translate_y,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 1.0, 0.0, 0.0)
    }

    pub fn scale(scale_x: f64, scale_y: f64) -> Self {
        Self::new(scale_x, scale_y, 0.0, 0.0)
    }

    /// Transform that fits `bounds` into a `width` x `height` viewport,
    /// preserving aspect ratio and placing the bounds' minimum corner at the
    /// origin.
    pub fn zoom_fit(bounds: &Rect, width: usize, height: usize) -> Self {
        let bw = bounds.width();
        let bh = bounds.height();

        let sx = if bw > 0.0 { width as f64 / bw } else { f64::INFINITY };
        let sy = if bh > 0.0 { height as f64 / bh } else { f64::INFINITY };
        let scale = sx.min(sy);
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        Self::new(scale, scale, -bounds.min_x * scale, -bounds.min_y * scale)
    }

    /// Map a single coordinate pair.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale_x + self.translate_x,
            y * self.scale_y + self.translate_y,
        )
    }

    /// Map a rectangle. Negative scales flip the corners, which are re-sorted.
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let (x0, y0) = self.apply(rect.min_x, rect.min_y);
        let (x1, y1) = self.apply(rect.max_x, rect.max_y);
        Rect::from_corners(x0, y0, x1, y1)
    }

    pub fn is_invertible(&self) -> bool {
        self.scale_x != 0.0
            && self.scale_y != 0.0
            && self.scale_x.is_finite()
            && self.scale_y.is_finite()
            && self.translate_x.is_finite()
            && self.translate_y.is_finite()
    }

    /// Screen-to-glyph transform, or `None` when a scale is zero or non-finite.
    pub fn inverse(&self) -> Option<ViewTransform> {
        if !self.is_invertible() {
            return None;
        }
        Some(Self::new(
            1.0 / self.scale_x,
            1.0 / self.scale_y,
            -self.translate_x / self.scale_x,
            -self.translate_y / self.scale_y,
        ))
    }
}
