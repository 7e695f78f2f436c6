//! Pixel tiles and glyph ranges used to partition render work.

use ar_common::{Aggregates, Rect};
use std::ops::Range;

/// Half-open block of pixels `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelTile {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelTile {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }

    /// The whole `width` x `height` viewport.
    pub fn viewport(width: usize, height: usize) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Self::new(0, 0, w, h)
    }

    /// The tile spanned by an existing grid.
    pub fn of<A>(grid: &Aggregates<A>) -> Self {
        Self::new(grid.low_x(), grid.low_y(), grid.high_x(), grid.high_y())
    }

    pub fn width(&self) -> u64 {
        (self.x1 as i64 - self.x0 as i64) as u64
    }

    pub fn height(&self) -> u64 {
        (self.y1 as i64 - self.y0 as i64) as u64
    }

    pub fn pixels(&self) -> u64 {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels() == 0
    }

    /// Whether a tile of this size still needs splitting at `task_size`.
    pub fn should_split(&self, task_size: u64) -> bool {
        self.pixels() > task_size && (self.width() > 1 || self.height() > 1)
    }

    /// Halve along the longer side.
    pub fn halve(&self) -> (PixelTile, PixelTile) {
        if self.width() >= self.height() {
            let mid = self.x0 + (self.width() / 2) as i32;
            (
                PixelTile::new(self.x0, self.y0, mid, self.y1),
                PixelTile::new(mid, self.y0, self.x1, self.y1),
            )
        } else {
            let mid = self.y0 + (self.height() / 2) as i32;
            (
                PixelTile::new(self.x0, self.y0, self.x1, mid),
                PixelTile::new(self.x0, mid, self.x1, self.y1),
            )
        }
    }

    /// Screen-space rectangle covered by the tile.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x0 as f64, self.y0 as f64, self.x1 as f64, self.y1 as f64)
    }

    /// A grid over this tile with every cell set to `default`.
    pub fn grid<A: Clone>(&self, default: A) -> Aggregates<A> {
        Aggregates::new(self.x0, self.y0, self.x1, self.y1, default)
    }
}

/// Whether a glyph index range holds at least `2 * task_size` items, so that
/// both halves keep at least `task_size`.
pub fn should_split_range(range: &Range<u64>, task_size: u64) -> bool {
    let len = range.end.saturating_sub(range.start);
    len >= task_size.saturating_mul(2) && len > 1
}

pub fn halve_range(range: &Range<u64>) -> (Range<u64>, Range<u64>) {
    let mid = range.start + range.end.saturating_sub(range.start) / 2;
    (range.start..mid, mid..range.end)
}
