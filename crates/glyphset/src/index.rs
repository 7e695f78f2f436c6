//! Uniform bucket grid for spatial queries over in-memory glyphs.

use ar_common::Rect;
use std::ops::Range;

/// Largest bucket grid side.
const MAX_SIDE: usize = 1024;

/// Glyph indices bucketed by a uniform grid over the set's bounds.
///
/// Queries return a superset of the intersecting glyphs; callers re-test the
/// exact geometry.
#[derive(Debug)]
pub(crate) struct BucketIndex {
    bounds: Rect,
    nx: usize,
    ny: usize,
    cell_w: f64,
    cell_h: f64,
    buckets: Vec<Vec<usize>>,
}

impl BucketIndex {
    pub(crate) fn build<'a>(bounds: Rect, shapes: impl ExactSizeIterator<Item = &'a Rect>) -> Self {
        let side = ((shapes.len() as f64).sqrt() / 2.0).ceil() as usize;
        let side = side.clamp(1, MAX_SIDE);

        let (nx, cell_w) = axis(bounds.width(), side);
        let (ny, cell_h) = axis(bounds.height(), side);

        let mut index = Self {
            bounds,
            nx,
            ny,
            cell_w,
            cell_h,
            buckets: vec![Vec::new(); nx * ny],
        };

        for (i, shape) in shapes.enumerate() {
            let (xs, ys) = index.cells(shape);
            for by in ys {
                for bx in xs.clone() {
                    index.buckets[by * nx + bx].push(i);
                }
            }
        }

        index
    }

    /// Candidate glyph indices for `query`, sorted and deduplicated.
    pub(crate) fn candidates(&self, query: &Rect) -> Vec<usize> {
        let (xs, ys) = self.cells(query);
        let mut out = Vec::new();
        for by in ys {
            for bx in xs.clone() {
                out.extend_from_slice(&self.buckets[by * self.nx + bx]);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    fn cells(&self, rect: &Rect) -> (Range<usize>, Range<usize>) {
        (
            cell_range(rect.min_x, rect.max_x, self.bounds.min_x, self.cell_w, self.nx),
            cell_range(rect.min_y, rect.max_y, self.bounds.min_y, self.cell_h, self.ny),
        )
    }
}

fn axis(extent: f64, side: usize) -> (usize, f64) {
    if extent > 0.0 && extent.is_finite() {
        (side, extent / side as f64)
    } else {
        (1, 1.0)
    }
}

/// Inclusive bucket span for `[min, max]`, clamped to the grid.
fn cell_range(min: f64, max: f64, origin: f64, size: f64, n: usize) -> Range<usize> {
    let last = (n - 1) as f64;
    let lo = ((min - origin) / size).floor().clamp(0.0, last) as usize;
    let hi = ((max - origin) / size).floor().clamp(0.0, last) as usize;
    lo..hi.max(lo) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_cover_spanning_shape_once() {
        let shapes = vec![
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::point(10.0, 10.0),
            Rect::point(90.0, 90.0),
        ];
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let index = BucketIndex::build(bounds, shapes.iter());

        let found = index.candidates(&Rect::new(85.0, 85.0, 95.0, 95.0));
        assert!(found.contains(&0));
        assert!(found.contains(&2));
        assert_eq!(found.iter().filter(|i| **i == 0).count(), 1);
    }

    #[test]
    fn test_degenerate_bounds() {
        let shapes = vec![Rect::point(5.0, 5.0), Rect::point(5.0, 5.0)];
        let index = BucketIndex::build(Rect::point(5.0, 5.0), shapes.iter());
        assert_eq!(index.candidates(&Rect::new(0.0, 0.0, 10.0, 10.0)), vec![0, 1]);
    }
}
