//! Folding glyphs into grid cells.

use ar_common::{Aggregates, Aggregator, Glyph, ViewTransform};

/// Combine `glyph` into every cell of `grid` that its screen-space shape
/// covers. Cells outside the grid are skipped.
pub(crate) fn combine_glyph<V, A, R>(
    grid: &mut Aggregates<A>,
    aggregator: &R,
    view: &ViewTransform,
    glyph: &Glyph<V>,
) where
    A: Clone,
    R: Aggregator<V, A> + ?Sized,
{
    let screen = view.apply_rect(glyph.shape());
    let (xs, ys) = screen.covered_pixels();

    let x0 = xs.start.max(grid.low_x() as i64);
    let x1 = xs.end.min(grid.high_x() as i64);
    let y0 = ys.start.max(grid.low_y() as i64);
    let y1 = ys.end.min(grid.high_y() as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            grid.update(x as i32, y as i32, |cell| aggregator.combine(cell, glyph));
        }
    }
}
