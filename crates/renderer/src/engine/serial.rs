//! Single-tile aggregation on the calling thread.

use crate::error::Result;
use crate::raster::combine_glyph;
use crate::tiling::PixelTile;
use ar_common::{Aggregates, Aggregator, ViewTransform};
use glyphset::Glyphset;

/// Aggregate every glyph covering `tile` into a grid spanning exactly the tile.
///
/// The glyphset is queried with the tile's glyph-space footprint, padded by a
/// pixel so rounding in the inverse transform never drops a glyph; coverage
/// is then decided in screen space.
pub(crate) fn aggregate_tile<V, A, G, R>(
    glyphs: &G,
    aggregator: &R,
    view: &ViewTransform,
    inverse: &ViewTransform,
    tile: PixelTile,
) -> Result<Aggregates<A>>
where
    A: Clone,
    G: Glyphset<V> + ?Sized,
    R: Aggregator<V, A> + ?Sized,
{
    let mut grid = tile.grid(aggregator.identity());
    if tile.is_empty() {
        return Ok(grid);
    }

    let query = inverse.apply_rect(&tile.rect().expand(1.0, 1.0));
    for glyph in glyphs.intersects(&query)? {
        combine_glyph(&mut grid, aggregator, view, &glyph);
    }

    Ok(grid)
}
