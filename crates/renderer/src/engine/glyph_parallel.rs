//! Glyph-partitioned aggregation.

use crate::error::Result;
use crate::pool::{fork_join, SplitTask};
use crate::raster::combine_glyph;
use crate::tiling::{halve_range, should_split_range, PixelTile};
use ar_common::{Aggregates, Aggregator, ViewTransform};
use glyphset::{GlyphCursor, Glyphset};
use std::marker::PhantomData;
use std::ops::Range;
use tracing::debug;

/// A contiguous run of glyph indices rasterized into a private full grid.
struct ChunkTask<'a, V, A, G: ?Sized, R: ?Sized> {
    glyphs: &'a G,
    aggregator: &'a R,
    view: &'a ViewTransform,
    viewport: PixelTile,
    range: Range<u64>,
    _types: PhantomData<fn(V) -> A>,
}

impl<V, A, G, R> SplitTask for ChunkTask<'_, V, A, G, R>
where
    A: Clone + Send,
    G: Glyphset<V> + ?Sized,
    R: Aggregator<V, A> + ?Sized,
{
    type Output = Aggregates<A>;

    fn should_split(&self, task_size: u64) -> bool {
        should_split_range(&self.range, task_size)
    }

    fn split(self) -> (Self, Self) {
        let (left, right) = halve_range(&self.range);
        (
            Self {
                range: left,
                ..self
            },
            Self {
                range: right,
                ..self
            },
        )
    }

    fn compute(self) -> Result<Self::Output> {
        let mut grid = self.viewport.grid(self.aggregator.identity());
        let mut cursor = self.glyphs.cursor();
        for index in self.range {
            let glyph = cursor.get(index)?;
            combine_glyph(&mut grid, self.aggregator, self.view, &glyph);
        }
        Ok(grid)
    }
}

/// Split the glyphs into chunks, aggregate each chunk over the whole viewport
/// and roll the partial grids up pairwise.
pub(crate) fn aggregate<V, A, G, R>(
    glyphs: &G,
    aggregator: &R,
    view: &ViewTransform,
    width: usize,
    height: usize,
    task_size: u64,
) -> Result<Aggregates<A>>
where
    A: Clone + Send,
    G: Glyphset<V> + ?Sized,
    R: Aggregator<V, A> + ?Sized,
{
    let len = glyphs.len();
    debug!(glyphs = len, "Partitioning glyphs");

    let task = ChunkTask {
        glyphs,
        aggregator,
        view,
        viewport: PixelTile::viewport(width, height),
        range: 0..len,
        _types: PhantomData,
    };

    fork_join(task, task_size, &|mut left: Aggregates<A>, right| {
        left.merge_with(&right, |a, b| aggregator.rollup(a, b));
        Ok(left)
    })
}
