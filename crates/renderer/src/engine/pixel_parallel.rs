//! Screen-partitioned aggregation.

use super::serial::aggregate_tile;
use crate::error::Result;
use crate::pool::{fork_join, SplitTask};
use crate::tiling::PixelTile;
use ar_common::{Aggregates, Aggregator, ViewTransform};
use glyphset::Glyphset;
use std::marker::PhantomData;
use tracing::debug;

/// One block of pixels and everything needed to fill it.
struct TileTask<'a, V, A, G: ?Sized, R: ?Sized> {
    glyphs: &'a G,
    aggregator: &'a R,
    view: &'a ViewTransform,
    inverse: &'a ViewTransform,
    tile: PixelTile,
    _types: PhantomData<fn(V) -> A>,
}

impl<V, A, G, R> SplitTask for TileTask<'_, V, A, G, R>
where
    A: Clone + Send,
    G: Glyphset<V> + ?Sized,
    R: Aggregator<V, A> + ?Sized,
{
    type Output = Vec<Aggregates<A>>;

    fn should_split(&self, task_size: u64) -> bool {
        self.tile.should_split(task_size)
    }

    fn split(self) -> (Self, Self) {
        let (left, right) = self.tile.halve();
        (
            Self { tile: left, ..self },
            Self { tile: right, ..self },
        )
    }

    fn compute(self) -> Result<Self::Output> {
        let grid = aggregate_tile(self.glyphs, self.aggregator, self.view, self.inverse, self.tile)?;
        Ok(vec![grid])
    }
}

/// Split the viewport into disjoint tiles, aggregate each one independently and
/// assemble them. Tiles never overlap, so no rollup is needed.
pub(crate) fn aggregate<V, A, G, R>(
    glyphs: &G,
    aggregator: &R,
    view: &ViewTransform,
    inverse: &ViewTransform,
    width: usize,
    height: usize,
    task_size: u64,
) -> Result<Aggregates<A>>
where
    A: Clone + Send,
    G: Glyphset<V> + ?Sized,
    R: Aggregator<V, A> + ?Sized,
{
    let viewport = PixelTile::viewport(width, height);
    let task = TileTask {
        glyphs,
        aggregator,
        view,
        inverse,
        tile: viewport,
        _types: PhantomData,
    };

    let tiles = fork_join(task, task_size, &|mut left: Vec<Aggregates<A>>, right| {
        left.extend(right);
        Ok(left)
    })?;

    debug!(tiles = tiles.len(), "Assembling tiles");

    let mut grid = viewport.grid(aggregator.identity());
    for tile in &tiles {
        grid.insert(tile);
    }
    Ok(grid)
}
