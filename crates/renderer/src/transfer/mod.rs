//! Two-phase transfer functions.
//!
//! A [`Transfer`] is a generic description ("colour by count between these two
//! colours"). Calling [`Transfer::specialize`] with the grid it will be applied
//! to yields a [`Specialized`] transfer that has captured whatever it needs from
//! that grid (minimum, maximum, totals). The specialized transfer reports how it
//! wants to run through [`Specialized::mode`]:
//!
//! - [`ApplyMode::ItemWise`]: every output cell depends only on the input grid
//!   and its coordinates; the executor evaluates cells in parallel tiles.
//! - [`ApplyMode::Bulk`]: the transfer builds the whole output grid itself.

mod chain;

pub use chain::{Chain, SpecializedChain};

use crate::error::Result;
use crate::pool::{catch_panic, fork_join, SplitTask, WorkerPool};
use crate::tiling::PixelTile;
use ar_common::Aggregates;

/// A grid-to-grid mapping before it has seen its input.
pub trait Transfer: Send + Sync {
    type In;
    type Out;
    type Specialized: Specialized<In = Self::In, Out = Self::Out>;

    /// Output value for cells outside the produced grid.
    fn empty_value(&self) -> Self::Out;

    /// Capture statistics from `aggregates`. Specializing twice against the
    /// same grid gives transfers that produce the same output.
    fn specialize(&self, aggregates: &Aggregates<Self::In>) -> Result<Self::Specialized>;
}

/// A transfer bound to the statistics of one grid.
pub trait Specialized: Send + Sync {
    type In;
    type Out;

    fn empty_value(&self) -> Self::Out;

    fn mode(&self) -> ApplyMode<'_, Self::In, Self::Out>;
}

/// How a specialized transfer is applied.
pub enum ApplyMode<'a, IN, OUT> {
    ItemWise(&'a dyn ItemWise<IN, OUT>),
    Bulk(&'a dyn Bulk<IN, OUT>),
}

/// Per-cell transfer. Must be safe to call from many workers at once.
pub trait ItemWise<IN, OUT>: Send + Sync {
    fn at(&self, x: i32, y: i32, aggregates: &Aggregates<IN>) -> OUT;
}

/// Whole-grid transfer.
pub trait Bulk<IN, OUT>: Send + Sync {
    fn process(&self, aggregates: &Aggregates<IN>, executor: &Executor<'_>) -> Result<Aggregates<OUT>>;
}

/// An item-wise transfer with nothing to learn from its input grid.
///
/// Implementing this trait is enough to be a [`Transfer`]: specializing
/// returns a clone, which then runs cell by cell.
pub trait CellTransfer: Clone + Send + Sync {
    type In;
    type Out;

    /// Output value for cells outside the produced grid.
    fn empty(&self) -> Self::Out;

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<Self::In>) -> Self::Out;
}

impl<T: CellTransfer> Transfer for T {
    type In = <T as CellTransfer>::In;
    type Out = <T as CellTransfer>::Out;
    type Specialized = T;

    fn empty_value(&self) -> <T as CellTransfer>::Out {
        self.empty()
    }

    fn specialize(&self, _aggregates: &Aggregates<<T as CellTransfer>::In>) -> Result<T> {
        Ok(self.clone())
    }
}

impl<T: CellTransfer> Specialized for T {
    type In = <T as CellTransfer>::In;
    type Out = <T as CellTransfer>::Out;

    fn empty_value(&self) -> <T as CellTransfer>::Out {
        self.empty()
    }

    fn mode(&self) -> ApplyMode<'_, <T as CellTransfer>::In, <T as CellTransfer>::Out> {
        ApplyMode::ItemWise(self)
    }
}

impl<T: CellTransfer> ItemWise<<T as CellTransfer>::In, <T as CellTransfer>::Out> for T {
    fn at(
        &self,
        x: i32,
        y: i32,
        aggregates: &Aggregates<<T as CellTransfer>::In>,
    ) -> <T as CellTransfer>::Out {
        self.cell(x, y, aggregates)
    }
}

/// Applies specialized transfers on a worker pool.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
    pool: &'a WorkerPool,
    task_size: u64,
}

impl<'a> Executor<'a> {
    pub fn new(pool: &'a WorkerPool, task_size: u64) -> Self {
        Self {
            pool,
            task_size: task_size.max(1),
        }
    }

    pub fn pool(&self) -> &'a WorkerPool {
        self.pool
    }

    pub fn task_size(&self) -> u64 {
        self.task_size
    }

    /// Apply `specialized` to `aggregates`. The output spans the same cells.
    pub fn apply<S>(&self, specialized: &S, aggregates: &Aggregates<S::In>) -> Result<Aggregates<S::Out>>
    where
        S: Specialized + ?Sized,
        S::In: Clone + Send + Sync,
        S::Out: Clone + Send + Sync,
    {
        match specialized.mode() {
            ApplyMode::ItemWise(cells) => {
                let empty = specialized.empty_value();
                let task_size = self.task_size;
                self.pool.run(|| apply_item_wise(cells, aggregates, empty, task_size))
            }
            ApplyMode::Bulk(bulk) => catch_panic(|| bulk.process(aggregates, self)),
        }
    }

    /// Specialize `transfer` against `aggregates` and apply it.
    pub fn specialize_and_apply<T>(
        &self,
        transfer: &T,
        aggregates: &Aggregates<T::In>,
    ) -> Result<Aggregates<T::Out>>
    where
        T: Transfer + ?Sized,
        T::In: Clone + Send + Sync,
        T::Out: Clone + Send + Sync,
    {
        let specialized = catch_panic(|| transfer.specialize(aggregates))?;
        self.apply(&specialized, aggregates)
    }
}

/// Cells of one tile evaluated by an item-wise transfer.
struct CellTask<'a, IN, OUT> {
    cells: &'a dyn ItemWise<IN, OUT>,
    aggregates: &'a Aggregates<IN>,
    empty: &'a OUT,
    tile: PixelTile,
}

impl<IN, OUT> SplitTask for CellTask<'_, IN, OUT>
where
    IN: Sync,
    OUT: Clone + Send + Sync,
{
    type Output = Vec<Aggregates<OUT>>;

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
        let mut out = self.tile.grid(self.empty.clone());
        for y in self.tile.y0..self.tile.y1 {
            for x in self.tile.x0..self.tile.x1 {
                out.set(x, y, self.cells.at(x, y, self.aggregates));
            }
        }
        Ok(vec![out])
    }
}

fn apply_item_wise<IN, OUT>(
    cells: &dyn ItemWise<IN, OUT>,
    aggregates: &Aggregates<IN>,
    empty: OUT,
    task_size: u64,
) -> Result<Aggregates<OUT>>
where
    IN: Clone + Sync,
    OUT: Clone + Send + Sync,
{
    let bounds = PixelTile::of(aggregates);
    let task = CellTask {
        cells,
        aggregates,
        empty: &empty,
        tile: bounds,
    };

    let tiles = fork_join(task, task_size, &|mut left: Vec<Aggregates<OUT>>, right| {
        left.extend(right);
        Ok(left)
    })?;

    let mut out = aggregates.fresh(empty.clone());
    for tile in &tiles {
        out.insert(tile);
    }
    Ok(out)
}
