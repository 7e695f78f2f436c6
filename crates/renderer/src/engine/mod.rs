//! The aggregation entry point.
//!
//! A [`Renderer`] owns a [`WorkerPool`] and a [`RenderConfig`]. Aggregation
//! runs with one of three strategies that produce identical grids for lawful
//! aggregators:
//!
//! - [`Strategy::Serial`]: one tile over the viewport on the calling thread.
//! - [`Strategy::GlyphParallel`]: split the glyphs, build a full grid per chunk
//!   and roll the partial grids up.
//! - [`Strategy::PixelParallel`]: split the viewport into disjoint tiles that
//!   each query the glyphset for their own footprint.

mod glyph_parallel;
mod pixel_parallel;
mod serial;

use crate::config::{RenderConfig, Strategy};
use crate::error::{RenderError, Result};
use crate::pool::{catch_panic, WorkerPool};
use crate::tiling::PixelTile;
use crate::transfer::{Executor, Specialized, Transfer};
use ar_common::{Aggregates, Aggregator, ViewTransform};
use glyphset::Glyphset;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Runs aggregation and transfers on a shared worker pool.
#[derive(Debug, Clone)]
pub struct Renderer {
    pool: Arc<WorkerPool>,
    config: RenderConfig,
}

impl Renderer {
    /// Validate `config` and start a worker pool for it.
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.threads)?;
        Ok(Self {
            pool: Arc::new(pool),
            config,
        })
    }

    /// A renderer that shares an existing pool.
    pub fn with_pool(pool: Arc<WorkerPool>, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { pool, config })
    }

    pub fn strategy(&self) -> Strategy {
        self.config.strategy
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Reduce every glyph into a `width` x `height` grid.
    ///
    /// Each cell holds the rollup, starting from `aggregator.identity()`, of
    /// every glyph whose transformed shape covers that pixel. `task_size` is
    /// the number of glyphs per chunk or pixels per tile, depending on the
    /// strategy.
    #[instrument(
        skip_all,
        fields(strategy = %self.config.strategy, width = width, height = height, task_size = task_size)
    )]
    pub fn aggregate<V, A, G, R>(
        &self,
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
        let inverse = view.inverse().ok_or(RenderError::NonInvertibleTransform)?;
        let task_size = task_size.max(1);
        let start = Instant::now();

        let grid = match self.config.strategy {
            Strategy::Serial => catch_panic(|| {
                serial::aggregate_tile(
                    glyphs,
                    aggregator,
                    view,
                    &inverse,
                    PixelTile::viewport(width, height),
                )
            })?,
            Strategy::GlyphParallel => self.pool.run(|| {
                glyph_parallel::aggregate(glyphs, aggregator, view, width, height, task_size)
            })?,
            Strategy::PixelParallel => self.pool.run(|| {
                pixel_parallel::aggregate(
                    glyphs, aggregator, view, &inverse, width, height, task_size,
                )
            })?,
        };

        info!(
            glyphs = glyphs.len(),
            cells = grid.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Aggregation complete"
        );

        Ok(grid)
    }

    /// Apply a specialized transfer to `aggregates`, producing a new grid.
    ///
    /// Item-wise transfers are evaluated in parallel tiles of at most
    /// `task_size` pixels.
    #[instrument(skip_all, fields(task_size = task_size))]
    pub fn transfer<IN, OUT, S>(
        &self,
        aggregates: &Aggregates<IN>,
        specialized: &S,
        task_size: u64,
    ) -> Result<Aggregates<OUT>>
    where
        IN: Clone + Send + Sync,
        OUT: Clone + Send + Sync,
        S: Specialized<In = IN, Out = OUT> + ?Sized,
    {
        let start = Instant::now();
        let out = Executor::new(&self.pool, task_size).apply(specialized, aggregates)?;

        info!(
            cells = out.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Transfer complete"
        );
        Ok(out)
    }

    /// Aggregate, specialize and transfer in one call using the configured
    /// task sizes.
    pub fn render_view<V, A, G, R, T>(
        &self,
        glyphs: &G,
        aggregator: &R,
        transfer: &T,
        view: &ViewTransform,
        width: usize,
        height: usize,
    ) -> Result<Aggregates<T::Out>>
    where
        A: Clone + Send + Sync,
        G: Glyphset<V> + ?Sized,
        R: Aggregator<V, A> + ?Sized,
        T: Transfer<In = A> + ?Sized,
        T::Out: Clone + Send + Sync,
    {
        let aggregates = self.aggregate(glyphs, aggregator, view, width, height, self.config.task_size)?;
        let specialized = transfer.specialize(&aggregates)?;
        self.transfer(&aggregates, &specialized, self.config.transfer_task_size)
    }
}
