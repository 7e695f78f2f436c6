//! Abstract rendering: aggregate glyphs into a grid, then transfer the grid
//! into something displayable.
//!
//! Rendering is split in two phases:
//!
//! 1. **Aggregation** ([`Renderer::aggregate`]) reduces every glyph covering a
//!    pixel into that pixel's cell with an [`Aggregator`](ar_common::Aggregator).
//! 2. **Transfer** ([`Renderer::transfer`]) maps the grid of aggregates to a new
//!    grid, usually of [`Color`](ar_common::Color)s, after the transfer has been
//!    specialized against the grid's statistics.
//!
//! ```ignore
//! let renderer = Renderer::new(RenderConfig::default())?;
//! let view = ViewTransform::zoom_fit(&glyphs.bounds()?, 800, 600);
//! let image = renderer.render_view(
//!     &glyphs,
//!     &Count,
//!     &Interpolate::new(Color::WHITE, Color::RED),
//!     &view,
//!     800,
//!     600,
//! )?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod pool;
mod raster;
pub mod rules;
pub mod tiling;
pub mod transfer;

pub use config::{RenderConfig, Strategy};
pub use engine::Renderer;
pub use error::{RenderError, Result};
pub use pool::{fork_join, SplitTask, WorkerPool};
pub use transfer::{
    ApplyMode, Bulk, CellTransfer, Chain, Executor, ItemWise, Specialized, SpecializedChain,
    Transfer,
};
