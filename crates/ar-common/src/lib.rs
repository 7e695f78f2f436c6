//! Common types shared by the abstract rendering crates.
//!
//! - [`Rect`] and [`ViewTransform`]: glyph and screen geometry
//! - [`Glyph`]: a shape plus a value, identified by [`GlyphId`]
//! - [`Aggregates`]: the dense grid produced by rendering
//! - [`Aggregator`]: the per-cell reduction contract
//! - [`Color`]: the usual output of a transfer chain

pub mod aggregates;
pub mod aggregator;
pub mod color;
pub mod geometry;
pub mod glyph;

pub use aggregates::Aggregates;
pub use aggregator::Aggregator;
pub use color::Color;
pub use geometry::{Rect, ViewTransform};
pub use glyph::{Glyph, GlyphId};
