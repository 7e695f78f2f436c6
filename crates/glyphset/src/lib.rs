//! Spatially queryable glyph collections.
//!
//! Two implementations of [`Glyphset`] are provided:
//!
//! - [`GlyphList`]: an append-only in-memory list with a bucket index for
//!   spatial queries
//! - [`FileGlyphset`]: fixed-size binary records read from a memory-mapped
//!   file (see [`format`] for the layout)
//!
//! Random access goes through a [`GlyphCursor`]. Each worker opens its own
//! cursor, so decoding state is never shared between threads.
//!
//! # Example
//!
//! ```ignore
//! use glyphset::{FileGlyphset, FileGlyphsetConfig, Glyphset};
//!
//! let glyphs = FileGlyphset::open("points.hbin", FileGlyphsetConfig::with_glyph_size(0.005))?;
//! let bounds = glyphs.bounds()?;
//! let hits = glyphs.intersects(&bounds)?;
//! ```

pub mod error;
pub mod file;
pub mod format;
mod index;
pub mod list;
pub mod writer;

pub use error::{GlyphsetError, Result};
pub use file::{FileCursor, FileGlyphset, FileGlyphsetConfig};
pub use format::{FieldType, Header, Record, RecordReader};
pub use list::{GlyphList, ListCursor};
pub use writer::GlyphFileWriter;

use ar_common::{Glyph, Rect};

/// A queryable collection of glyphs.
///
/// Sets are read-only while shared: bounds are computed once and cached, and
/// queries never mutate the set.
pub trait Glyphset<V>: Send + Sync {
    /// Random-access reader handed to one worker at a time.
    type Cursor<'a>: GlyphCursor<V>
    where
        Self: 'a;

    /// Number of glyphs.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimal rectangle enclosing every glyph; zero-area at the origin when
    /// the set is empty.
    fn bounds(&self) -> Result<Rect>;

    /// Every glyph whose shape intersects `query`, each exactly once, in no
    /// particular order.
    fn intersects(&self, query: &Rect) -> Result<Vec<Glyph<V>>>;

    /// Open an independent cursor for random access.
    fn cursor(&self) -> Self::Cursor<'_>;
}

/// Random access by glyph index.
pub trait GlyphCursor<V> {
    fn get(&mut self, index: u64) -> Result<Glyph<V>>;
}

/// Union of a sequence of shapes, or [`Rect::zero`] when there are none.
pub fn bounds_of<'a>(shapes: impl IntoIterator<Item = &'a Rect>) -> Rect {
    shapes
        .into_iter()
        .fold(None, |acc: Option<Rect>, r| {
            Some(match acc {
                Some(b) => b.union(r),
                None => *r,
            })
        })
        .unwrap_or_else(Rect::zero)
}
