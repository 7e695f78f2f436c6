//! In-memory glyph list.

use crate::index::BucketIndex;
use crate::{bounds_of, GlyphCursor, Glyphset, GlyphsetError, Result};
use ar_common::{Glyph, GlyphId, Rect};
use std::sync::OnceLock;

/// Below this size queries scan the list instead of building an index.
const INDEX_THRESHOLD: usize = 64;

/// An append-only list of glyphs.
///
/// Ids are insertion indices. Bounds and the spatial index are computed on
/// first use and dropped whenever a glyph is added.
#[derive(Debug)]
pub struct GlyphList<V> {
    glyphs: Vec<Glyph<V>>,
    bounds: OnceLock<Rect>,
    index: OnceLock<BucketIndex>,
}

impl<V> Default for GlyphList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> GlyphList<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            glyphs: Vec::with_capacity(capacity),
            bounds: OnceLock::new(),
            index: OnceLock::new(),
        }
    }

    /// Append a glyph and return its id.
    pub fn add(&mut self, shape: Rect, value: V) -> GlyphId {
        let id = GlyphId(self.glyphs.len() as u64);
        self.glyphs.push(Glyph::new(id, shape, value));
        self.bounds = OnceLock::new();
        self.index = OnceLock::new();
        id
    }

    pub fn get(&self, index: usize) -> Option<&Glyph<V>> {
        self.glyphs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Glyph<V>> {
        self.glyphs.iter()
    }

    pub fn as_slice(&self) -> &[Glyph<V>] {
        &self.glyphs
    }

    fn cached_bounds(&self) -> Rect {
        *self
            .bounds
            .get_or_init(|| bounds_of(self.glyphs.iter().map(Glyph::shape)))
    }
}

impl<V> FromIterator<(Rect, V)> for GlyphList<V> {
    fn from_iter<I: IntoIterator<Item = (Rect, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<V> Extend<(Rect, V)> for GlyphList<V> {
    fn extend<I: IntoIterator<Item = (Rect, V)>>(&mut self, iter: I) {
        for (shape, value) in iter {
            self.add(shape, value);
        }
    }
}

impl<V> Glyphset<V> for GlyphList<V>
where
    V: Clone + Send + Sync,
{
    type Cursor<'a>
        = ListCursor<'a, V>
    where
        Self: 'a;

    fn len(&self) -> u64 {
        self.glyphs.len() as u64
    }

    fn bounds(&self) -> Result<Rect> {
        Ok(self.cached_bounds())
    }

    fn intersects(&self, query: &Rect) -> Result<Vec<Glyph<V>>> {
        if self.glyphs.len() < INDEX_THRESHOLD {
            return Ok(self
                .glyphs
                .iter()
                .filter(|g| g.shape().intersects(query))
                .cloned()
                .collect());
        }

        let index = self.index.get_or_init(|| {
            BucketIndex::build(self.cached_bounds(), self.glyphs.iter().map(Glyph::shape))
        });

        Ok(index
            .candidates(query)
            .into_iter()
            .map(|i| &self.glyphs[i])
            .filter(|g| g.shape().intersects(query))
            .cloned()
            .collect())
    }

    fn cursor(&self) -> Self::Cursor<'_> {
        ListCursor {
            glyphs: &self.glyphs,
        }
    }
}

/// Random access into a [`GlyphList`].
#[derive(Debug, Clone, Copy)]
pub struct ListCursor<'a, V> {
    glyphs: &'a [Glyph<V>],
}

impl<V: Clone> GlyphCursor<V> for ListCursor<'_, V> {
    fn get(&mut self, index: u64) -> Result<Glyph<V>> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.glyphs.get(i))
            .cloned()
            .ok_or_else(|| GlyphsetError::out_of_range(index, self.glyphs.len() as u64))
    }
}
