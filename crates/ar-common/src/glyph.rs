//! The atomic visual item: geometry plus a value.

use crate::Rect;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Creation-order identity of a glyph within its owning glyphset.
///
/// List glyphsets hand out insertion indices; file-backed glyphsets use the
/// record index. Ids are only comparable between glyphs of the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlyphId(pub u64);

impl std::fmt::Display for GlyphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A shape with an attached value.
///
/// Equality and hashing use the id only: two glyphs with the same shape and
/// value are still distinct unless they came from the same record.
#[derive(Debug, Clone)]
pub struct Glyph<V> {
    id: GlyphId,
    shape: Rect,
    value: V,
}

impl<V> Glyph<V> {
    pub fn new(id: GlyphId, shape: Rect, value: V) -> Self {
        Self { id, shape, value }
    }

    pub fn id(&self) -> GlyphId {
        self.id
    }

    pub fn shape(&self) -> &Rect {
        &self.shape
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> PartialEq for Glyph<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for Glyph<V> {}

impl<V> Hash for Glyph<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
