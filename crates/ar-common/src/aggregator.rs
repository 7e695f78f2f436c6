//! The reduction contract applied per cell.

use crate::Glyph;

/// Folds glyphs into cell values and merges independently built cells.
///
/// Implementations must satisfy:
///
/// - `rollup` is associative and commutative;
/// - `identity()` is neutral for `rollup`;
/// - `combine(identity(), g)` rolled up over any partition of the glyphs equals
///   combining them one after another in any order.
///
/// The parallel renderers split glyphs and pixels arbitrarily and rely on this
/// law; an aggregator that breaks it produces partition-dependent grids.
pub trait Aggregator<V, A>: Send + Sync {
    /// Neutral cell value.
    fn identity(&self) -> A;

    /// Fold one glyph into a cell.
    fn combine(&self, current: &A, glyph: &Glyph<V>) -> A;

    /// Merge two cells produced independently.
    fn rollup(&self, left: &A, right: &A) -> A;
}

impl<V, A, T> Aggregator<V, A> for &T
where
    T: Aggregator<V, A> + ?Sized,
{
    fn identity(&self) -> A {
        (**self).identity()
    }

    fn combine(&self, current: &A, glyph: &Glyph<V>) -> A {
        (**self).combine(current, glyph)
    }

    fn rollup(&self, left: &A, right: &A) -> A {
        (**self).rollup(left, right)
    }
}
