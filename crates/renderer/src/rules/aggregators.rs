//! Basic aggregators.

use ar_common::{Aggregator, Glyph, GlyphId};
use num_traits::{Bounded, Zero};

/// Number of glyphs covering each cell. Ignores glyph values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count;

impl<V> Aggregator<V, u64> for Count {
    fn identity(&self) -> u64 {
        0
    }

    fn combine(&self, current: &u64, _glyph: &Glyph<V>) -> u64 {
        current + 1
    }

    fn rollup(&self, left: &u64, right: &u64) -> u64 {
        left + right
    }
}

/// Sum of glyph values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sum;

impl<T> Aggregator<T, T> for Sum
where
    T: Zero + Copy + Send + Sync,
{
    fn identity(&self) -> T {
        T::zero()
    }

    fn combine(&self, current: &T, glyph: &Glyph<T>) -> T {
        *current + *glyph.value()
    }

    fn rollup(&self, left: &T, right: &T) -> T {
        *left + *right
    }
}

/// Smallest glyph value. Empty cells hold the type's maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Min;

impl<T> Aggregator<T, T> for Min
where
    T: Bounded + PartialOrd + Copy + Send + Sync,
{
    fn identity(&self) -> T {
        T::max_value()
    }

    fn combine(&self, current: &T, glyph: &Glyph<T>) -> T {
        self.rollup(current, glyph.value())
    }

    fn rollup(&self, left: &T, right: &T) -> T {
        if right < left {
            *right
        } else {
            *left
        }
    }
}

/// Largest glyph value. Empty cells hold the type's minimum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Max;

impl<T> Aggregator<T, T> for Max
where
    T: Bounded + PartialOrd + Copy + Send + Sync,
{
    fn identity(&self) -> T {
        T::min_value()
    }

    fn combine(&self, current: &T, glyph: &Glyph<T>) -> T {
        self.rollup(current, glyph.value())
    }

    fn rollup(&self, left: &T, right: &T) -> T {
        if right > left {
            *right
        } else {
            *left
        }
    }
}

/// Value of the covering glyph with the highest id, tagged with that id.
///
/// Ids order glyphs totally, so the result does not depend on the order in
/// which glyphs reach the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Last;

impl<V> Aggregator<V, Option<(GlyphId, V)>> for Last
where
    V: Clone + Send + Sync,
{
    fn identity(&self) -> Option<(GlyphId, V)> {
        None
    }

    fn combine(&self, current: &Option<(GlyphId, V)>, glyph: &Glyph<V>) -> Option<(GlyphId, V)> {
        let incoming = Some((glyph.id(), glyph.value().clone()));
        self.rollup(current, &incoming)
    }

    fn rollup(
        &self,
        left: &Option<(GlyphId, V)>,
        right: &Option<(GlyphId, V)>,
    ) -> Option<(GlyphId, V)> {
        match (left, right) {
            (Some((l, _)), Some((r, _))) if l > r => left.clone(),
            (_, Some(_)) => right.clone(),
            _ => left.clone(),
        }
    }
}
