//! Per-category counting and the colourings built on it.

use crate::error::Result;
use crate::transfer::{ApplyMode, CellTransfer, ItemWise, Specialized, Transfer};
use ar_common::{Aggregates, Aggregator, Color, Glyph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Number of glyphs seen per category, ordered by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalCounts<C: Ord> {
    counts: BTreeMap<C, u64>,
}

impl<C: Ord> Default for CategoricalCounts<C> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<C: Ord + Clone> CategoricalCounts<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, category: C, by: u64) {
        *self.counts.entry(category).or_insert(0) += by;
    }

    /// A copy with `category` counted once more.
    pub fn with(&self, category: C) -> Self {
        let mut out = self.clone();
        out.increment(category, 1);
        out
    }

    /// Sum both sides category by category.
    pub fn merge(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (category, n) in &other.counts {
            out.increment(category.clone(), *n);
        }
        out
    }

    pub fn count(&self, category: &C) -> u64 {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&C, u64)> + '_ {
        self.counts.iter().map(|(c, n)| (c, *n))
    }
}

impl<C: Ord + Clone> FromIterator<C> for CategoricalCounts<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let mut out = Self::new();
        for category in iter {
            out.increment(category, 1);
        }
        out
    }
}

/// Counts glyphs per category, using the glyph value as the category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountCategories;

impl<C> Aggregator<C, CategoricalCounts<C>> for CountCategories
where
    C: Ord + Clone + Send + Sync,
{
    fn identity(&self) -> CategoricalCounts<C> {
        CategoricalCounts::new()
    }

    fn combine(&self, current: &CategoricalCounts<C>, glyph: &Glyph<C>) -> CategoricalCounts<C> {
        current.with(glyph.value().clone())
    }

    fn rollup(&self, left: &CategoricalCounts<C>, right: &CategoricalCounts<C>) -> CategoricalCounts<C> {
        left.merge(right)
    }
}

/// Total count per cell, ignoring categories.
#[derive(Debug)]
pub struct ToCounts<C> {
    _category: PhantomData<fn(&C)>,
}

impl<C> ToCounts<C> {
    pub fn new() -> Self {
        Self {
            _category: PhantomData,
        }
    }
}

impl<C> Default for ToCounts<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for ToCounts<C> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<C> CellTransfer for ToCounts<C>
where
    C: Ord + Clone + Send + Sync,
{
    type In = CategoricalCounts<C>;
    type Out = u64;

    fn empty(&self) -> u64 {
        0
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<CategoricalCounts<C>>) -> u64 {
        aggregates.get(x, y).total()
    }
}

/// Colours a cell `above` when `category` makes up at least `cutoff` of its
/// glyphs, `below` when it does not, and `background` when the cell is empty.
#[derive(Debug, Clone)]
pub struct MinPercent<C> {
    cutoff: f64,
    category: C,
    above: Color,
    below: Color,
    background: Color,
}

impl<C> MinPercent<C> {
    pub fn new(cutoff: f64, category: C) -> Self {
        Self {
            cutoff,
            category,
            above: Color::new(228, 26, 28, 255),
            below: Color::new(55, 126, 184, 255),
            background: Color::new(255, 255, 255, 0),
        }
    }

    pub fn with_colors(mut self, above: Color, below: Color, background: Color) -> Self {
        self.above = above;
        self.below = below;
        self.background = background;
        self
    }
}

impl<C> CellTransfer for MinPercent<C>
where
    C: Ord + Clone + Send + Sync,
{
    type In = CategoricalCounts<C>;
    type Out = Color;

    fn empty(&self) -> Color {
        self.background
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<CategoricalCounts<C>>) -> Color {
        let counts = aggregates.get(x, y);
        let total = counts.total();
        if total == 0 {
            return self.background;
        }

        let share = counts.count(&self.category) as f64 / total as f64;
        if share >= self.cutoff {
            self.above
        } else {
            self.below
        }
    }
}

/// Blends category colours by their share of each cell and scales alpha by
/// the cell's total relative to the busiest cell in the grid.
#[derive(Debug, Clone)]
pub struct HdAlpha<C: Ord> {
    colors: BTreeMap<C, Color>,
    background: Color,
    alpha_min: f64,
    logarithmic: bool,
}

impl<C: Ord> HdAlpha<C> {
    pub fn new(colors: BTreeMap<C, Color>) -> Self {
        Self {
            colors,
            background: Color::WHITE,
            alpha_min: 0.0,
            logarithmic: false,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Smallest alpha fraction given to a populated cell, clamped to `[0, 1]`.
    pub fn with_alpha_min(mut self, alpha_min: f64) -> Self {
        self.alpha_min = alpha_min.clamp(0.0, 1.0);
        self
    }

    pub fn logarithmic(mut self, logarithmic: bool) -> Self {
        self.logarithmic = logarithmic;
        self
    }
}

impl<C> Transfer for HdAlpha<C>
where
    C: Ord + Clone + Send + Sync,
{
    type In = CategoricalCounts<C>;
    type Out = Color;
    type Specialized = SpecializedHdAlpha<C>;

    fn empty_value(&self) -> Color {
        self.background
    }

    fn specialize(&self, aggregates: &Aggregates<CategoricalCounts<C>>) -> Result<SpecializedHdAlpha<C>> {
        let max_total = aggregates
            .values()
            .iter()
            .map(CategoricalCounts::total)
            .max()
            .unwrap_or(0);

        Ok(SpecializedHdAlpha {
            params: self.clone(),
            max_total,
        })
    }
}

/// [`HdAlpha`] bound to a grid's largest cell total.
#[derive(Debug, Clone)]
pub struct SpecializedHdAlpha<C: Ord> {
    params: HdAlpha<C>,
    max_total: u64,
}

impl<C: Ord + Clone> SpecializedHdAlpha<C> {
    pub fn max_total(&self) -> u64 {
        self.max_total
    }

    fn blend(&self, counts: &CategoricalCounts<C>, total: u64) -> Color {
        let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
        for (category, n) in counts.iter() {
            if let Some(color) = self.params.colors.get(category) {
                let w = n as f64 / total as f64;
                r += color.r as f64 * w;
                g += color.g as f64 * w;
                b += color.b as f64 * w;
            }
        }
        Color::new(r as u8, g as u8, b as u8, 255)
    }

    fn alpha(&self, total: u64) -> u8 {
        let scale = |v: u64| {
            if self.params.logarithmic {
                (v as f64).log10()
            } else {
                v as f64
            }
        };

        let max = scale(self.max_total);
        let ratio = if max > 0.0 { scale(total) / max } else { 1.0 };
        let alpha = self.params.alpha_min + (1.0 - self.params.alpha_min) * ratio;
        (alpha.clamp(0.0, 1.0) * 255.0) as u8
    }
}

impl<C> Specialized for SpecializedHdAlpha<C>
where
    C: Ord + Clone + Send + Sync,
{
    type In = CategoricalCounts<C>;
    type Out = Color;

    fn empty_value(&self) -> Color {
        self.params.background
    }

    fn mode(&self) -> ApplyMode<'_, CategoricalCounts<C>, Color> {
        ApplyMode::ItemWise(self)
    }
}

impl<C> ItemWise<CategoricalCounts<C>, Color> for SpecializedHdAlpha<C>
where
    C: Ord + Clone + Send + Sync,
{
    fn at(&self, x: i32, y: i32, aggregates: &Aggregates<CategoricalCounts<C>>) -> Color {
        let counts = aggregates.get(x, y);
        let total = counts.total();
        if total == 0 {
            return self.params.background;
        }
        self.blend(counts, total).with_alpha(self.alpha(total))
    }
}
