//! Transfers over numeric grids.

use crate::error::Result;
use crate::transfer::{ApplyMode, CellTransfer, ItemWise, Specialized, Transfer};
use ar_common::{Aggregates, Aggregator, Color};
use num_traits::{Num, ToPrimitive};
use std::marker::PhantomData;

/// Divides every cell by a constant.
#[derive(Debug, Clone, Copy)]
pub struct Divide<T> {
    denominator: T,
}

impl<T> Divide<T> {
    pub fn new(denominator: T) -> Self {
        Self { denominator }
    }
}

impl<T> CellTransfer for Divide<T>
where
    T: Num + Copy + Send + Sync,
{
    type In = T;
    type Out = T;

    fn empty(&self) -> T {
        T::zero()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<T>) -> T {
        *aggregates.get(x, y) / self.denominator
    }
}

/// Colour ramp between `low` and `high`, scaled to the smallest and largest
/// populated cells of the grid it is specialized against.
///
/// Cells equal to the grid's default are treated as empty.
#[derive(Debug)]
pub struct Interpolate<IN> {
    low: Color,
    high: Color,
    empty: Color,
    logarithmic: bool,
    _in: PhantomData<fn(&IN)>,
}

impl<IN> Clone for Interpolate<IN> {
    fn clone(&self) -> Self {
        Self {
            low: self.low,
            high: self.high,
            empty: self.empty,
            logarithmic: self.logarithmic,
            _in: PhantomData,
        }
    }
}

impl<IN> Interpolate<IN> {
    pub fn new(low: Color, high: Color) -> Self {
        Self {
            low,
            high,
            empty: Color::transparent(),
            logarithmic: false,
            _in: PhantomData,
        }
    }

    pub fn with_empty(mut self, empty: Color) -> Self {
        self.empty = empty;
        self
    }

    /// Interpolate on `ln(1 + v - min)` instead of `v`.
    pub fn logarithmic(mut self, logarithmic: bool) -> Self {
        self.logarithmic = logarithmic;
        self
    }
}

impl<IN> Transfer for Interpolate<IN>
where
    IN: ToPrimitive + PartialEq + Clone + Send + Sync,
{
    type In = IN;
    type Out = Color;
    type Specialized = SpecializedInterpolate<IN>;

    fn empty_value(&self) -> Color {
        self.empty
    }

    fn specialize(&self, aggregates: &Aggregates<IN>) -> Result<SpecializedInterpolate<IN>> {
        let default = aggregates.default_value();
        let (min, max) = aggregates
            .values()
            .iter()
            .filter(|v| *v != default)
            .filter_map(|v| v.to_f64())
            .fold(None, |range: Option<(f64, f64)>, v| match range {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .unwrap_or((0.0, 0.0));

        Ok(SpecializedInterpolate {
            params: self.clone(),
            min,
            max,
        })
    }
}

/// [`Interpolate`] bound to a grid's value range.
#[derive(Debug, Clone)]
pub struct SpecializedInterpolate<IN> {
    params: Interpolate<IN>,
    min: f64,
    max: f64,
}

impl<IN> SpecializedInterpolate<IN> {
    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    fn fraction(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 1.0;
        }
        let offset = v - self.min;
        if self.params.logarithmic {
            offset.max(0.0).ln_1p() / span.ln_1p()
        } else {
            offset / span
        }
    }
}

impl<IN> Specialized for SpecializedInterpolate<IN>
where
    IN: ToPrimitive + PartialEq + Clone + Send + Sync,
{
    type In = IN;
    type Out = Color;

    fn empty_value(&self) -> Color {
        self.params.empty
    }

    fn mode(&self) -> ApplyMode<'_, IN, Color> {
        ApplyMode::ItemWise(self)
    }
}

impl<IN> ItemWise<IN, Color> for SpecializedInterpolate<IN>
where
    IN: ToPrimitive + PartialEq + Clone + Send + Sync,
{
    fn at(&self, x: i32, y: i32, aggregates: &Aggregates<IN>) -> Color {
        let value = aggregates.get(x, y);
        if value == aggregates.default_value() {
            return self.params.empty;
        }
        match value.to_f64() {
            Some(v) => self.params.low.lerp(&self.params.high, self.fraction(v)),
            None => self.params.empty,
        }
    }
}

/// Spreads each non-empty cell over a circle whose radius is the cell's own
/// value, truncated toward zero. Overlaps merge with the combiner's rollup.
#[derive(Debug, Clone)]
pub struct ValueSpread<V, R> {
    combiner: R,
    _value: PhantomData<fn(&V)>,
}

impl<V, R> ValueSpread<V, R>
where
    R: Aggregator<V, V>,
{
    pub fn new(combiner: R) -> Self {
        Self {
            combiner,
            _value: PhantomData,
        }
    }
}

impl<V, R> Transfer for ValueSpread<V, R>
where
    V: ToPrimitive + PartialEq + Clone + Send + Sync,
    R: Aggregator<V, V> + Clone,
{
    type In = V;
    type Out = V;
    type Specialized = SpecializedValueSpread<V, R>;

    fn empty_value(&self) -> V {
        self.combiner.identity()
    }

    fn specialize(&self, aggregates: &Aggregates<V>) -> Result<SpecializedValueSpread<V, R>> {
        // No circle needs to reach further than the grid's longer side.
        let extent = aggregates.width().max(aggregates.height()) as i64;
        let identity = self.combiner.identity();
        let max_radius = aggregates
            .values()
            .iter()
            .filter(|v| **v != identity)
            .map(|v| value_radius(v, extent))
            .max()
            .unwrap_or(0);

        let mut offsets = Vec::new();
        for dy in -max_radius..=max_radius {
            for dx in -max_radius..=max_radius {
                if dx * dx + dy * dy < max_radius * max_radius {
                    offsets.push((dx, dy));
                }
            }
        }

        Ok(SpecializedValueSpread {
            combiner: self.combiner.clone(),
            extent,
            max_radius,
            offsets,
            _value: PhantomData,
        })
    }
}

fn value_radius<V: ToPrimitive>(value: &V, extent: i64) -> i64 {
    value.to_f64().map_or(0, |r| r as i64).clamp(0, extent)
}

/// [`ValueSpread`] bound to the largest radius present in a grid.
#[derive(Debug, Clone)]
pub struct SpecializedValueSpread<V, R> {
    combiner: R,
    extent: i64,
    max_radius: i64,
    offsets: Vec<(i64, i64)>,
    _value: PhantomData<fn(&V)>,
}

impl<V, R> SpecializedValueSpread<V, R> {
    pub fn max_radius(&self) -> i64 {
        self.max_radius
    }
}

impl<V, R> Specialized for SpecializedValueSpread<V, R>
where
    V: ToPrimitive + PartialEq + Clone + Send + Sync,
    R: Aggregator<V, V>,
{
    type In = V;
    type Out = V;

    fn empty_value(&self) -> V {
        self.combiner.identity()
    }

    fn mode(&self) -> ApplyMode<'_, V, V> {
        ApplyMode::ItemWise(self)
    }
}

impl<V, R> ItemWise<V, V> for SpecializedValueSpread<V, R>
where
    V: ToPrimitive + PartialEq + Clone + Send + Sync,
    R: Aggregator<V, V>,
{
    fn at(&self, x: i32, y: i32, aggregates: &Aggregates<V>) -> V {
        let identity = self.combiner.identity();
        let mut acc = identity.clone();
        for (dx, dy) in &self.offsets {
            let (sx, sy) = (i64::from(x) - dx, i64::from(y) - dy);
            let (Ok(sx), Ok(sy)) = (i32::try_from(sx), i32::try_from(sy)) else {
                continue;
            };
            if !aggregates.contains(sx, sy) {
                continue;
            }
            let source = aggregates.get(sx, sy);
            if *source == identity {
                continue;
            }
            let r = value_radius(source, self.extent);
            if dx * dx + dy * dy < r * r {
                acc = self.combiner.rollup(source, &acc);
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Sum;

    fn counts() -> Aggregates<u64> {
        let mut g = Aggregates::with_size(4, 1, 0u64);
        g.set(1, 0, 2);
        g.set(2, 0, 6);
        g.set(3, 0, 10);
        g
    }

    #[test]
    fn test_divide() {
        let g = counts();
        assert_eq!(Divide::new(2u64).cell(2, 0, &g), 3);
    }

    #[test]
    fn test_interpolate_range_ignores_default() {
        let t = Interpolate::new(Color::BLACK, Color::WHITE);
        let s = t.specialize(&counts()).unwrap();
        assert_eq!(s.min(), 2.0);
        assert_eq!(s.max(), 10.0);

        let g = counts();
        assert_eq!(s.at(0, 0, &g), Color::transparent());
        assert_eq!(s.at(1, 0, &g), Color::BLACK);
        assert_eq!(s.at(3, 0, &g), Color::WHITE);
        assert_eq!(s.at(2, 0, &g), Color::new(128, 128, 128, 255));
    }

    #[test]
    fn test_interpolate_log_is_monotone() {
        let g = counts();
        let s = Interpolate::new(Color::BLACK, Color::WHITE)
            .logarithmic(true)
            .specialize(&g)
            .unwrap();
        let mid = s.at(2, 0, &g);
        assert!(mid.r > 128 && mid.r < 255);
        assert_eq!(s.at(3, 0, &g), Color::WHITE);
    }

    #[test]
    fn test_interpolate_single_value() {
        let mut g = Aggregates::with_size(2, 1, 0u64);
        g.set(0, 0, 5);
        let s = Interpolate::new(Color::BLACK, Color::RED).specialize(&g).unwrap();
        assert_eq!(s.at(0, 0, &g), Color::RED);
    }

    #[test]
    fn test_value_spread_radius_from_value() {
        let mut g = Aggregates::with_size(5, 5, 0u64);
        g.set(2, 2, 2);
        let s = ValueSpread::new(Sum).specialize(&g).unwrap();
        assert_eq!(s.max_radius(), 2);

        // Radius 2 reaches the 3x3 block around the source, not the corners of 5x5.
        assert_eq!(s.at(2, 2, &g), 2);
        assert_eq!(s.at(1, 1, &g), 2);
        assert_eq!(s.at(3, 2, &g), 2);
        assert_eq!(s.at(0, 2, &g), 0);
        assert_eq!(s.at(0, 0, &g), 0);
    }

    #[test]
    fn test_value_spread_radius_one_stays_put() {
        let mut g = Aggregates::with_size(3, 1, 0u64).copy_with_default(7);
        g.set(0, 0, 1);
        g.set(2, 0, 1);
        let s = ValueSpread::new(Sum).specialize(&g).unwrap();
        assert_eq!(s.at(0, 0, &g), 1);
        assert_eq!(s.at(1, 0, &g), 0);
        assert_eq!(s.at(2, 0, &g), 1);
    }

    #[test]
    fn test_value_spread_huge_value_is_bounded_by_grid() {
        let mut g = Aggregates::with_size(3, 2, 0u64);
        g.set(0, 0, u64::MAX);
        let s = ValueSpread::new(Sum).specialize(&g).unwrap();
        assert_eq!(s.max_radius(), 3);
        assert!((0..2).all(|y| (0..3).all(|x| s.at(x, y, &g) == u64::MAX)));
    }
}
