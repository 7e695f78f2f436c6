//! Type-agnostic aggregators and transfers.

use crate::error::Result;
use crate::transfer::{ApplyMode, Bulk, CellTransfer, Executor, Specialized, Transfer};
use ar_common::{Aggregates, Aggregator, Glyph};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::hash::Hash;
use std::io::Read;
use std::marker::PhantomData;

/// The same value everywhere, as an aggregator or a transfer.
#[derive(Debug)]
pub struct Const<IN, OUT> {
    value: OUT,
    _in: PhantomData<fn(&IN)>,
}

impl<IN, OUT> Const<IN, OUT> {
    pub fn new(value: OUT) -> Self {
        Self {
            value,
            _in: PhantomData,
        }
    }
}

impl<IN, OUT: Clone> Clone for Const<IN, OUT> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<IN, OUT> Aggregator<IN, OUT> for Const<IN, OUT>
where
    OUT: Clone + Send + Sync,
{
    fn identity(&self) -> OUT {
        self.value.clone()
    }

    fn combine(&self, _current: &OUT, _glyph: &Glyph<IN>) -> OUT {
        self.value.clone()
    }

    fn rollup(&self, _left: &OUT, _right: &OUT) -> OUT {
        self.value.clone()
    }
}

impl<IN, OUT> CellTransfer for Const<IN, OUT>
where
    OUT: Clone + Send + Sync,
{
    type In = IN;
    type Out = OUT;

    fn empty(&self) -> OUT {
        self.value.clone()
    }

    fn cell(&self, _x: i32, _y: i32, _aggregates: &Aggregates<IN>) -> OUT {
        self.value.clone()
    }
}

/// Copies the grid unchanged, with a new out-of-bounds value.
#[derive(Debug, Clone)]
pub struct Echo<T> {
    empty: T,
}

impl<T> Echo<T> {
    pub fn new(empty: T) -> Self {
        Self { empty }
    }
}

impl<T: Clone + Send + Sync> Transfer for Echo<T> {
    type In = T;
    type Out = T;
    type Specialized = Echo<T>;

    fn empty_value(&self) -> T {
        self.empty.clone()
    }

    fn specialize(&self, _aggregates: &Aggregates<T>) -> Result<Echo<T>> {
        Ok(self.clone())
    }
}

impl<T: Clone + Send + Sync> Specialized for Echo<T> {
    type In = T;
    type Out = T;

    fn empty_value(&self) -> T {
        self.empty.clone()
    }

    fn mode(&self) -> ApplyMode<'_, T, T> {
        ApplyMode::Bulk(self)
    }
}

impl<T: Clone + Send + Sync> Bulk<T, T> for Echo<T> {
    fn process(&self, aggregates: &Aggregates<T>, _executor: &Executor<'_>) -> Result<Aggregates<T>> {
        Ok(aggregates.copy_with_default(self.empty.clone()))
    }
}

/// `present` where a cell differs from the grid's default, `absent` elsewhere.
#[derive(Debug)]
pub struct Present<IN, OUT> {
    present: OUT,
    absent: OUT,
    _in: PhantomData<fn(&IN)>,
}

impl<IN, OUT> Present<IN, OUT> {
    pub fn new(present: OUT, absent: OUT) -> Self {
        Self {
            present,
            absent,
            _in: PhantomData,
        }
    }
}

impl<IN, OUT: Clone> Clone for Present<IN, OUT> {
    fn clone(&self) -> Self {
        Self::new(self.present.clone(), self.absent.clone())
    }
}

impl<IN, OUT> CellTransfer for Present<IN, OUT>
where
    IN: PartialEq,
    OUT: Clone + Send + Sync,
{
    type In = IN;
    type Out = OUT;

    fn empty(&self) -> OUT {
        self.absent.clone()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<IN>) -> OUT {
        if aggregates.get(x, y) != aggregates.default_value() {
            self.present.clone()
        } else {
            self.absent.clone()
        }
    }
}

/// Lookup table. Values without an entry map to `other`.
#[derive(Debug, Clone)]
pub struct MapWrapper<IN, OUT> {
    mappings: HashMap<IN, OUT>,
    other: OUT,
}

impl<IN, OUT> MapWrapper<IN, OUT>
where
    IN: Eq + Hash,
{
    pub fn new(mappings: HashMap<IN, OUT>, other: OUT) -> Self {
        Self { mappings, other }
    }

    /// A table with a single entry.
    pub fn single(key: IN, value: OUT, other: OUT) -> Self {
        Self::new(HashMap::from([(key, value)]), other)
    }

    /// Load the table from a JSON object. Keys are parsed into `IN` from
    /// their string form, so integer keys work.
    pub fn from_json<R: Read>(reader: R, other: OUT) -> Result<Self>
    where
        IN: DeserializeOwned,
        OUT: DeserializeOwned,
    {
        let mappings: HashMap<IN, OUT> = serde_json::from_reader(reader)?;
        Ok(Self::new(mappings, other))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<IN, OUT> CellTransfer for MapWrapper<IN, OUT>
where
    IN: Eq + Hash + Clone + Send + Sync,
    OUT: Clone + Send + Sync,
{
    type In = IN;
    type Out = OUT;

    fn empty(&self) -> OUT {
        self.other.clone()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<IN>) -> OUT {
        self.mappings
            .get(aggregates.get(x, y))
            .unwrap_or(&self.other)
            .clone()
    }
}

/// Type-preserving partial remap: listed values are replaced, the rest pass
/// through.
#[derive(Debug, Clone)]
pub struct Replace<T> {
    mapping: HashMap<T, T>,
    empty: T,
}

impl<T: Eq + Hash> Replace<T> {
    pub fn new(mapping: HashMap<T, T>, empty: T) -> Self {
        Self { mapping, empty }
    }

    pub fn single(from: T, to: T, empty: T) -> Self {
        Self::new(HashMap::from([(from, to)]), empty)
    }
}

impl<T> CellTransfer for Replace<T>
where
    T: Eq + Hash + Clone + Send + Sync,
{
    type In = T;
    type Out = T;

    fn empty(&self) -> T {
        self.empty.clone()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<T>) -> T {
        let value = aggregates.get(x, y);
        self.mapping.get(value).unwrap_or(value).clone()
    }
}

/// Blanks cells whose eight neighbours all hold the cell's own value,
/// leaving only the edges of uniform regions.
#[derive(Debug, Clone)]
pub struct Simplify<T> {
    empty: T,
}

impl<T> Simplify<T> {
    pub fn new(empty: T) -> Self {
        Self { empty }
    }
}

impl<T> CellTransfer for Simplify<T>
where
    T: PartialEq + Clone + Send + Sync,
{
    type In = T;
    type Out = T;

    fn empty(&self) -> T {
        self.empty.clone()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<T>) -> T {
        let value = aggregates.get(x, y);
        let uniform = NEIGHBOURS
            .iter()
            .all(|(dx, dy)| aggregates.get(x + dx, y + dy) == value);

        if uniform {
            self.empty.clone()
        } else {
            value.clone()
        }
    }
}

const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Fills empty cells with the value of the nearest non-empty cell.
///
/// Searches outward in square rings; within a ring, cells are visited row by
/// row, so ties resolve toward the top-left.
#[derive(Debug, Clone)]
pub struct Smear<T> {
    empty: T,
}

impl<T> Smear<T> {
    pub fn new(empty: T) -> Self {
        Self { empty }
    }
}

impl<T> CellTransfer for Smear<T>
where
    T: PartialEq + Clone + Send + Sync,
{
    type In = T;
    type Out = T;

    fn empty(&self) -> T {
        self.empty.clone()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<T>) -> T {
        let value = aggregates.get(x, y);
        if *value != self.empty {
            return value.clone();
        }

        let reach = aggregates.width().max(aggregates.height()) as i32;
        for r in 1..=reach {
            for dy in -r..=r {
                let step = if dy == -r || dy == r { 1 } else { 2 * r };
                let mut dx = -r;
                while dx <= r {
                    let (nx, ny) = (x + dx, y + dy);
                    if aggregates.contains(nx, ny) {
                        let found = aggregates.get(nx, ny);
                        if *found != self.empty {
                            return found.clone();
                        }
                    }
                    dx += step;
                }
            }
        }

        self.empty.clone()
    }
}

/// Neighbourhood shape used by [`Spread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spreader {
    /// `2 * size + 1` cells on a side, centered on the source.
    Square(u32),
    /// Cells strictly inside a circle of the given radius. A radius of 0
    /// spreads nothing.
    Circle(u32),
}

impl Spreader {
    /// Offsets from a source cell to every cell it reaches.
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        let (r, circle) = match *self {
            Spreader::Square(size) => (size as i32, false),
            Spreader::Circle(radius) => (radius as i32, true),
        };

        let mut out = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if circle && dx * dx + dy * dy >= r * r {
                    continue;
                }
                out.push((dx, dy));
            }
        }
        out
    }
}

/// Spreads every non-empty cell over a neighbourhood, merging overlaps with
/// the combiner's rollup.
///
/// Evaluated as a gather: each output cell rolls up the in-grid sources that
/// reach it. The grid's out-of-bounds default never spreads inward.
#[derive(Debug, Clone)]
pub struct Spread<V, R> {
    spreader: Spreader,
    offsets: Vec<(i32, i32)>,
    combiner: R,
    _value: PhantomData<fn(&V)>,
}

impl<V, R> Spread<V, R>
where
    R: Aggregator<V, V>,
{
    pub fn new(spreader: Spreader, combiner: R) -> Self {
        Self {
            spreader,
            offsets: spreader.offsets(),
            combiner,
            _value: PhantomData,
        }
    }

    pub fn spreader(&self) -> Spreader {
        self.spreader
    }
}

impl<V, R> CellTransfer for Spread<V, R>
where
    V: PartialEq + Clone,
    R: Aggregator<V, V> + Clone,
{
    type In = V;
    type Out = V;

    fn empty(&self) -> V {
        self.combiner.identity()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<V>) -> V {
        let identity = self.combiner.identity();
        let mut acc = identity.clone();
        for (dx, dy) in &self.offsets {
            let (sx, sy) = (x - dx, y - dy);
            if !aggregates.contains(sx, sy) {
                continue;
            }
            let source = aggregates.get(sx, sy);
            if *source != identity {
                acc = self.combiner.rollup(source, &acc);
            }
        }
        acc
    }
}

/// Applies a function to every cell value.
#[derive(Clone)]
pub struct Valuer<IN, OUT, F> {
    f: F,
    empty: OUT,
    _in: PhantomData<fn(&IN)>,
}

impl<IN, OUT, F> Valuer<IN, OUT, F>
where
    F: Fn(&IN) -> OUT,
{
    pub fn new(f: F, empty: OUT) -> Self {
        Self {
            f,
            empty,
            _in: PhantomData,
        }
    }
}

impl<IN, OUT: std::fmt::Debug, F> std::fmt::Debug for Valuer<IN, OUT, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Valuer").field("empty", &self.empty).finish_non_exhaustive()
    }
}

impl<IN, OUT, F> CellTransfer for Valuer<IN, OUT, F>
where
    IN: Clone,
    OUT: Clone + Send + Sync,
    F: Fn(&IN) -> OUT + Clone + Send + Sync,
{
    type In = IN;
    type Out = OUT;

    fn empty(&self) -> OUT {
        self.empty.clone()
    }

    fn cell(&self, x: i32, y: i32, aggregates: &Aggregates<IN>) -> OUT {
        (self.f)(aggregates.get(x, y))
    }
}
