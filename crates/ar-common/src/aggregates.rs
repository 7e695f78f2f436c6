//! Dense 2D grids of reduced values.

use serde::{Deserialize, Serialize};

/// A dense grid covering `[low_x, high_x) x [low_y, high_y)`.
///
/// Reads outside the grid return the default value instead of failing. Values
/// are stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates<A> {
    low_x: i32,
    low_y: i32,
    high_x: i32,
    high_y: i32,
    default: A,
    values: Vec<A>,
}

impl<A: Clone> Aggregates<A> {
    /// Create a grid over the given bounds with every cell set to `default`.
    ///
    /// Inverted bounds produce an empty grid.
    pub fn new(low_x: i32, low_y: i32, high_x: i32, high_y: i32, default: A) -> Self {
        let high_x = high_x.max(low_x);
        let high_y = high_y.max(low_y);
        let len = span(low_x, high_x) * span(low_y, high_y);

        Self {
            low_x,
            low_y,
            high_x,
            high_y,
            values: vec![default.clone(); len],
            default,
        }
    }

    /// Create a `width` x `height` grid anchored at the origin.
    pub fn with_size(width: usize, height: usize, default: A) -> Self {
        Self::new(0, 0, clamp_dim(width), clamp_dim(height), default)
    }

    /// A fresh grid with the same bounds, every cell set to `default`.
    pub fn fresh<B: Clone>(&self, default: B) -> Aggregates<B> {
        Aggregates::new(self.low_x, self.low_y, self.high_x, self.high_y, default)
    }

    /// A copy of this grid whose out-of-bounds value is `default`.
    pub fn copy_with_default(&self, default: A) -> Self {
        Self {
            low_x: self.low_x,
            low_y: self.low_y,
            high_x: self.high_x,
            high_y: self.high_y,
            default,
            values: self.values.clone(),
        }
    }

    /// Copy every cell of `tile` that lies inside this grid.
    pub fn insert(&mut self, tile: &Aggregates<A>) {
        self.merge_with(tile, |_, incoming| incoming.clone());
    }
}

impl<A> Aggregates<A> {
    /// Value at `(x, y)`, or the default when outside the grid.
    pub fn get(&self, x: i32, y: i32) -> &A {
        match self.index(x, y) {
            Some(idx) => &self.values[idx],
            None => &self.default,
        }
    }

    /// Store a value. Returns `false` and drops the value when `(x, y)` is
    /// outside the grid.
    pub fn set(&mut self, x: i32, y: i32, value: A) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Replace the cell at `(x, y)` with `f(current)`.
    pub fn update<F>(&mut self, x: i32, y: i32, f: F) -> bool
    where
        F: FnOnce(&A) -> A,
    {
        match self.index(x, y) {
            Some(idx) => {
                self.values[idx] = f(&self.values[idx]);
                true
            }
            None => false,
        }
    }

    /// Combine every cell of `other` that lies inside this grid into the
    /// matching cell here with `f(current, incoming)`.
    pub fn merge_with<F>(&mut self, other: &Aggregates<A>, f: F)
    where
        F: Fn(&A, &A) -> A,
    {
        let x0 = self.low_x.max(other.low_x);
        let x1 = self.high_x.min(other.high_x);
        let y0 = self.low_y.max(other.low_y);
        let y1 = self.high_y.min(other.high_y);

        for y in y0..y1 {
            for x in x0..x1 {
                if let (Some(dst), Some(src)) = (self.index(x, y), other.index(x, y)) {
                    self.values[dst] = f(&self.values[dst], &other.values[src]);
                }
            }
        }
    }

    pub fn default_value(&self) -> &A {
        &self.default
    }

    pub fn low_x(&self) -> i32 {
        self.low_x
    }

    pub fn low_y(&self) -> i32 {
        self.low_y
    }

    pub fn high_x(&self) -> i32 {
        self.high_x
    }

    pub fn high_y(&self) -> i32 {
        self.high_y
    }

    pub fn width(&self) -> usize {
        span(self.low_x, self.high_x)
    }

    pub fn height(&self) -> usize {
        span(self.low_y, self.high_y)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.low_x && x < self.high_x && y >= self.low_y && y < self.high_y
    }

    /// Cell values in row-major order.
    pub fn values(&self) -> &[A] {
        &self.values
    }

    /// Iterate `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &A)> + '_ {
        let width = self.width().max(1);
        self.values.iter().enumerate().map(move |(i, v)| {
            let x = self.low_x + (i % width) as i32;
            let y = self.low_y + (i / width) as i32;
            (x, y, v)
        })
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let col = span(self.low_x, x);
        let row = span(self.low_y, y);
        Some(row * self.width() + col)
    }
}

fn span(low: i32, high: i32) -> usize {
    (i64::from(high) - i64::from(low)).max(0) as usize
}

fn clamp_dim(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_reads_default() {
        let mut grid = Aggregates::new(-2, -1, 2, 1, 0u32);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 2);

        assert!(grid.set(-2, -1, 7));
        assert_eq!(*grid.get(-2, -1), 7);
        assert_eq!(*grid.get(5, 5), 0);
        assert!(!grid.set(2, 0, 9));
    }

    #[test]
    fn test_inverted_bounds_are_empty() {
        let grid = Aggregates::new(3, 3, 1, 1, 1u8);
        assert!(grid.is_empty());
        assert_eq!(*grid.get(2, 2), 1);
    }

    #[test]
    fn test_fresh_and_copy_with_default() {
        let mut grid = Aggregates::with_size(2, 2, 1i32);
        grid.set(1, 1, 5);

        let fresh = grid.fresh("empty");
        assert_eq!(fresh.len(), 4);
        assert_eq!(*fresh.get(1, 1), "empty");

        let copy = grid.copy_with_default(-1);
        assert_eq!(*copy.get(1, 1), 5);
        assert_eq!(*copy.get(10, 10), -1);
    }

    #[test]
    fn test_insert_tile() {
        let mut grid = Aggregates::with_size(4, 4, 0u8);
        let mut tile = Aggregates::new(2, 2, 6, 3, 0u8);
        for x in 2..6 {
            tile.set(x, 2, x as u8);
        }

        grid.insert(&tile);
        assert_eq!(*grid.get(2, 2), 2);
        assert_eq!(*grid.get(3, 2), 3);
        assert_eq!(*grid.get(1, 2), 0);
        assert_eq!(grid.values().iter().map(|v| *v as u32).sum::<u32>(), 5);
    }

    #[test]
    fn test_iter_row_major() {
        let grid = Aggregates::new(1, 1, 3, 2, 0u8);
        let coords: Vec<_> = grid.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(1, 1), (2, 1)]);
    }

    #[test]
    fn test_accessors_need_no_clone() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Cell(u8);

        let json = r#"{"low_x":0,"low_y":0,"high_x":2,"high_y":1,"default":0,"values":[1,2]}"#;
        let mut grid: Aggregates<Cell> = serde_json::from_str(json).unwrap();

        assert_eq!(grid.get(1, 0), &Cell(2));
        assert_eq!(grid.get(5, 0), grid.default_value());
        assert!(grid.set(0, 0, Cell(9)));
        assert!(grid.update(1, 0, |c| Cell(c.0 + 1)));
        assert_eq!(grid.values(), &[Cell(9), Cell(3)]);
    }
}
