//! Synthetic glyph sets.
//!
//! Random generators take an explicit seed so failures reproduce.

use ar_common::Rect;
use glyphset::GlyphList;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates one point glyph at every integer coordinate of a `width` x
/// `height` lattice, valued by its row-major index.
///
/// # Example
///
/// ```
/// use test_utils::point_lattice;
///
/// let glyphs = point_lattice(4, 3);
/// assert_eq!(glyphs.as_slice().len(), 12);
/// assert_eq!(*glyphs.get(5).unwrap().value(), 5.0);
/// ```
pub fn point_lattice(width: usize, height: usize) -> GlyphList<f64> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| (Rect::point(x as f64, y as f64), (y * width + x) as f64))
        .collect()
}

/// Creates `count` point glyphs uniformly distributed inside `bounds`, each
/// valued with a random integer in `[0, 100)`.
pub fn random_points(count: usize, bounds: &Rect, seed: u64) -> GlyphList<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(bounds.min_x..bounds.max_x);
            let y = rng.gen_range(bounds.min_y..bounds.max_y);
            (Rect::point(x, y), rng.gen_range(0..100) as f64)
        })
        .collect()
}

/// Creates `count` rectangles of random position and size inside `bounds`,
/// with sides up to `max_side`.
pub fn random_rects(count: usize, bounds: &Rect, max_side: f64, seed: u64) -> GlyphList<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(bounds.min_x..bounds.max_x);
            let y = rng.gen_range(bounds.min_y..bounds.max_y);
            let w = rng.gen_range(0.0..max_side);
            let h = rng.gen_range(0.0..max_side);
            (Rect::new(x, y, x + w, y + h), rng.gen_range(0..10) as f64)
        })
        .collect()
}

/// Creates pathologically wide glyphs: every glyph spans at least half of
/// `bounds` along one axis, so each one straddles many render tiles.
pub fn wide_glyphs(count: usize, bounds: &Rect, seed: u64) -> GlyphList<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let (w, h) = (bounds.width(), bounds.height());
            let rect = if i % 2 == 0 {
                let y = rng.gen_range(bounds.min_y..bounds.max_y);
                let x0 = bounds.min_x + rng.gen_range(0.0..w * 0.5);
                Rect::new(x0, y, x0 + w * rng.gen_range(0.5..1.5), y + rng.gen_range(0.0..2.0))
            } else {
                let x = rng.gen_range(bounds.min_x..bounds.max_x);
                let y0 = bounds.min_y + rng.gen_range(0.0..h * 0.5);
                Rect::new(x, y0, x + rng.gen_range(0.0..2.0), y0 + h * rng.gen_range(0.5..1.5))
            };
            (rect, i as f64)
        })
        .collect()
}

/// Creates `count` point glyphs whose value is one of `categories`
/// categories, as small integers.
pub fn categorical_points(count: usize, categories: u32, bounds: &Rect, seed: u64) -> GlyphList<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(bounds.min_x..bounds.max_x);
            let y = rng.gen_range(bounds.min_y..bounds.max_y);
            (Rect::point(x, y), rng.gen_range(0..categories.max(1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphset::Glyphset;

    #[test]
    fn test_lattice_size_and_bounds() {
        let glyphs = point_lattice(5, 2);
        assert_eq!(glyphs.len(), 10);
        assert_eq!(glyphs.bounds().unwrap(), Rect::new(0.0, 0.0, 4.0, 1.0));
    }

    #[test]
    fn test_random_points_are_seeded() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let a = random_points(50, &bounds, 7);
        let b = random_points(50, &bounds, 7);
        let shapes = |g: &GlyphList<f64>| g.iter().map(|g| *g.shape()).collect::<Vec<_>>();
        assert_eq!(shapes(&a), shapes(&b));
    }

    #[test]
    fn test_wide_glyphs_are_wide() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        for g in wide_glyphs(20, &bounds, 1).iter() {
            assert!(g.shape().width() >= 50.0 || g.shape().height() >= 50.0);
        }
    }
}
