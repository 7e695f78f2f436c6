//! End-to-end aggregation tests across the three strategies.

use ar_common::{Aggregates, Aggregator, Glyph, Rect, ViewTransform};
use glyphset::{FileGlyphset, FileGlyphsetConfig, GlyphCursor, GlyphList, Glyphset, GlyphsetError};
use renderer::rules::{CountCategories, Count, Last, Sum};
use renderer::{RenderConfig, RenderError, Renderer, Strategy};
use test_utils::{
    categorical_points, four_corner_points, four_integer_corners, init_tracing, random_points,
    random_rects, temp_test_dir, wide_glyphs, write_glyph_file,
};

fn renderer(strategy: Strategy) -> Renderer {
    init_tracing();
    Renderer::new(RenderConfig::default().with_strategy(strategy).with_threads(4)).unwrap()
}

/// Aggregate with every strategy and assert they agree; returns the serial grid.
fn aggregate_all<V, A, G, R>(
    glyphs: &G,
    aggregator: &R,
    view: &ViewTransform,
    width: usize,
    height: usize,
    task_size: u64,
) -> Aggregates<A>
where
    A: Clone + Send + PartialEq + std::fmt::Debug,
    G: Glyphset<V>,
    R: Aggregator<V, A>,
{
    let serial = renderer(Strategy::Serial)
        .aggregate(glyphs, aggregator, view, width, height, task_size)
        .unwrap();

    for strategy in [Strategy::GlyphParallel, Strategy::PixelParallel] {
        let grid = renderer(strategy)
            .aggregate(glyphs, aggregator, view, width, height, task_size)
            .unwrap();
        assert_eq!(grid, serial, "{} differs from serial (task_size {})", strategy, task_size);
    }

    serial
}

// ============================================================================
// Canonical scenarios
// ============================================================================

#[test]
fn test_four_points_in_two_by_two() {
    let glyphs = four_corner_points();
    let grid = aggregate_all(&glyphs, &Count, &ViewTransform::identity(), 2, 2, 1);

    assert_eq!(grid.values(), &[1, 1, 1, 1]);

    for side in [0.0, 1.0] {
        let glyphs = four_integer_corners(side);
        let grid = aggregate_all(&glyphs, &Count, &ViewTransform::identity(), 2, 2, 1);
        assert_eq!(grid.values(), &[1, 1, 1, 1], "side {side}");
    }
}

#[test]
fn test_glyph_straddling_every_tile_counts_once_per_pixel() {
    let glyphs: GlyphList<f64> = [(Rect::new(0.5, 0.5, 3.5, 3.5), 1.0)].into_iter().collect();
    let grid = aggregate_all(&glyphs, &Count, &ViewTransform::identity(), 4, 4, 1);

    assert!(grid.values().iter().all(|v| *v == 1));
}

#[test]
fn test_glyph_edge_on_tile_boundary() {
    // Right edge exactly on pixel 2's left edge: covers pixels 0 and 1 only.
    let glyphs: GlyphList<f64> = [(Rect::new(0.0, 0.0, 2.0, 1.0), 1.0)].into_iter().collect();
    let grid = aggregate_all(&glyphs, &Count, &ViewTransform::identity(), 4, 1, 1);

    assert_eq!(grid.values(), &[1, 1, 0, 0]);
}

#[test]
fn test_empty_glyphset_every_strategy() {
    let glyphs: GlyphList<f64> = GlyphList::new();
    let grid = aggregate_all(&glyphs, &Count, &ViewTransform::identity(), 8, 3, 2);

    assert_eq!(grid.len(), 24);
    assert!(grid.values().iter().all(|v| *v == 0));
}

// ============================================================================
// Strategy equivalence
// ============================================================================

#[test]
fn test_strategies_agree_on_random_rects() {
    let bounds = Rect::new(-50.0, -20.0, 150.0, 80.0);
    let glyphs = random_rects(2000, &bounds, 12.0, 42);
    let view = ViewTransform::zoom_fit(&glyphs.bounds().unwrap(), 64, 48);

    for task_size in [1, 13, 500, 100_000] {
        aggregate_all(&glyphs, &Count, &view, 64, 48, task_size);
        aggregate_all(&glyphs, &Sum, &view, 64, 48, task_size);
        aggregate_all(&glyphs, &Last, &view, 64, 48, task_size);
    }
}

#[test]
fn test_strategies_agree_on_categories() {
    let bounds = Rect::new(0.0, 0.0, 32.0, 32.0);
    let glyphs = categorical_points(3000, 4, &bounds, 9);

    let grid = aggregate_all(&glyphs, &CountCategories, &ViewTransform::identity(), 32, 32, 37);
    let total: u64 = grid.values().iter().map(|c| c.total()).sum();
    assert_eq!(total, 3000);
}

#[test]
fn test_wide_glyphs_spanning_many_tiles() {
    let bounds = Rect::new(0.0, 0.0, 200.0, 150.0);
    let view = ViewTransform::identity();

    for seed in 0..4 {
        let glyphs = wide_glyphs(60, &bounds, seed);
        for task_size in [1, 7, 64, 1000] {
            aggregate_all(&glyphs, &Count, &view, 200, 150, task_size);
        }
    }
}

// ============================================================================
// Conservation
// ============================================================================

#[test]
fn test_count_conservation_for_points_inside_viewport() {
    let glyphs = random_points(5000, &Rect::new(0.0, 0.0, 40.0, 30.0), 3);

    for strategy in Strategy::all() {
        for task_size in [1, 50, 10_000] {
            let grid = renderer(strategy)
                .aggregate(&glyphs, &Count, &ViewTransform::identity(), 40, 30, task_size)
                .unwrap();
            assert_eq!(grid.values().iter().sum::<u64>(), 5000, "{}", strategy);
        }
    }
}

#[test]
fn test_points_outside_viewport_are_dropped() {
    let glyphs: GlyphList<f64> = [
        (Rect::point(-0.5, 0.5), 1.0),
        (Rect::point(0.5, 0.5), 1.0),
        (Rect::point(2.0, 0.5), 1.0),
    ]
    .into_iter()
    .collect();

    let grid = aggregate_all(&glyphs, &Count, &ViewTransform::identity(), 2, 1, 1);
    assert_eq!(grid.values(), &[1, 0]);
}

// ============================================================================
// File-backed glyphsets
// ============================================================================

#[test]
fn test_file_glyphset_matches_list() {
    let records: Vec<(f64, f64, f64)> = random_points(800, &Rect::new(0.0, 0.0, 20.0, 10.0), 11)
        .iter()
        .map(|g| (g.shape().min_x, g.shape().min_y, *g.value()))
        .collect();

    let dir = temp_test_dir();
    let path = write_glyph_file(dir.path(), "points.hbin", &records).unwrap();
    let file = FileGlyphset::open(&path, FileGlyphsetConfig::default()).unwrap();
    let list: GlyphList<f64> = records.iter().map(|(x, y, v)| (Rect::point(*x, *y), *v)).collect();

    let view = ViewTransform::scale(2.0, 2.0);
    let from_file = aggregate_all(&file, &Sum, &view, 40, 20, 16);
    let from_list = aggregate_all(&list, &Sum, &view, 40, 20, 16);
    assert_eq!(from_file, from_list);
}

// ============================================================================
// Failure propagation
// ============================================================================

struct Corrupt;

struct CorruptCursor;

impl GlyphCursor<f64> for CorruptCursor {
    fn get(&mut self, _index: u64) -> glyphset::Result<Glyph<f64>> {
        Err(GlyphsetError::invalid_record("corrupt record"))
    }
}

impl Glyphset<f64> for Corrupt {
    type Cursor<'a> = CorruptCursor;

    fn len(&self) -> u64 {
        100
    }

    fn bounds(&self) -> glyphset::Result<Rect> {
        Ok(Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    fn intersects(&self, _query: &Rect) -> glyphset::Result<Vec<Glyph<f64>>> {
        Err(GlyphsetError::invalid_record("corrupt record"))
    }

    fn cursor(&self) -> CorruptCursor {
        CorruptCursor
    }
}

#[test]
fn test_decoding_errors_abort_render() {
    for strategy in Strategy::all() {
        let err = renderer(strategy)
            .aggregate(&Corrupt, &Count, &ViewTransform::identity(), 10, 10, 5)
            .unwrap_err();
        assert!(matches!(err, RenderError::Glyphset(_)), "{}: {:?}", strategy, err);
    }
}

/// Count that panics on a poisoned value.
struct Fragile;

impl Aggregator<f64, u64> for Fragile {
    fn identity(&self) -> u64 {
        0
    }

    fn combine(&self, current: &u64, glyph: &Glyph<f64>) -> u64 {
        assert!(*glyph.value() >= 0.0, "negative glyph value");
        current + 1
    }

    fn rollup(&self, left: &u64, right: &u64) -> u64 {
        left + right
    }
}

#[test]
fn test_aggregator_panic_becomes_error() {
    let mut glyphs = random_points(500, &Rect::new(0.0, 0.0, 16.0, 16.0), 5);
    glyphs.add(Rect::point(8.0, 8.0), -1.0);

    for strategy in Strategy::all() {
        let err = renderer(strategy)
            .aggregate(&glyphs, &Fragile, &ViewTransform::identity(), 16, 16, 4)
            .unwrap_err();
        match err {
            RenderError::WorkerPanicked(msg) => assert!(msg.contains("negative glyph value")),
            other => panic!("{}: expected WorkerPanicked, got {:?}", strategy, other),
        }
    }
}

#[test]
fn test_renderers_share_a_pool() {
    let first = renderer(Strategy::PixelParallel);
    let second = Renderer::with_pool(
        first.pool().clone(),
        RenderConfig::default().with_strategy(Strategy::GlyphParallel),
    )
    .unwrap();

    let glyphs = four_corner_points();
    let a = first.aggregate(&glyphs, &Count, &ViewTransform::identity(), 2, 2, 1).unwrap();
    let b = second.aggregate(&glyphs, &Count, &ViewTransform::identity(), 2, 2, 1).unwrap();
    assert_eq!(a, b);
    assert_eq!(first.pool().threads(), 4);
}
