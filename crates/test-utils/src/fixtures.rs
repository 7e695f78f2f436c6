//! Common test fixtures.

use ar_common::Rect;
use glyphset::{FieldType, GlyphFileWriter, GlyphList, Result};
use std::path::{Path, PathBuf};

/// Four unit-value points at the centers of a 2x2 viewport's pixels, viewed
/// through the identity transform.
pub fn four_corner_points() -> GlyphList<f64> {
    [(0.5, 0.5), (1.5, 0.5), (0.5, 1.5), (1.5, 1.5)]
        .into_iter()
        .map(|(x, y)| (Rect::point(x, y), 1.0))
        .collect()
}

/// Glyphs anchored at the integer corners (0,0), (1,0), (0,1) and (1,1), each
/// `side` wide and tall. A side of 0 gives plain points.
pub fn four_integer_corners(side: f64) -> GlyphList<f64> {
    [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
        .into_iter()
        .map(|(x, y)| (Rect::new(x, y, x + side, y + side), 1.0))
        .collect()
}

/// Write `(x, y, value)` records as a `d`, `d`, `i` glyph file in `dir`.
pub fn write_glyph_file(dir: &Path, name: &str, records: &[(f64, f64, f64)]) -> Result<PathBuf> {
    let mut writer = GlyphFileWriter::new(vec![FieldType::Double, FieldType::Double, FieldType::Int])?;
    for (x, y, v) in records {
        writer.push(&[*x, *y, *v])?;
    }

    let path = dir.join(name);
    writer.write_to(&path)?;
    Ok(path)
}

/// Creates a temporary directory that is removed when dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}
