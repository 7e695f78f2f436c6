//! Glyphs stored as fixed-size binary records in a read-only file.

use crate::format::{Header, Record, RecordReader};
use crate::{GlyphCursor, Glyphset, Result};
use ar_common::{Glyph, GlyphId, Rect};
use bytes::Bytes;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, instrument, warn};

/// Geometry applied to every record of a file-backed glyphset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileGlyphsetConfig {
    /// Width of the rectangle centered on each record's (X, Y).
    pub glyph_width: f64,

    /// Height of the rectangle centered on each record's (X, Y).
    pub glyph_height: f64,

    /// Negate Y while decoding.
    pub flip_y: bool,
}

impl Default for FileGlyphsetConfig {
    fn default() -> Self {
        Self {
            glyph_width: 0.0,
            glyph_height: 0.0,
            flip_y: false,
        }
    }
}

impl FileGlyphsetConfig {
    /// Square glyphs of the given size.
    pub fn with_glyph_size(size: f64) -> Self {
        Self {
            glyph_width: size,
            glyph_height: size,
            ..Self::default()
        }
    }

    pub fn flip_y(mut self, flip: bool) -> Self {
        self.flip_y = flip;
        self
    }
}

/// A glyphset decoded on demand from binary records.
///
/// The header is parsed once at construction. The storage is immutable and
/// shared; every [`FileCursor`] owns its own read position, so concurrent
/// workers never contend on decoder state.
#[derive(Debug)]
pub struct FileGlyphset {
    storage: Bytes,
    header: Header,
    config: FileGlyphsetConfig,
    len: u64,
    bounds: OnceLock<Rect>,
}

impl FileGlyphset {
    /// Memory-map `path` and parse its header.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: FileGlyphsetConfig) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let storage = if file.metadata()?.len() == 0 {
            Bytes::new()
        } else {
            // SAFETY: the map is only ever read; glyph files are treated as
            // immutable for the lifetime of the set.
            let mmap = unsafe { Mmap::map(&file)? };
            Bytes::from_owner(mmap)
        };
        Self::from_bytes(storage, config)
    }

    /// Parse a glyphset held in memory.
    pub fn from_bytes(storage: Bytes, config: FileGlyphsetConfig) -> Result<Self> {
        let header = Header::parse(&storage)?;
        let len = header.record_count(storage.len());

        let trailing = storage.len().saturating_sub(header.record_offset(len));
        if trailing > 0 {
            warn!(
                trailing_bytes = trailing,
                record_size = header.record_size(),
                "Ignoring partial record at end of glyph data"
            );
        }

        debug!(
            fields = header.field_count(),
            record_size = header.record_size(),
            records = len,
            "Parsed glyph file header"
        );

        Ok(Self {
            storage,
            header,
            config,
            len,
            bounds: OnceLock::new(),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn config(&self) -> &FileGlyphsetConfig {
        &self.config
    }

    fn reader(&self) -> RecordReader {
        RecordReader::new(self.storage.clone(), self.header.clone())
    }

    fn glyph(&self, index: u64, record: Record) -> Glyph<f64> {
        let y = if self.config.flip_y { -record.y } else { record.y };
        let shape = Rect::centered(
            record.x,
            y,
            self.config.glyph_width,
            self.config.glyph_height,
        );
        Glyph::new(GlyphId(index), shape, record.value)
    }
}

impl Glyphset<f64> for FileGlyphset {
    type Cursor<'a>
        = FileCursor<'a>
    where
        Self: 'a;

    fn len(&self) -> u64 {
        self.len
    }

    fn bounds(&self) -> Result<Rect> {
        if let Some(bounds) = self.bounds.get() {
            return Ok(*bounds);
        }

        let scanned = self
            .reader()
            .fold(None, |acc: Option<Rect>, (i, r)| {
                let shape = *self.glyph(i, r).shape();
                Some(acc.map_or(shape, |b| b.union(&shape)))
            })
            .unwrap_or_else(Rect::zero);
        Ok(*self.bounds.get_or_init(|| scanned))
    }

    fn intersects(&self, query: &Rect) -> Result<Vec<Glyph<f64>>> {
        Ok(self
            .reader()
            .map(|(i, r)| self.glyph(i, r))
            .filter(|g| g.shape().intersects(query))
            .collect())
    }

    fn cursor(&self) -> Self::Cursor<'_> {
        FileCursor {
            set: self,
            reader: self.reader(),
        }
    }
}

/// Independent random-access reader over a [`FileGlyphset`].
#[derive(Debug)]
pub struct FileCursor<'a> {
    set: &'a FileGlyphset,
    reader: RecordReader,
}

impl GlyphCursor<f64> for FileCursor<'_> {
    fn get(&mut self, index: u64) -> Result<Glyph<f64>> {
        let record = self.reader.read(index)?;
        Ok(self.set.glyph(index, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FieldType;
    use crate::{GlyphFileWriter, GlyphsetError};

    fn sample(flip_y: bool) -> FileGlyphset {
        let mut writer = GlyphFileWriter::new(vec![FieldType::Double, FieldType::Double, FieldType::Int])
            .unwrap();
        writer.push(&[1.0, 2.0, 10.0]).unwrap();
        writer.push(&[-3.0, 4.0, 20.0]).unwrap();
        writer.push(&[5.0, -6.0, 30.0]).unwrap();

        let config = FileGlyphsetConfig::with_glyph_size(2.0).flip_y(flip_y);
        FileGlyphset::from_bytes(writer.finish(), config).unwrap()
    }

    #[test]
    fn test_glyph_geometry_is_centered() {
        let set = sample(false);
        let g = set.cursor().get(0).unwrap();
        assert_eq!(*g.shape(), Rect::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(*g.value(), 10.0);
        assert_eq!(g.id(), GlyphId(0));
    }

    #[test]
    fn test_flip_y() {
        let set = sample(true);
        let g = set.cursor().get(2).unwrap();
        assert_eq!(*g.shape(), Rect::new(4.0, 5.0, 6.0, 7.0));
    }

    #[test]
    fn test_bounds_scan() {
        let set = sample(false);
        assert_eq!(set.bounds().unwrap(), Rect::new(-4.0, -7.0, 6.0, 5.0));
        assert_eq!(set.bounds().unwrap(), Rect::new(-4.0, -7.0, 6.0, 5.0));
    }

    #[test]
    fn test_bounds_of_empty_and_flipped_sets() {
        let writer = GlyphFileWriter::new(vec![FieldType::Int, FieldType::Int]).unwrap();
        let empty = FileGlyphset::from_bytes(writer.finish(), FileGlyphsetConfig::default()).unwrap();
        assert_eq!(empty.bounds().unwrap(), Rect::zero());

        let set = sample(true);
        assert_eq!(set.bounds().unwrap(), Rect::new(-4.0, -5.0, 6.0, 7.0));
    }

    #[test]
    fn test_intersects() {
        let set = sample(false);
        let hits = set.intersects(&Rect::new(-5.0, 0.0, 3.0, 6.0)).unwrap();
        let mut ids: Vec<u64> = hits.iter().map(|g| g.id().0).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_out_of_range() {
        let set = sample(false);
        assert!(matches!(
            set.cursor().get(3),
            Err(GlyphsetError::OutOfRange { index: 3, len: 3 })
        ));
    }
}
