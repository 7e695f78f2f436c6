//! Encoder for the binary glyph format.

use crate::format::{FieldType, Header};
use crate::Result;
use bytes::{Bytes, BytesMut};
use std::path::Path;
use tracing::debug;

/// Builds a glyph file in memory, one record at a time.
#[derive(Debug)]
pub struct GlyphFileWriter {
    header: Header,
    buf: BytesMut,
    records: u64,
}

impl GlyphFileWriter {
    /// Start a file whose records have the given field types.
    pub fn new(types: Vec<FieldType>) -> Result<Self> {
        let header = Header::new(types)?;
        let mut buf = BytesMut::with_capacity(header.header_size());
        header.encode(&mut buf);
        Ok(Self {
            header,
            buf,
            records: 0,
        })
    }

    /// Append one record. `fields` must match the declared field count.
    pub fn push(&mut self, fields: &[f64]) -> Result<()> {
        self.buf.reserve(self.header.record_size());
        self.header.encode_record(&mut self.buf, fields)?;
        self.records += 1;
        Ok(())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Records written so far.
    pub fn len(&self) -> u64 {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// The encoded file.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Write the encoded file to `path`.
    pub fn write_to(self, path: impl AsRef<Path>) -> Result<()> {
        let records = self.records;
        std::fs::write(path.as_ref(), self.finish())?;
        debug!(records, path = %path.as_ref().display(), "Wrote glyph file");
        Ok(())
    }
}
