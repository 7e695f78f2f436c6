//! Binary glyph record layout.
//!
//! A glyph file is a header followed by fixed-size records. All multi-byte
//! values are big-endian.
//!
//! ```text
//! [i32 field count]
//! [field count x u16 type tag]      'i' 'l' 's' 'd' 'f' 'b' 'c'
//! [record 0][record 1]...           fields concatenated per declared type
//! ```
//!
//! Field 0 is X, field 1 is Y and the optional field 2 is the glyph value.
//! Any further fields are carried in the record size but never decoded.

use crate::{GlyphsetError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the field-count prefix.
const COUNT_BYTES: usize = 4;
/// Size of one type tag.
const TAG_BYTES: usize = 2;

/// Declared type of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// 32-bit signed integer ('i')
    Int,
    /// 64-bit signed integer ('l')
    Long,
    /// 16-bit signed integer ('s')
    Short,
    /// 64-bit float ('d')
    Double,
    /// 32-bit float ('f')
    Float,
    /// 8-bit signed integer ('b')
    Byte,
    /// 16-bit unsigned character code ('c')
    Char,
}

impl FieldType {
    /// Look up a type by its header tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match char::from_u32(u32::from(tag))? {
            'i' => Some(Self::Int),
            'l' => Some(Self::Long),
            's' => Some(Self::Short),
            'd' => Some(Self::Double),
            'f' => Some(Self::Float),
            'b' => Some(Self::Byte),
            'c' => Some(Self::Char),
            _ => None,
        }
    }

    /// Header tag for this type.
    pub fn tag(&self) -> u16 {
        let c = match self {
            Self::Int => 'i',
            Self::Long => 'l',
            Self::Short => 's',
            Self::Double => 'd',
            Self::Float => 'f',
            Self::Byte => 'b',
            Self::Char => 'c',
        };
        c as u16
    }

    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Short | Self::Char => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
        }
    }

    /// Decode one value, advancing `buf`. The caller guarantees `width()`
    /// bytes remain.
    fn read(&self, buf: &mut &[u8]) -> f64 {
        match self {
            Self::Int => f64::from(buf.get_i32()),
            Self::Long => buf.get_i64() as f64,
            Self::Short => f64::from(buf.get_i16()),
            Self::Double => buf.get_f64(),
            Self::Float => f64::from(buf.get_f32()),
            Self::Byte => f64::from(buf.get_i8()),
            Self::Char => f64::from(buf.get_u16()),
        }
    }

    /// Encode one value. Integer types truncate toward zero and saturate.
    fn write(&self, buf: &mut BytesMut, value: f64) {
        match self {
            Self::Int => buf.put_i32(value as i32),
            Self::Long => buf.put_i64(value as i64),
            Self::Short => buf.put_i16(value as i16),
            Self::Double => buf.put_f64(value),
            Self::Float => buf.put_f32(value as f32),
            Self::Byte => buf.put_i8(value as i8),
            Self::Char => buf.put_u16(value as u16),
        }
    }
}

/// Parsed header: field types plus the derived layout sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    types: Vec<FieldType>,
    header_size: usize,
    record_size: usize,
}

impl Header {
    /// Build a header for the given field types. X and Y are mandatory.
    pub fn new(types: Vec<FieldType>) -> Result<Self> {
        if types.len() < 2 {
            return Err(GlyphsetError::invalid_header(format!(
                "records need at least X and Y fields, header declares {}",
                types.len()
            )));
        }

        let header_size = COUNT_BYTES + types.len() * TAG_BYTES;
        let record_size = types.iter().map(FieldType::width).sum();

        Ok(Self {
            types,
            header_size,
            record_size,
        })
    }

    /// Parse the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut buf = data;
        if buf.remaining() < COUNT_BYTES {
            return Err(GlyphsetError::invalid_header("missing field count"));
        }

        let count = buf.get_i32();
        if count < 0 {
            return Err(GlyphsetError::invalid_header(format!(
                "negative field count {}",
                count
            )));
        }
        let count = count as usize;

        if buf.remaining() < count.saturating_mul(TAG_BYTES) {
            return Err(GlyphsetError::invalid_header(format!(
                "header declares {} fields but holds only {} tag bytes",
                count,
                buf.remaining()
            )));
        }

        let mut types = Vec::with_capacity(count);
        for field in 0..count {
            let tag = buf.get_u16();
            let field_type = FieldType::from_tag(tag).ok_or(GlyphsetError::UnknownFieldType {
                field,
                tag: char::from_u32(u32::from(tag)).unwrap_or(char::REPLACEMENT_CHARACTER),
            })?;
            types.push(field_type);
        }

        Self::new(types)
    }

    /// Append the encoded header to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.types.len() as i32);
        for t in &self.types {
            buf.put_u16(t.tag());
        }
    }

    pub fn types(&self) -> &[FieldType] {
        &self.types
    }

    pub fn field_count(&self) -> usize {
        self.types.len()
    }

    /// Bytes before the first record.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Bytes per record.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Whether records carry a value field.
    pub fn has_value(&self) -> bool {
        self.types.len() > 2
    }

    /// Byte offset of record `index`.
    pub fn record_offset(&self, index: u64) -> usize {
        self.header_size + (index as usize) * self.record_size
    }

    /// Number of complete records in a buffer of `total_len` bytes.
    pub fn record_count(&self, total_len: usize) -> u64 {
        (total_len.saturating_sub(self.header_size) / self.record_size) as u64
    }

    /// Decode X, Y and value from one record's bytes.
    fn decode(&self, mut record: &[u8]) -> Record {
        let x = self.types[0].read(&mut record);
        let y = self.types[1].read(&mut record);
        let value = if self.has_value() {
            self.types[2].read(&mut record)
        } else {
            0.0
        };
        Record { x, y, value }
    }

    /// Encode one record from its field values.
    pub fn encode_record(&self, buf: &mut BytesMut, fields: &[f64]) -> Result<()> {
        if fields.len() != self.types.len() {
            return Err(GlyphsetError::invalid_record(format!(
                "expected {} fields, got {}",
                self.types.len(),
                fields.len()
            )));
        }
        for (t, v) in self.types.iter().zip(fields) {
            t.write(buf, *v);
        }
        Ok(())
    }
}

/// The decoded fields of one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// An independent read position over shared record storage.
///
/// Readers clone the storage handle, not the bytes, so any number of them
/// can decode the same buffer concurrently.
#[derive(Debug, Clone)]
pub struct RecordReader {
    data: Bytes,
    header: Header,
    len: u64,
    next: u64,
}

impl RecordReader {
    pub fn new(data: Bytes, header: Header) -> Self {
        let len = header.record_count(data.len());
        Self {
            data,
            header,
            len,
            next: 0,
        }
    }

    /// Number of complete records.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position the reader so the next sequential read returns `index`.
    pub fn seek(&mut self, index: u64) {
        self.next = index;
    }

    /// Decode record `index` and leave the reader just past it.
    pub fn read(&mut self, index: u64) -> Result<Record> {
        if index >= self.len {
            return Err(GlyphsetError::out_of_range(index, self.len));
        }
        let start = self.header.record_offset(index);
        let end = start + self.header.record_size();
        let record = self.header.decode(&self.data[start..end]);
        self.next = index + 1;
        Ok(record)
    }
}

impl Iterator for RecordReader {
    type Item = (u64, Record);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        self.read(index).ok().map(|r| (index, r))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}
