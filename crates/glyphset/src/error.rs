//! Error types for glyph storage and decoding.

use thiserror::Error;

/// Errors that can occur while reading or querying a glyphset.
#[derive(Error, Debug)]
pub enum GlyphsetError {
    /// A header declared a field type tag this format does not know.
    #[error("unknown type tag '{tag}' for field {field}")]
    UnknownFieldType { field: usize, tag: char },

    /// The header is truncated or declares an unusable layout.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A record index past the end of the set.
    #[error("record {index} is out of range (glyphset holds {len})")]
    OutOfRange { index: u64, len: u64 },

    /// A record handed to the writer does not match the header.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Failed to open or map the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlyphsetError {
    /// Create an InvalidHeader error.
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Create an InvalidRecord error.
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create an OutOfRange error.
    pub fn out_of_range(index: u64, len: u64) -> Self {
        Self::OutOfRange { index, len }
    }
}

/// Result type for glyphset operations.
pub type Result<T> = std::result::Result<T, GlyphsetError>;
