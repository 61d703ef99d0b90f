//! Error types for the demo unspooler.
//!
//! Every failure the engine can report is a variant of [`DemoError`]. The
//! variants are grouped into a small taxonomy ([`ErrorKind`]) so callers can
//! branch on the class of failure without matching every variant.

use thiserror::Error;

use crate::value::ValueKind;

/// The main error type for demo decoding, state reconstruction and querying.
///
/// # Example
///
/// ```
/// use demoreel::error::{DemoError, ErrorKind, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(DemoError::corrupt(12, "unknown message kind 0x42"))
/// }
///
/// assert_eq!(example_operation().unwrap_err().kind(), ErrorKind::CorruptData);
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DemoError {
    /// The buffer does not start with the demo magic marker.
    #[error("Invalid magic bytes: expected {expected}, found {found}")]
    InvalidMagic {
        /// The expected magic bytes (as hex string for display).
        expected: String,
        /// The actual bytes found at the start of the buffer (as hex string).
        found: String,
    },

    /// The demo protocol version is outside the supported range.
    #[error("Unsupported demo protocol {version}: supported range is {min}..={max}")]
    UnsupportedVersion {
        /// The version stored in the header.
        version: u32,
        /// Lowest supported version.
        min: u32,
        /// Highest supported version.
        max: u32,
    },

    /// The data ended before a complete structure could be read.
    #[error(
        "Unexpected end of data at offset {offset}: expected {expected} bytes, but only {available} available"
    )]
    UnexpectedEof {
        /// Offset at which the read started.
        offset: usize,
        /// The number of bytes the read needed.
        expected: usize,
        /// The number of bytes remaining in the buffer.
        available: usize,
    },

    /// The stream is desynchronized and cannot be decoded further.
    #[error("Corrupt data at offset {offset}: {reason}")]
    CorruptData {
        /// Byte offset where the problem was detected.
        offset: usize,
        /// A description of what was wrong.
        reason: String,
    },

    /// A property changed its value variant between updates.
    #[error("Property {class}.{property} changed type from {expected} to {found}")]
    PropertyTypeMismatch {
        /// Entity class owning the property.
        class: String,
        /// Property name.
        property: String,
        /// The variant first observed.
        expected: ValueKind,
        /// The variant in the offending update.
        found: ValueKind,
    },

    /// The path query could not be compiled.
    #[error("Query syntax error at position {position}: {reason}")]
    QuerySyntax {
        /// Character position in the query string.
        position: usize,
        /// A description of the syntax problem.
        reason: String,
    },

    /// The sampling frequency must be at least one tick.
    #[error("Invalid tick frequency {value}: must be at least 1")]
    InvalidTickFrequency {
        /// The rejected value.
        value: u32,
    },
}

/// Classification of [`DemoError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad magic header; no frame was produced.
    Format,
    /// Protocol version outside the known range; no frame was produced.
    UnsupportedVersion,
    /// Unrecoverable desynchronization of the byte stream.
    CorruptData,
    /// A property changed value variant.
    PropertyTypeMismatch,
    /// Malformed query string.
    QuerySyntax,
    /// Invalid argument value (tick frequency).
    Value,
}

impl DemoError {
    /// Creates an `InvalidMagic` error with the given byte slices.
    ///
    /// The bytes are converted to hex strings for human-readable display.
    #[must_use]
    pub fn invalid_magic(expected: &[u8], found: &[u8]) -> Self {
        DemoError::InvalidMagic {
            expected: bytes_to_hex(expected),
            found: bytes_to_hex(found),
        }
    }

    /// Creates an `UnexpectedEof` error for a read of `expected` bytes at `offset`.
    #[must_use]
    pub fn unexpected_eof(offset: usize, expected: usize, available: usize) -> Self {
        DemoError::UnexpectedEof {
            offset,
            expected,
            available,
        }
    }

    /// Creates a `CorruptData` error.
    #[must_use]
    pub fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        DemoError::CorruptData {
            offset,
            reason: reason.into(),
        }
    }

    /// Creates a `QuerySyntax` error.
    #[must_use]
    pub fn query_syntax(position: usize, reason: impl Into<String>) -> Self {
        DemoError::QuerySyntax {
            position,
            reason: reason.into(),
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DemoError::InvalidMagic { .. } => ErrorKind::Format,
            DemoError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            DemoError::UnexpectedEof { .. } | DemoError::CorruptData { .. } => {
                ErrorKind::CorruptData
            }
            DemoError::PropertyTypeMismatch { .. } => ErrorKind::PropertyTypeMismatch,
            DemoError::QuerySyntax { .. } => ErrorKind::QuerySyntax,
            DemoError::InvalidTickFrequency { .. } => ErrorKind::Value,
        }
    }
}

/// Converts a byte slice to a hexadecimal string representation.
///
/// If the slice is 8 bytes or less, formats as space-separated hex values.
/// If longer, shows the first 8 bytes followed by "...".
fn bytes_to_hex(bytes: &[u8]) -> String {
    let hex = |slice: &[u8]| {
        slice
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    if bytes.len() <= 8 {
        hex(bytes)
    } else {
        format!("{}... ({} bytes total)", hex(&bytes[..8]), bytes.len())
    }
}

/// A specialized Result type for demo operations.
pub type Result<T> = std::result::Result<T, DemoError>;
