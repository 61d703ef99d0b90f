//! Binary reading utilities for decoding demo files.
//!
//! This module provides functions for reading little-endian integers,
//! floats, byte slices, and NUL-padded strings from byte buffers, plus a
//! forward-only [`Cursor`] used by the frame decoder. All reads perform
//! bounds checking and return `DemoError::UnexpectedEof` for truncated data.
//!
//! # Example
//!
//! ```
//! use demoreel::binary::{read_u16_le, read_u32_le, read_fixed_string};
//!
//! let data = [0x26, 0x89, 0x01, 0x00, b'H', b'i', 0x00, 0x00];
//!
//! assert_eq!(read_u16_le(&data, 0).unwrap(), 0x8926);
//! assert_eq!(read_u32_le(&data, 0).unwrap(), 0x00018926);
//! assert_eq!(read_fixed_string(&data, 4, 4).unwrap(), "Hi");
//! ```

use crate::error::{DemoError, Result};

/// Reads a slice of bytes from the buffer at the given offset.
///
/// # Errors
///
/// Returns `DemoError::UnexpectedEof` if the buffer doesn't contain
/// at least `len` bytes starting from the given offset.
pub fn read_bytes(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    match offset.checked_add(len) {
        Some(end) if end <= bytes.len() => Ok(&bytes[offset..end]),
        _ => Err(DemoError::unexpected_eof(
            offset,
            len,
            bytes.len().saturating_sub(offset),
        )),
    }
}

/// Reads a fixed-size array from the buffer at the given offset.
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(read_bytes(bytes, offset, N)?);
    Ok(out)
}

/// Reads a single byte at the given offset.
///
/// # Errors
///
/// Returns `DemoError::UnexpectedEof` if `offset` is past the end.
pub fn read_u8(bytes: &[u8], offset: usize) -> Result<u8> {
    Ok(read_array::<1>(bytes, offset)?[0])
}

/// Reads a little-endian u16 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `DemoError::UnexpectedEof` if the buffer doesn't contain
/// at least 2 bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use demoreel::binary::read_u16_le;
///
/// let data = [0x34, 0x12, 0xFF, 0xFF];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0xFFFF);
/// ```
pub fn read_u16_le(bytes: &[u8], offset: usize) -> Result<u16> {
    read_array(bytes, offset).map(u16::from_le_bytes)
}

/// Reads a little-endian u32 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `DemoError::UnexpectedEof` if the buffer doesn't contain
/// at least 4 bytes starting from the given offset.
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    read_array(bytes, offset).map(u32::from_le_bytes)
}

/// Reads a little-endian i32 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `DemoError::UnexpectedEof` on truncation.
pub fn read_i32_le(bytes: &[u8], offset: usize) -> Result<i32> {
    read_array(bytes, offset).map(i32::from_le_bytes)
}

/// Reads a little-endian IEEE-754 f32 from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `DemoError::UnexpectedEof` on truncation.
pub fn read_f32_le(bytes: &[u8], offset: usize) -> Result<f32> {
    read_array(bytes, offset).map(f32::from_le_bytes)
}

/// Reads a fixed-length string from the buffer, stripping NUL padding.
///
/// Everything from the first NUL byte onward is discarded. Invalid UTF-8
/// sequences are replaced, since header names are informational only.
///
/// # Errors
///
/// Returns `DemoError::UnexpectedEof` if offset + len is beyond the buffer.
///
/// # Example
///
/// ```
/// use demoreel::binary::read_fixed_string;
///
/// let data = b"cp_badlands\x00\x00\x00\x00\x00";
/// assert_eq!(read_fixed_string(data, 0, 16).unwrap(), "cp_badlands");
/// ```
pub fn read_fixed_string(bytes: &[u8], offset: usize, len: usize) -> Result<String> {
    let slice = read_bytes(bytes, offset, len)?;
    let string_len = slice.iter().position(|&b| b == 0).unwrap_or(len);
    Ok(String::from_utf8_lossy(&slice[..string_len]).into_owned())
}

/// A forward-only reader over a byte buffer.
///
/// The cursor never seeks backward: every successful read advances the
/// position by exactly the number of bytes consumed, and a failed read
/// leaves it untouched.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at `offset`.
    #[must_use]
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// Returns the current byte offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of bytes left after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Returns whether the cursor reached the end of the buffer.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads `len` raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::UnexpectedEof` on truncation.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let slice = read_bytes(self.data, self.offset, len)?;
        self.offset += len;
        Ok(slice)
    }

    /// Skips `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::UnexpectedEof` on truncation.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::UnexpectedEof` on truncation.
    pub fn u8(&mut self) -> Result<u8> {
        let value = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(value)
    }

    /// Reads a little-endian u16.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::UnexpectedEof` on truncation.
    pub fn u16(&mut self) -> Result<u16> {
        let value = read_u16_le(self.data, self.offset)?;
        self.offset += 2;
        Ok(value)
    }

    /// Reads a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::UnexpectedEof` on truncation.
    pub fn u32(&mut self) -> Result<u32> {
        let value = read_u32_le(self.data, self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Reads a little-endian i32.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::UnexpectedEof` on truncation.
    pub fn i32(&mut self) -> Result<i32> {
        let value = read_i32_le(self.data, self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Reads a little-endian f32.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::UnexpectedEof` on truncation.
    pub fn f32(&mut self) -> Result<f32> {
        let value = read_f32_le(self.data, self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Reads a string prefixed by its u16 byte length.
    ///
    /// # Errors
    ///
    /// - `DemoError::UnexpectedEof` on truncation
    /// - `DemoError::CorruptData` if the bytes are not valid UTF-8
    pub fn string(&mut self) -> Result<String> {
        let start = self.offset;
        let len = usize::from(read_u16_le(self.data, start)?);
        let bytes = read_bytes(self.data, start + 2, len)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| DemoError::corrupt(start, format!("invalid UTF-8 string: {e}")))?;
        self.offset = start + 2 + len;
        Ok(text.to_owned())
    }
}
