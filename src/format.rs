//! Format detection and protocol constants for demo files.
//!
//! A demo file begins with an 8-byte magic marker followed by the demo
//! protocol version. This module validates both before any other part of
//! the buffer is touched.
//!
//! # Example
//!
//! ```
//! use demoreel::format::{detect_format, DEMO_MAGIC};
//!
//! let mut data = DEMO_MAGIC.to_vec();
//! data.extend_from_slice(&3u32.to_le_bytes());
//! assert_eq!(detect_format(&data).unwrap(), 3);
//!
//! assert!(detect_format(b"PKZIP...").is_err());
//! ```

use crate::binary::{read_bytes, read_u32_le};
use crate::error::{DemoError, Result};

/// The magic bytes every demo file starts with.
pub const DEMO_MAGIC: &[u8; 8] = b"HL2DEMO\0";

/// Lowest demo protocol version this decoder understands.
pub const MIN_DEMO_PROTOCOL: u32 = 3;

/// Highest demo protocol version this decoder understands.
pub const MAX_DEMO_PROTOCOL: u32 = 4;

/// Frame command introducing a packet frame (tick plus messages).
pub const FRAME_PACKET: u8 = 0x02;

/// Frame command marking the end of the recording.
pub const FRAME_STOP: u8 = 0x07;

/// Message kind byte terminating a packet frame.
pub const MESSAGE_END: u8 = 0x00;

/// First message kind carrying an explicit u32 payload length.
///
/// Kinds at or above this value may be skipped when unknown; unknown kinds
/// below it have no recoverable length.
pub const LENGTH_PREFIXED_KINDS: u8 = 0x80;

/// Name of the string table holding interned property names.
pub const PROPERTY_NAME_TABLE: &str = "propnames";

/// Name of the string table holding connected players.
pub const USER_INFO_TABLE: &str = "userinfo";

/// Checks the magic marker and protocol version, returning the version.
///
/// # Errors
///
/// - `DemoError::InvalidMagic` if the buffer is shorter than the magic or
///   does not start with [`DEMO_MAGIC`]
/// - `DemoError::UnexpectedEof` if the version field is truncated
/// - `DemoError::UnsupportedVersion` if the version is outside
///   `MIN_DEMO_PROTOCOL..=MAX_DEMO_PROTOCOL`
pub fn detect_format(data: &[u8]) -> Result<u32> {
    let magic = read_bytes(data, 0, DEMO_MAGIC.len())
        .map_err(|_| DemoError::invalid_magic(DEMO_MAGIC, data))?;
    if magic != DEMO_MAGIC {
        return Err(DemoError::invalid_magic(DEMO_MAGIC, magic));
    }

    let version = read_u32_le(data, DEMO_MAGIC.len())?;
    if !(MIN_DEMO_PROTOCOL..=MAX_DEMO_PROTOCOL).contains(&version) {
        return Err(DemoError::UnsupportedVersion {
            version,
            min: MIN_DEMO_PROTOCOL,
            max: MAX_DEMO_PROTOCOL,
        });
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn with_version(version: u32) -> Vec<u8> {
        let mut data = DEMO_MAGIC.to_vec();
        data.extend_from_slice(&version.to_le_bytes());
        data
    }

    #[test]
    fn test_detect_supported_versions() {
        assert_eq!(detect_format(&with_version(3)).unwrap(), 3);
        assert_eq!(detect_format(&with_version(4)).unwrap(), 4);
    }

    #[test]
    fn test_detect_bad_magic() {
        let err = detect_format(b"PK\x03\x04 not a demo file").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_detect_short_buffer_is_format_error() {
        let err = detect_format(b"HL2").unwrap_err();
        assert!(matches!(err, DemoError::InvalidMagic { .. }));
        assert_eq!(detect_format(&[]).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn test_detect_unsupported_version() {
        let err = detect_format(&with_version(2)).unwrap_err();
        assert!(matches!(
            err,
            DemoError::UnsupportedVersion {
                version: 2,
                min: 3,
                max: 4
            }
        ));
        assert_eq!(
            detect_format(&with_version(5)).unwrap_err().kind(),
            ErrorKind::UnsupportedVersion
        );
    }

    #[test]
    fn test_detect_truncated_version() {
        let data = b"HL2DEMO\0\x03\x00";
        assert_eq!(
            detect_format(data).unwrap_err().kind(),
            ErrorKind::CorruptData
        );
    }
}
