//! Header parsing for demo files.
//!
//! # Header Layout (1068 bytes)
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0x000 | 8 | `magic` | "HL2DEMO\0" |
//! | 0x008 | 4 | `demo_protocol` | Demo protocol version (3-4) |
//! | 0x00C | 4 | `network_protocol` | Engine network protocol |
//! | 0x010 | 260 | `server_name` | NUL padded |
//! | 0x114 | 260 | `client_name` | NUL padded |
//! | 0x218 | 260 | `map_name` | NUL padded |
//! | 0x31C | 260 | `game_directory` | NUL padded |
//! | 0x420 | 4 | `playback_time` | Seconds (f32) |
//! | 0x424 | 4 | `tick_count` | Total ticks |
//! | 0x428 | 4 | `frame_count` | Total frames |
//!
//! Frames start at offset 0x42C.

use serde::Serialize;
use tracing::debug;

use crate::binary::{read_f32_le, read_fixed_string, read_u32_le};
use crate::error::{DemoError, Result};
use crate::format::detect_format;
use crate::frames::FrameIterator;

/// The size of the demo header in bytes.
pub const HEADER_SIZE: usize = 0x42C;

/// Size of each NUL-padded name field.
const NAME_FIELD_SIZE: usize = 260;

/// Parsed demo header.
///
/// # Example
///
/// ```no_run
/// use demoreel::header::DemoHeader;
///
/// let data = std::fs::read("match.dem").unwrap();
/// let header = DemoHeader::parse(&data)?;
/// println!("{} ({} ticks)", header.map_name, header.tick_count);
/// # Ok::<(), demoreel::error::DemoError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoHeader {
    /// Demo protocol version at offset 0x008.
    pub demo_protocol: u32,

    /// Network protocol version at offset 0x00C.
    pub network_protocol: u32,

    /// Name of the recording server.
    pub server_name: String,

    /// Name of the recording client.
    pub client_name: String,

    /// Map identifier.
    pub map_name: String,

    /// Game directory (mod name).
    pub game_directory: String,

    /// Recording length in seconds.
    pub playback_time: f32,

    /// Total number of ticks.
    pub tick_count: u32,

    /// Total number of frames.
    pub frame_count: u32,
}

impl DemoHeader {
    /// Parses the header from the start of a demo buffer.
    ///
    /// # Errors
    ///
    /// - `DemoError::InvalidMagic` if the magic marker is absent
    /// - `DemoError::UnsupportedVersion` if the protocol is not supported
    /// - `DemoError::CorruptData` if the header is truncated
    pub fn parse(data: &[u8]) -> Result<Self> {
        let demo_protocol = detect_format(data)?;

        if data.len() < HEADER_SIZE {
            return Err(DemoError::corrupt(
                data.len(),
                format!(
                    "truncated header: expected {HEADER_SIZE} bytes, found {}",
                    data.len()
                ),
            ));
        }

        let header = DemoHeader {
            demo_protocol,
            network_protocol: read_u32_le(data, 0x00C)?,
            server_name: read_fixed_string(data, 0x010, NAME_FIELD_SIZE)?,
            client_name: read_fixed_string(data, 0x114, NAME_FIELD_SIZE)?,
            map_name: read_fixed_string(data, 0x218, NAME_FIELD_SIZE)?,
            game_directory: read_fixed_string(data, 0x31C, NAME_FIELD_SIZE)?,
            playback_time: read_f32_le(data, 0x420)?,
            tick_count: read_u32_le(data, 0x424)?,
            frame_count: read_u32_le(data, 0x428)?,
        };

        debug!(
            protocol = header.demo_protocol,
            map = %header.map_name,
            ticks = header.tick_count,
            "parsed demo header"
        );

        Ok(header)
    }

    /// Returns the duration of one tick in seconds.
    ///
    /// Zero when the header records no ticks.
    #[must_use]
    pub fn tick_interval(&self) -> f32 {
        if self.tick_count == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ticks = self.tick_count as f32;
            self.playback_time / ticks
        }
    }

    /// Returns the playback time formatted as MM:SS.
    #[must_use]
    pub fn duration_string(&self) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total_seconds = self.playback_time.max(0.0) as u32;
        format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

/// A parsed demo: its header plus the buffer it was read from.
#[derive(Debug, Clone)]
pub struct DemoFile<'a> {
    header: DemoHeader,
    data: &'a [u8],
}

impl<'a> DemoFile<'a> {
    /// Validates and parses the header of `data`.
    ///
    /// # Errors
    ///
    /// See [`DemoHeader::parse`].
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = DemoHeader::parse(data)?;
        Ok(Self { header, data })
    }

    /// Returns the parsed header.
    #[must_use]
    pub fn header(&self) -> &DemoHeader {
        &self.header
    }

    /// Returns the raw buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns a lazy iterator over the frames following the header.
    #[must_use]
    pub fn frames(&self) -> FrameIterator<'a> {
        FrameIterator::new(self.data, HEADER_SIZE)
    }
}
