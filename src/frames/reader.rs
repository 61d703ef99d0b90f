//! Lazy frame iteration over a demo buffer.

use tracing::trace;

use super::{Frame, Message};
use crate::binary::Cursor;
use crate::error::{DemoError, Result};
use crate::format::{FRAME_PACKET, FRAME_STOP, MESSAGE_END};

/// Iterator over the frames of a demo.
///
/// Each call to `next` decodes exactly one frame. The iterator stops at the
/// stop command; on the first error it yields that error and then finishes.
///
/// # Example
///
/// ```no_run
/// use demoreel::header::DemoFile;
///
/// let data = std::fs::read("match.dem").unwrap();
/// let demo = DemoFile::parse(&data)?;
/// for frame in demo.frames() {
///     let frame = frame?;
///     println!("tick {}: {} messages", frame.tick, frame.messages.len());
/// }
/// # Ok::<(), demoreel::error::DemoError>(())
/// ```
pub struct FrameIterator<'a> {
    /// Forward-only position in the demo buffer.
    cursor: Cursor<'a>,

    /// Tick of the previously yielded frame.
    last_tick: Option<u32>,

    /// Number of frames yielded so far.
    frame_count: usize,

    /// Whether iteration has completed.
    finished: bool,
}

impl<'a> FrameIterator<'a> {
    /// Creates an iterator whose first frame command is at `start_offset`.
    #[must_use]
    pub fn new(data: &'a [u8], start_offset: usize) -> Self {
        FrameIterator {
            cursor: Cursor::new(data, start_offset),
            last_tick: None,
            frame_count: 0,
            finished: false,
        }
    }

    /// Returns the number of frames yielded so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Returns the current byte offset in the buffer.
    #[must_use]
    pub fn current_offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Returns whether iteration is complete.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reads the next frame command and, for packets, the frame body.
    fn parse_next(&mut self) -> Result<Option<Frame>> {
        let offset = self.cursor.offset();
        if self.cursor.is_at_end() {
            return Err(DemoError::corrupt(
                offset,
                "demo ended without a stop command",
            ));
        }

        match self.cursor.u8()? {
            FRAME_STOP => Ok(None),
            FRAME_PACKET => self.parse_packet(offset).map(Some),
            command => Err(DemoError::corrupt(
                offset,
                format!("unknown frame command 0x{command:02X}"),
            )),
        }
    }

    fn parse_packet(&mut self, offset: usize) -> Result<Frame> {
        let tick_offset = self.cursor.offset();
        let tick = self.cursor.u32()?;
        if let Some(last) = self.last_tick {
            if tick <= last {
                return Err(DemoError::corrupt(
                    tick_offset,
                    format!("tick {tick} does not follow tick {last}"),
                ));
            }
        }

        let mut messages = Vec::new();
        loop {
            let kind_offset = self.cursor.offset();
            let kind = self.cursor.u8()?;
            if kind == MESSAGE_END {
                break;
            }
            messages.push(Message::decode(kind, kind_offset, &mut self.cursor)?);
        }

        self.last_tick = Some(tick);
        trace!(tick, messages = messages.len(), "decoded frame");

        Ok(Frame {
            tick,
            messages,
            offset,
        })
    }
}

impl Iterator for FrameIterator<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.parse_next() {
            Ok(Some(frame)) => {
                self.frame_count += 1;
                Some(Ok(frame))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
