//! Frame and message decoding for the demo frame stream.
//!
//! After the header, a demo is a sequence of frames. Each packet frame holds
//! a tick index and the messages recorded during that tick:
//!
//! | Size | Type | Field |
//! |------|------|-------|
//! | 1 | u8 | Frame command (0x02 packet, 0x07 stop) |
//! | 4 | u32 LE | Tick index (packet frames only) |
//! | var | messages | `(kind, payload)` pairs |
//! | 1 | u8 | 0x00 terminator |
//!
//! - [`FrameIterator`] - lazy, forward-only frame decoding
//! - [`Message`] - the decoded message variants
//! - [`DemoStats`] - summary statistics over a frame stream

mod message;
mod reader;
mod stats;

pub use message::{
    EntityId, Message, MessageKind, Property, PropertyKey, StringTableEntry,
};
pub use reader::FrameIterator;
pub use stats::DemoStats;

/// All messages recorded for a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Tick index; strictly increasing across frames.
    pub tick: u32,

    /// Messages in recording order.
    pub messages: Vec<Message>,

    /// Byte offset of the frame command in the demo buffer.
    pub offset: usize,
}

impl Frame {
    /// Returns whether this frame carries no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
