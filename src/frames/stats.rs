//! Summary statistics over a frame stream.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{FrameIterator, Message, MessageKind};
use crate::error::Result;

/// Summary statistics from frame iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemoStats {
    /// Total number of frames.
    pub frame_count: usize,

    /// Tick of the first frame.
    pub first_tick: Option<u32>,

    /// Tick of the last frame.
    pub last_tick: Option<u32>,

    /// Number of messages seen per kind.
    pub message_counts: BTreeMap<MessageKind, usize>,

    /// Payload bytes of unmodelled messages that were skipped.
    pub skipped_bytes: u64,
}

impl DemoStats {
    /// Calculates statistics by draining a frame iterator.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error encountered.
    pub fn from_frames(iter: FrameIterator<'_>) -> Result<Self> {
        let mut stats = DemoStats::default();

        for frame in iter {
            let frame = frame?;
            stats.frame_count += 1;
            stats.first_tick.get_or_insert(frame.tick);
            stats.last_tick = Some(frame.tick);

            for message in &frame.messages {
                *stats.message_counts.entry(message.kind()).or_default() += 1;
                if let Message::Other { length, .. } = message {
                    stats.skipped_bytes += u64::from(*length);
                }
            }
        }

        Ok(stats)
    }

    /// Returns how many messages of `kind` were decoded.
    #[must_use]
    pub fn count(&self, kind: MessageKind) -> usize {
        self.message_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Returns the number of ticks between the first and last frame, inclusive.
    ///
    /// Widened to `u64` so a span over the whole tick range does not overflow.
    #[must_use]
    pub fn tick_span(&self) -> u64 {
        match (self.first_tick, self.last_tick) {
            (Some(first), Some(last)) => u64::from(last - first) + 1,
            _ => 0,
        }
    }
}
