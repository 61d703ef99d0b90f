//! The tick-resampling driver producing query records from a demo.
//!
//! [`unspool`] ties the pieces together: it validates its arguments,
//! compiles the query, parses the header, and returns an [`Unspool`]
//! iterator. Pulling from the iterator is the only thing that advances
//! decoding; each pull decodes at most as many frames as needed to produce
//! the next record.
//!
//! # Example
//!
//! ```no_run
//! use demoreel::unspool;
//!
//! let data = std::fs::read("match.dem").unwrap();
//! for record in unspool(&data, "$.players[*][?(@.class != 'other')]", 66)? {
//!     let record = record?;
//!     println!("{} #{}: {:?}", record.tick, record.entity, record.values);
//! }
//! # Ok::<(), demoreel::error::DemoError>(())
//! ```

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DemoError, Result};
use crate::frames::{EntityId, FrameIterator};
use crate::header::{DemoFile, DemoHeader};
use crate::query::Query;
use crate::state::StateTable;
use crate::value::Value;

/// Query selecting every entity of the snapshot.
pub const DEFAULT_JSON_PATH: &str = "$";

/// Sample every tick.
pub const DEFAULT_TICK_FREQ: u32 = 1;

/// Parameters of an unspool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnspoolOptions {
    /// Path query selecting the records.
    pub json_path: String,
    /// Sampling interval in ticks; must be at least 1.
    pub tick_freq: u32,
}

impl Default for UnspoolOptions {
    fn default() -> Self {
        Self {
            json_path: DEFAULT_JSON_PATH.to_owned(),
            tick_freq: DEFAULT_TICK_FREQ,
        }
    }
}

impl UnspoolOptions {
    /// Creates options with the defaults (`"$"`, every tick).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path query.
    #[must_use]
    pub fn json_path(mut self, json_path: impl Into<String>) -> Self {
        self.json_path = json_path.into();
        self
    }

    /// Sets the sampling interval.
    #[must_use]
    pub fn tick_freq(mut self, tick_freq: u32) -> Self {
        self.tick_freq = tick_freq;
        self
    }
}

/// One query match at one sampled tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Sampled tick.
    pub tick: u32,
    /// Matched entity.
    pub entity: EntityId,
    /// Values bound by the query, keyed by path below the entity.
    pub values: BTreeMap<String, Value>,
}

/// Unspools `data` with the given query and sampling interval.
///
/// # Errors
///
/// Fails before any frame is decoded with
/// - `DemoError::InvalidTickFrequency` if `tick_freq` is 0
/// - `DemoError::QuerySyntax` if `json_path` does not compile
/// - `DemoError::InvalidMagic`, `UnsupportedVersion` or `CorruptData` for a
///   bad header
///
/// Errors met while decoding later frames are yielded by the iterator.
pub fn unspool<'a>(data: &'a [u8], json_path: &str, tick_freq: u32) -> Result<Unspool<'a>> {
    if tick_freq < 1 {
        return Err(DemoError::InvalidTickFrequency { value: tick_freq });
    }
    let query = Query::compile(json_path)?;
    let demo = DemoFile::parse(data)?;
    Ok(Unspool::new(&demo, query, tick_freq))
}

/// Unspools `data` with options loaded from configuration.
///
/// # Errors
///
/// See [`unspool`].
pub fn unspool_with<'a>(data: &'a [u8], options: &UnspoolOptions) -> Result<Unspool<'a>> {
    unspool(data, &options.json_path, options.tick_freq)
}

/// Lazy, single-pass stream of [`Record`]s.
///
/// Yields `Err` at most once; after an error or the end of the demo the
/// iterator returns `None`.
pub struct Unspool<'a> {
    header: DemoHeader,
    frames: FrameIterator<'a>,
    table: StateTable,
    query: Query,
    tick_freq: u32,
    /// Tick of the first decoded frame, the origin of the sampling grid.
    first_tick: Option<u32>,
    /// Records of the current sampled frame not yet yielded.
    pending: VecDeque<Record>,
    sampled_ticks: usize,
    finished: bool,
}

impl<'a> Unspool<'a> {
    fn new(demo: &DemoFile<'a>, query: Query, tick_freq: u32) -> Self {
        Self {
            header: demo.header().clone(),
            frames: demo.frames(),
            table: StateTable::new(),
            query,
            tick_freq,
            first_tick: None,
            pending: VecDeque::new(),
            sampled_ticks: 0,
            finished: false,
        }
    }

    /// Returns the demo header.
    #[must_use]
    pub fn header(&self) -> &DemoHeader {
        &self.header
    }

    /// Returns the compiled query.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns the state reconstructed so far.
    #[must_use]
    pub fn state(&self) -> &StateTable {
        &self.table
    }

    /// Number of ticks at which the query was evaluated.
    #[must_use]
    pub fn sampled_ticks(&self) -> usize {
        self.sampled_ticks
    }

    /// Decodes and applies one frame, queueing its records if sampled.
    ///
    /// Returns `Ok(false)` once the demo is exhausted.
    fn advance(&mut self) -> Result<bool> {
        let Some(frame) = self.frames.next().transpose()? else {
            return Ok(false);
        };
        self.table.apply(&frame)?;

        let origin = *self.first_tick.get_or_insert(frame.tick);
        if (frame.tick - origin) % self.tick_freq == 0 {
            self.sampled_ticks += 1;
            let snapshot = self.table.snapshot();
            self.pending
                .extend(self.query.evaluate(&snapshot).into_iter().map(|m| Record {
                    tick: frame.tick,
                    entity: m.entity,
                    values: m.values,
                }));
        }
        Ok(true)
    }
}

impl Iterator for Unspool<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }

            match self.advance() {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    debug!(
                        frames = self.frames.frame_count(),
                        sampled = self.sampled_ticks,
                        "unspool finished"
                    );
                }
                Err(e) => {
                    self.finished = true;
                    debug!(error = %e, "unspool aborted");
                    return Some(Err(e));
                }
            }
        }
    }
}
