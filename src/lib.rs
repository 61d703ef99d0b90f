//! # demoreel
//!
//! Unspools match replay recordings ("demo" files) into per-tick entity
//! records selected by a small path query language.
//!
//! ## Quick Start
//!
//! ```no_run
//! use demoreel::error::Result;
//!
//! fn living_players(data: &[u8]) -> Result<()> {
//!     let records = demoreel::unspool(data, "$.players[*][?(@.health > 0)]", 1)?;
//!     for record in records {
//!         let record = record?;
//!         println!("tick {} player {}: {:?}", record.tick, record.entity, record.values);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types, taxonomy and result alias
//! - [`binary`] - Low-level little-endian reading utilities
//! - [`format`] - Magic/version validation and wire constants
//! - [`header`] - Demo header parsing
//! - [`frames`] - Lazy frame and message decoding
//! - [`state`] - Incremental entity state reconstruction
//! - [`query`] - Path query compiler and evaluator
//! - [`unspool`](mod@unspool) - Tick resampling driver
//! - [`roster`](mod@roster) - Player roster extraction
//! - [`bounds`](mod@bounds) - Change-only sampling of one entity class
//!
//! All multi-byte integers are stored in little-endian byte order.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod binary;
pub mod bounds;
pub mod error;
pub mod format;
pub mod frames;
pub mod header;
pub mod query;
pub mod roster;
pub mod state;
pub mod unspool;
pub mod value;

// Re-export commonly used types at the crate root
pub use bounds::bounds;
pub use error::{DemoError, ErrorKind, Result};
pub use frames::{DemoStats, EntityId, Frame, FrameIterator, Message};
pub use header::{DemoFile, DemoHeader};
pub use query::{Match, Query, Step};
pub use roster::{roster, Profile};
pub use state::{EntityState, Snapshot, StateTable};
pub use unspool::{unspool, unspool_with, Record, Unspool, UnspoolOptions};
pub use value::{Value, ValueKind, Vector};
