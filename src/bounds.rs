//! Change-only sampling of one entity class.
//!
//! Where [`unspool`](crate::unspool()) samples on a fixed tick grid,
//! [`bounds`] records an entity only at the ticks where its properties
//! differ from the last state recorded for it. Slowly changing entities such
//! as the map `world` shrink to a handful of records.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::Result;
use crate::frames::EntityId;
use crate::header::DemoFile;
use crate::state::StateTable;
use crate::unspool::Record;
use crate::value::Value;

/// Class holding the map-wide state.
pub const WORLD_CLASS: &str = "world";

/// Lists every distinct state of the entities of `class`, in tick order.
///
/// An entity is recorded at its first tick and again whenever any of its
/// properties change. Removal does not produce a record; an entity that
/// reappears is recorded only if its state differs from the last record.
///
/// # Errors
///
/// Returns header, frame decoding and state reconstruction errors.
pub fn bounds(data: &[u8], class: &str) -> Result<Vec<Record>> {
    let demo = DemoFile::parse(data)?;
    let mut table = StateTable::new();
    let mut recorded: HashMap<EntityId, BTreeMap<String, Value>> = HashMap::new();
    let mut changes = Vec::new();

    for frame in demo.frames() {
        let frame = frame?;
        table.apply(&frame)?;

        for entity in table.snapshot().entities().filter(|e| e.class == class) {
            if recorded.get(&entity.id) == Some(&entity.properties) {
                continue;
            }
            recorded.insert(entity.id, entity.properties.clone());
            changes.push(Record {
                tick: frame.tick,
                entity: entity.id,
                values: entity.properties.clone(),
            });
        }
    }

    debug!(class, changes = changes.len(), "bounds collected");
    Ok(changes)
}
