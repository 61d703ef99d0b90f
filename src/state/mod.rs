//! Incremental reconstruction of entity state from decoded frames.
//!
//! A [`StateTable`] is created per unspool call and mutated in place as
//! frames are applied. It owns every cache the stream refers to (string
//! tables, observed property types), so independent calls never share state.
//!
//! # Example
//!
//! ```no_run
//! use demoreel::header::DemoFile;
//! use demoreel::state::StateTable;
//!
//! let data = std::fs::read("match.dem").unwrap();
//! let demo = DemoFile::parse(&data)?;
//! let mut table = StateTable::new();
//! for frame in demo.frames() {
//!     table.apply(&frame?)?;
//!     println!("{} entities", table.snapshot().len());
//! }
//! # Ok::<(), demoreel::error::DemoError>(())
//! ```

mod snapshot;
mod string_table;

pub use snapshot::{EntityState, Snapshot};
pub use string_table::StringTables;

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{DemoError, Result};
use crate::format::PROPERTY_NAME_TABLE;
use crate::frames::{EntityId, Frame, Message, Property, PropertyKey};
use crate::value::{Value, ValueKind};

/// Current entity state plus the caches needed to decode updates.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    /// Tracked entities by id.
    entities: BTreeMap<EntityId, EntityState>,

    /// First observed variant per class and property.
    property_kinds: HashMap<String, HashMap<String, ValueKind>>,

    /// String tables written by the stream.
    string_tables: StringTables,

    /// Tick of the last applied frame.
    tick: Option<u32>,

    /// Number of user commands seen.
    user_command_count: u64,
}

impl StateTable {
    /// Creates an empty state table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every message of `frame` in order.
    ///
    /// # Errors
    ///
    /// - `DemoError::CorruptData` for a delta addressing an unknown entity or
    ///   an interned property name missing from the name table
    /// - `DemoError::PropertyTypeMismatch` if a property changes variant
    pub fn apply(&mut self, frame: &Frame) -> Result<()> {
        for message in &frame.messages {
            self.apply_message(message, frame.offset)?;
        }
        self.tick = Some(frame.tick);
        Ok(())
    }

    fn apply_message(&mut self, message: &Message, offset: usize) -> Result<()> {
        match message {
            Message::EntityBaseline {
                entity,
                class,
                properties,
            } => {
                let mut state = EntityState::new(*entity, class.as_str());
                for property in properties {
                    let name = resolve_key(&self.string_tables, property, offset)?;
                    check_kind(&mut self.property_kinds, class, &name, &property.value)?;
                    state.properties.insert(name, property.value.clone());
                }
                self.entities.insert(*entity, state);
            }
            Message::EntityDelta { entity, properties } => {
                let Some(state) = self.entities.get_mut(entity) else {
                    return Err(DemoError::corrupt(
                        offset,
                        format!("delta for unknown entity {entity}"),
                    ));
                };
                for property in properties {
                    let name = resolve_key(&self.string_tables, property, offset)?;
                    check_kind(
                        &mut self.property_kinds,
                        &state.class,
                        &name,
                        &property.value,
                    )?;
                    state.properties.insert(name, property.value.clone());
                }
            }
            Message::EntityRemove { entity } => {
                if self.entities.remove(entity).is_none() {
                    debug!(entity, "remove for untracked entity ignored");
                }
            }
            Message::StringTableUpdate { table, entries } => {
                self.string_tables.update(table, entries);
            }
            Message::UserCommand { .. } => {
                self.user_command_count += 1;
            }
            Message::Other { .. } => {}
        }
        Ok(())
    }

    /// Returns a read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(self.tick, &self.entities)
    }

    /// Returns the string tables written so far.
    #[must_use]
    pub fn string_tables(&self) -> &StringTables {
        &self.string_tables
    }

    /// Tick of the last applied frame.
    #[must_use]
    pub fn tick(&self) -> Option<u32> {
        self.tick
    }

    /// Number of user commands applied.
    #[must_use]
    pub fn user_command_count(&self) -> u64 {
        self.user_command_count
    }
}

/// Resolves a property key to its name.
fn resolve_key(tables: &StringTables, property: &Property, offset: usize) -> Result<String> {
    match &property.key {
        PropertyKey::Name(name) => Ok(name.clone()),
        PropertyKey::Interned(index) => tables
            .get(PROPERTY_NAME_TABLE, *index)
            .map(str::to_owned)
            .ok_or_else(|| {
                DemoError::corrupt(
                    offset,
                    format!("property name index {index} not in {PROPERTY_NAME_TABLE}"),
                )
            }),
    }
}

/// Records the variant of `class.name` or rejects a change of variant.
fn check_kind(
    kinds: &mut HashMap<String, HashMap<String, ValueKind>>,
    class: &str,
    name: &str,
    value: &Value,
) -> Result<()> {
    let found = value.kind();
    match kinds.get(class).and_then(|class_kinds| class_kinds.get(name)) {
        Some(&expected) if expected != found => Err(DemoError::PropertyTypeMismatch {
            class: class.to_owned(),
            property: name.to_owned(),
            expected,
            found,
        }),
        Some(_) => Ok(()),
        None => {
            kinds
                .entry(class.to_owned())
                .or_default()
                .insert(name.to_owned(), found);
            Ok(())
        }
    }
}
