//! Entity state and the borrowed per-tick snapshot view.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::frames::EntityId;
use crate::value::Value;

/// Reconstructed state of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    /// Entity identifier.
    pub id: EntityId,

    /// Server class name.
    pub class: String,

    /// Current property values by name.
    pub properties: BTreeMap<String, Value>,
}

impl EntityState {
    /// Creates an entity with no properties.
    #[must_use]
    pub fn new(id: EntityId, class: impl Into<String>) -> Self {
        Self {
            id,
            class: class.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Returns a property by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Read-only view of every tracked entity at one tick.
///
/// The view borrows the state table, so no structural copy is made. Use
/// [`Snapshot::to_owned_entities`] to keep a tick past the next update.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    tick: Option<u32>,
    entities: &'a BTreeMap<EntityId, EntityState>,
}

impl<'a> Snapshot<'a> {
    /// Creates a view over `entities` at `tick`.
    #[must_use]
    pub fn new(tick: Option<u32>, entities: &'a BTreeMap<EntityId, EntityState>) -> Self {
        Self { tick, entities }
    }

    /// Tick of the last applied frame, if any.
    #[must_use]
    pub fn tick(&self) -> Option<u32> {
        self.tick
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a EntityState> {
        self.entities.get(&id)
    }

    /// Iterates entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = &'a EntityState> + 'a {
        self.entities.values()
    }

    /// Copies the current state out of the table.
    #[must_use]
    pub fn to_owned_entities(&self) -> BTreeMap<EntityId, EntityState> {
        self.entities.clone()
    }
}
