//! Message payload decoding.
//!
//! | Kind | Message | Payload |
//! |------|---------|---------|
//! | 0x01 | `EntityBaseline` | id u32, class string, count u16, properties |
//! | 0x02 | `EntityDelta` | id u32, count u16, properties |
//! | 0x03 | `EntityRemove` | id u32 |
//! | 0x04 | `StringTableUpdate` | table string, count u16, (index u16, text string)* |
//! | 0x05 | `UserCommand` | sequence u32, len u16, bytes |
//! | 0x80+ | `Other` | len u32, bytes (skipped) |

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::binary::Cursor;
use crate::error::{DemoError, Result};
use crate::format::LENGTH_PREFIXED_KINDS;
use crate::value::{Value, Vector};

/// Entity identifier, unique within a snapshot.
pub type EntityId = u32;

const KIND_BASELINE: u8 = 0x01;
const KIND_DELTA: u8 = 0x02;
const KIND_REMOVE: u8 = 0x03;
const KIND_STRING_TABLE: u8 = 0x04;
const KIND_USER_COMMAND: u8 = 0x05;

const KEY_INLINE: u8 = 0x00;
const KEY_INTERNED: u8 = 0x01;

const VALUE_INTEGER: u8 = 0x00;
const VALUE_FLOAT: u8 = 0x01;
const VALUE_STRING: u8 = 0x02;
const VALUE_BOOLEAN: u8 = 0x03;
const VALUE_VECTOR: u8 = 0x04;

/// How a property is named on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    /// Name spelled out in the message.
    Name(String),
    /// Index into the property name string table.
    Interned(u16),
}

/// A single property assignment inside a baseline or delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name or interned reference.
    pub key: PropertyKey,
    /// New value.
    pub value: Value,
}

/// One entry of a string table update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTableEntry {
    /// Slot index within the table.
    pub index: u16,
    /// Entry text.
    pub text: String,
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Full property set for an entity.
    EntityBaseline {
        /// Target entity.
        entity: EntityId,
        /// Entity class name.
        class: String,
        /// Complete property list.
        properties: Vec<Property>,
    },

    /// Partial update of an existing entity.
    EntityDelta {
        /// Target entity.
        entity: EntityId,
        /// Changed properties only.
        properties: Vec<Property>,
    },

    /// Entity left the game.
    EntityRemove {
        /// Removed entity.
        entity: EntityId,
    },

    /// Entries written to a named string table.
    StringTableUpdate {
        /// Table name.
        table: String,
        /// Entries in update order.
        entries: Vec<StringTableEntry>,
    },

    /// Recorded player input.
    UserCommand {
        /// Command sequence number.
        sequence: u32,
        /// Opaque command payload.
        data: Vec<u8>,
    },

    /// A length-prefixed message the decoder does not model.
    Other {
        /// Raw kind byte.
        kind: u8,
        /// Number of payload bytes skipped.
        length: u32,
    },
}

/// Payload-free discriminant of [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MessageKind {
    /// [`Message::EntityBaseline`]
    EntityBaseline,
    /// [`Message::EntityDelta`]
    EntityDelta,
    /// [`Message::EntityRemove`]
    EntityRemove,
    /// [`Message::StringTableUpdate`]
    StringTableUpdate,
    /// [`Message::UserCommand`]
    UserCommand,
    /// [`Message::Other`]
    Other,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::EntityBaseline => "baseline",
            MessageKind::EntityDelta => "delta",
            MessageKind::EntityRemove => "remove",
            MessageKind::StringTableUpdate => "string table",
            MessageKind::UserCommand => "user command",
            MessageKind::Other => "other",
        };
        f.pad(name)
    }
}

impl Message {
    /// Returns the kind of this message.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::EntityBaseline { .. } => MessageKind::EntityBaseline,
            Message::EntityDelta { .. } => MessageKind::EntityDelta,
            Message::EntityRemove { .. } => MessageKind::EntityRemove,
            Message::StringTableUpdate { .. } => MessageKind::StringTableUpdate,
            Message::UserCommand { .. } => MessageKind::UserCommand,
            Message::Other { .. } => MessageKind::Other,
        }
    }

    /// Decodes the payload of a message whose kind byte was just read.
    ///
    /// `kind_offset` is the position of the kind byte, used for error
    /// reporting.
    ///
    /// # Errors
    ///
    /// - `DemoError::CorruptData` for unknown kinds without a length prefix,
    ///   unknown key or value tags, and invalid booleans
    /// - `DemoError::UnexpectedEof` if the payload is truncated
    pub(crate) fn decode(kind: u8, kind_offset: usize, cursor: &mut Cursor<'_>) -> Result<Self> {
        match kind {
            KIND_BASELINE => {
                let entity = cursor.u32()?;
                let class = cursor.string()?;
                let properties = decode_properties(cursor)?;
                Ok(Message::EntityBaseline {
                    entity,
                    class,
                    properties,
                })
            }
            KIND_DELTA => {
                let entity = cursor.u32()?;
                let properties = decode_properties(cursor)?;
                Ok(Message::EntityDelta { entity, properties })
            }
            KIND_REMOVE => Ok(Message::EntityRemove {
                entity: cursor.u32()?,
            }),
            KIND_STRING_TABLE => {
                let table = cursor.string()?;
                let count = cursor.u16()?;
                let mut entries = Vec::with_capacity(usize::from(count).min(cursor.remaining()));
                for _ in 0..count {
                    let index = cursor.u16()?;
                    let text = cursor.string()?;
                    entries.push(StringTableEntry { index, text });
                }
                Ok(Message::StringTableUpdate { table, entries })
            }
            KIND_USER_COMMAND => {
                let sequence = cursor.u32()?;
                let len = usize::from(cursor.u16()?);
                let data = cursor.bytes(len)?.to_vec();
                Ok(Message::UserCommand { sequence, data })
            }
            kind if kind >= LENGTH_PREFIXED_KINDS => {
                let length = cursor.u32()?;
                let len = usize::try_from(length)
                    .map_err(|_| DemoError::corrupt(kind_offset, "message length overflow"))?;
                cursor.skip(len)?;
                trace!(kind, length, "skipped unmodelled message");
                Ok(Message::Other { kind, length })
            }
            kind => Err(DemoError::corrupt(
                kind_offset,
                format!("unknown message kind 0x{kind:02X} without length prefix"),
            )),
        }
    }
}

fn decode_properties(cursor: &mut Cursor<'_>) -> Result<Vec<Property>> {
    let count = cursor.u16()?;
    let mut properties = Vec::with_capacity(usize::from(count).min(cursor.remaining()));
    for _ in 0..count {
        let key = decode_key(cursor)?;
        let value = decode_value(cursor)?;
        properties.push(Property { key, value });
    }
    Ok(properties)
}

fn decode_key(cursor: &mut Cursor<'_>) -> Result<PropertyKey> {
    let offset = cursor.offset();
    match cursor.u8()? {
        KEY_INLINE => Ok(PropertyKey::Name(cursor.string()?)),
        KEY_INTERNED => Ok(PropertyKey::Interned(cursor.u16()?)),
        tag => Err(DemoError::corrupt(
            offset,
            format!("unknown property key tag 0x{tag:02X}"),
        )),
    }
}

fn decode_value(cursor: &mut Cursor<'_>) -> Result<Value> {
    let offset = cursor.offset();
    match cursor.u8()? {
        VALUE_INTEGER => Ok(Value::Integer(i64::from(cursor.i32()?))),
        VALUE_FLOAT => Ok(Value::Float(f64::from(cursor.f32()?))),
        VALUE_STRING => Ok(Value::String(cursor.string()?)),
        VALUE_BOOLEAN => match cursor.u8()? {
            0 => Ok(Value::Boolean(false)),
            1 => Ok(Value::Boolean(true)),
            b => Err(DemoError::corrupt(
                offset + 1,
                format!("invalid boolean byte 0x{b:02X}"),
            )),
        },
        VALUE_VECTOR => {
            let x = cursor.f32()?;
            let y = cursor.f32()?;
            let z = cursor.f32()?;
            Ok(Value::Vector(Vector::new(x, y, z)))
        }
        tag => Err(DemoError::corrupt(
            offset,
            format!("unknown value tag 0x{tag:02X}"),
        )),
    }
}
