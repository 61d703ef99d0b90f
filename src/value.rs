//! Typed property values carried by entity updates.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A three-component float vector (positions, angles, velocities).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vector {
    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the component named `x`, `y` or `z`.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<f32> {
        match name {
            "x" => Some(self.x),
            "y" => Some(self.y),
            "z" => Some(self.z),
            _ => None,
        }
    }
}

/// A property value decoded from an entity update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Boolean flag.
    Boolean(bool),
    /// Three-component vector.
    Vector(Vector),
}

/// The variant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Integer`]
    Integer,
    /// [`Value::Float`]
    Float,
    /// [`Value::String`]
    String,
    /// [`Value::Boolean`]
    Boolean,
    /// [`Value::Vector`]
    Vector,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Vector => "vector",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Returns the variant of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Vector(_) => ValueKind::Vector,
        }
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Orders two values of compatible variants.
    ///
    /// Integers and floats are compared numerically with each other,
    /// strings lexicographically and booleans with `false < true`.
    /// Returns `None` for any other pairing, and for NaN.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Vector(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vector> for Value {
    fn from(value: Vector) -> Self {
        Value::Vector(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cross_compare() {
        assert_eq!(
            Value::Integer(3).compare(&Value::Float(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Float(3.0).compare(&Value::Integer(3)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_mismatched_variants_do_not_compare() {
        assert_eq!(Value::from("3").compare(&Value::Integer(3)), None);
        assert_eq!(Value::Boolean(true).compare(&Value::Integer(1)), None);
        let v = Value::Vector(Vector::default());
        assert_eq!(v.compare(&v), None);
        assert_eq!(Value::Float(f64::NAN).compare(&Value::Float(1.0)), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Value::from(true).kind().to_string(), "boolean");
        assert_eq!(Value::from(Vector::new(1.0, 2.0, 3.0)).kind(), ValueKind::Vector);
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&Value::from(Vector::new(1.0, 0.5, -2.0))).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":0.5,"z":-2.0}"#);
        assert_eq!(serde_json::to_string(&Value::from("scout")).unwrap(), "\"scout\"");
        assert_eq!(serde_json::to_string(&Value::Integer(-4)).unwrap(), "-4");
    }

    #[test]
    fn test_vector_component() {
        let v = Vector::new(1.0, 2.0, 3.0);
        assert_eq!(v.component("y"), Some(2.0));
        assert_eq!(v.component("w"), None);
    }
}
