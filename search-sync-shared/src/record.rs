//! Record model.
//!
//! Source entities are never inspected through reflection. Anything that
//! should be indexed implements [`Record`] and hands out [`FieldValue`]s for
//! the attribute names a collection definition asks for.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// A value read from a source record.
#[derive(Clone)]
pub enum FieldValue {
    /// The attribute exists but holds no value.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<FieldValue>),
    /// A nested record that further path segments can traverse.
    Object(Arc<dyn Record>),
}

impl FieldValue {
    /// Build a value from a JSON tree. Objects become traversable records.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => Self::Object(Arc::new(value.clone())),
        }
    }

    /// Opaque JSON rendering of the value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(record) => record.to_json(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::DateTime(dt) => write!(f, "DateTime({dt})"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Object(record) => write!(f, "Object({})", record.to_json()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// An entity that can be read attribute by attribute.
///
/// `property` is direct attribute access. `accessor` is the getter-style
/// fallback for values that are computed rather than stored; most records
/// only implement `property`.
pub trait Record: Send + Sync {
    /// Direct attribute access. `None` means the attribute does not exist.
    fn property(&self, name: &str) -> Option<FieldValue>;

    /// Getter-style access, consulted when `property` has nothing.
    fn accessor(&self, _name: &str) -> Option<FieldValue> {
        None
    }

    /// Opaque snapshot of the whole record.
    fn to_json(&self) -> Value;
}

impl Record for Value {
    fn property(&self, name: &str) -> Option<FieldValue> {
        self.as_object()
            .and_then(|map| map.get(name))
            .map(FieldValue::from_json)
    }

    fn to_json(&self) -> Value {
        self.clone()
    }
}
