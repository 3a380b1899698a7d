//! The value tree carried by every event.
//!
//! This module provides:
//!
//! - **[`Payload`]**: a closed tagged union of primitives, lists, keyed maps,
//!   named records and shared references.
//! - **[`Data`]**: the string-keyed map used for event data and ambient logger data.
//! - **[`ToPayload`]**: the explicit conversion step from application values into
//!   a payload. Decomposing a custom type happens here, once, at record assembly,
//!   so the walker never needs to inspect arbitrary types.
//!
//! Payloads are owned trees. `Shared` holds an `Arc` without interior mutability,
//! so a payload can never reference itself and every traversal terminates.

mod convert;
mod data;

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Number, Value as JsonValue};

pub use convert::ToPayload;
pub use data::Data;

/// Error converting a serializable value into [`Data`].
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("expected a value that serializes as an object, found {found}")]
    NotAnObject { found: &'static str },
}

// =============================================================================
// Payload - the recursive value type
// =============================================================================

/// A node of an event payload tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Payload>),
    Map(Data),
    Record(Record),
    /// Pointer-like wrapper. Transforms walk the pointee and only allocate a new
    /// `Arc` when something inside changed.
    Shared(Arc<Payload>),
}

impl Payload {
    /// Returns the string contents when this node is a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::String(value) => Some(value),
            Payload::Shared(inner) => inner.as_str(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Payload::Null)
    }

    /// Returns `true` for nodes the walker treats as leaves.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Payload::Null | Payload::Bool(_) | Payload::Number(_) | Payload::String(_)
        )
    }

    /// Short name of the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Null => "null",
            Payload::Bool(_) => "boolean",
            Payload::Number(_) => "number",
            Payload::String(_) => "string",
            Payload::List(_) => "list",
            Payload::Map(_) => "map",
            Payload::Record(_) => "record",
            Payload::Shared(inner) => inner.kind(),
        }
    }

    /// Converts the payload into a `serde_json::Value`, flattening records into
    /// objects and shared references into their pointee.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Payload::Null => JsonValue::Null,
            Payload::Bool(value) => JsonValue::Bool(*value),
            Payload::Number(value) => JsonValue::Number(value.clone()),
            Payload::String(value) => JsonValue::String(value.clone()),
            Payload::List(items) => JsonValue::Array(items.iter().map(Payload::to_json).collect()),
            Payload::Map(data) => JsonValue::Object(
                data.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Payload::Record(record) => JsonValue::Object(
                record
                    .fields()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Payload::Shared(inner) => inner.to_json(),
        }
    }
}

impl From<JsonValue> for Payload {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Payload::Null,
            JsonValue::Bool(value) => Payload::Bool(value),
            JsonValue::Number(value) => Payload::Number(value),
            JsonValue::String(value) => Payload::String(value),
            JsonValue::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            JsonValue::Object(map) => Payload::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Payload::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Data> for Payload {
    fn from(data: Data) -> Self {
        Payload::Map(data)
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Payload::Record(record)
    }
}

impl From<Arc<Payload>> for Payload {
    fn from(shared: Arc<Payload>) -> Self {
        Payload::Shared(shared)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::Null => serializer.serialize_unit(),
            Payload::Bool(value) => serializer.serialize_bool(*value),
            Payload::Number(value) => value.serialize(serializer),
            Payload::String(value) => serializer.serialize_str(value),
            Payload::List(items) => serializer.collect_seq(items),
            Payload::Map(data) => data.serialize(serializer),
            Payload::Record(record) => record.serialize(serializer),
            Payload::Shared(inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Payload::from)
    }
}

// =============================================================================
// Record - named fields of a struct-like value
// =============================================================================

/// A struct-like value: a type name plus named fields in declaration order.
///
/// Records are produced by `#[derive(ToPayload)]` and serialize as JSON objects.
/// The type name is not part of the serialized form.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    name: String,
    fields: Vec<(String, Payload)>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Rebuilds a record from a name and an already-ordered field list.
    pub fn from_parts(name: impl Into<String>, fields: Vec<(String, Payload)>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Payload>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, Payload)] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&Payload> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::{Data, Payload, Record};

    #[test]
    fn json_round_trip_preserves_structure() {
        let value = json!({"a": [1, "two", null], "b": {"c": true}});
        let payload = Payload::from(value.clone());
        assert_eq!(payload.to_json(), value);
        assert_eq!(serde_json::to_value(&payload).unwrap(), value);
    }

    #[test]
    fn record_serializes_as_object_in_field_order() {
        let record = Record::new("Credentials")
            .field("user", Payload::String("alice".into()))
            .field("port", Payload::Number(8080.into()));
        let encoded = serde_json::to_string(&Payload::Record(record)).unwrap();
        assert_eq!(encoded, r#"{"user":"alice","port":8080}"#);
    }

    #[test]
    fn shared_serializes_as_pointee() {
        let shared = Payload::Shared(Arc::new(Payload::String("inner".into())));
        assert_eq!(serde_json::to_string(&shared).unwrap(), r#""inner""#);
        assert_eq!(shared.as_str(), Some("inner"));
        assert_eq!(shared.kind(), "string");
    }

    #[test]
    fn record_field_lookup() {
        let record = Record::new("Pair").field("left", Payload::Bool(true));
        assert_eq!(record.get("left"), Some(&Payload::Bool(true)));
        assert_eq!(record.get("right"), None);
        assert_eq!(record.name(), "Pair");
    }

    #[test]
    fn deserializes_from_json_text() {
        let payload: Payload = serde_json::from_str(r#"{"k":"v"}"#).unwrap();
        assert_eq!(payload, Payload::Map(Data::new().with("k", "v")));
    }
}
