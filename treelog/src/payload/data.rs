//! String-keyed event data.

use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{Payload, PayloadError, ToPayload};

/// Keyed event data attached to a record or carried by a logger.
///
/// Keys are kept sorted, so serialized output is deterministic regardless of
/// insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Data(BTreeMap<String, Payload>);

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key` and returns `self`, for building data inline.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToPayload) -> Self {
        self.0.insert(key.into(), value.to_payload());
        self
    }

    /// Converts any serializable value into data through `serde_json`.
    ///
    /// The value must serialize as a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, PayloadError> {
        match serde_json::to_value(value)? {
            JsonValue::Object(map) => Ok(map
                .into_iter()
                .map(|(key, value)| (key, Payload::from(value)))
                .collect()),
            other => Err(PayloadError::NotAnObject {
                found: Payload::from(other).kind(),
            }),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToPayload) -> Option<Payload> {
        self.0.insert(key.into(), value.to_payload())
    }

    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Payload> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Payload> {
        self.0.iter()
    }

    /// Copies every entry of `other` into `self`. Keys in `other` win.
    pub fn merge(&mut self, other: Data) {
        self.0.extend(other.0);
    }

    /// Returns a new map with `other` layered over `self`.
    #[must_use]
    pub fn merged(&self, other: &Data) -> Data {
        let mut out = self.clone();
        out.0
            .extend(other.iter().map(|(key, value)| (key.clone(), value.clone())));
        out
    }
}

impl FromIterator<(String, Payload)> for Data {
    fn from_iter<I: IntoIterator<Item = (String, Payload)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, Payload)> for Data {
    fn extend<I: IntoIterator<Item = (String, Payload)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Data {
    type Item = (String, Payload);
    type IntoIter = btree_map::IntoIter<String, Payload>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Data {
    type Item = (&'a String, &'a Payload);
    type IntoIter = btree_map::Iter<'a, String, Payload>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
