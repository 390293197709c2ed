//! Log entries
//!
//! An `Entry` is one structured record: a map of string keys to JSON values
//! that remembers insertion order. Order is preserved through serialization,
//! so the wire form reads in the order keys were added and aggregation
//! metadata appended by a broker always lands last.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::tensor::Tensor;
use crate::Result;

/// One structured log record
///
/// Entries are built by the producer, handed to a logger, and treated as
/// immutable from then on. Values are arbitrary JSON; fixed-width numeric
/// arrays go in through [`Entry::insert_tensor`] using the tagged encoding
/// described in the `tensor` module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry {
    fields: Map<String, Value>,
}

impl Entry {
    /// Create an empty entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value for the key if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Insert a numeric array under the tagged encoding
    pub fn insert_tensor(&mut self, key: impl Into<String>, tensor: &Tensor) -> Option<Value> {
        self.fields.insert(key.into(), tensor.to_value())
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Decode the numeric array stored under `key`
    ///
    /// Fails when the key is missing or its value is not a tagged array.
    pub fn tensor(&self, key: &str) -> Result<Tensor> {
        let value = self
            .fields
            .get(key)
            .ok_or_else(|| ProtocolError::array(format!("no field named {key:?}")))?;
        Tensor::from_value(value)
    }

    /// Remove a value by key
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Whether the entry has a value for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entry has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Serialize to the wire encoding (compact JSON object)
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.fields)?)
    }

    /// Parse an entry from its wire encoding
    ///
    /// Anything other than a JSON object is rejected.
    pub fn from_wire(wire: &str) -> Result<Self> {
        Ok(serde_json::from_str(wire)?)
    }
}

impl From<Map<String, Value>> for Entry {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
