//! Record model for scraped listing entries
//!
//! A [`Record`] is a flat mapping of field names to text or numeric values,
//! one per scraped entity (a venue, for instance). Records are validated
//! against a [`RequiredFields`] set and identified by a designated field.

mod schema;
mod value;

pub use schema::{RecordSchema, RequiredFields};
pub use value::{FieldValue, IdentityKey};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scraped entity
///
/// Fields are kept sorted by name so that serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful in tests and fixtures
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field, returning the previous value if one existed
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Returns the value of a field
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns true if the field is present
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates over field names in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the typed identity of this record
    ///
    /// Comparison is exact: no trimming, case folding or other normalization
    /// is applied, and a number never equals text. Returns `None` when the
    /// field is missing or holds empty text.
    pub fn identity(&self, identity_field: &str) -> Option<IdentityKey> {
        self.get(identity_field).and_then(IdentityKey::from_value)
    }

    /// Returns the identity of this record rendered as text
    pub fn identity_key(&self, identity_field: &str) -> Option<String> {
        self.identity(identity_field).map(|key| key.to_string())
    }

    /// Builds a record from a JSON object
    ///
    /// `null` values are treated as absent. Booleans become text, nested
    /// arrays and objects are kept as their compact JSON text.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = object
            .into_iter()
            .filter_map(|(name, value)| FieldValue::from_json(&value).map(|v| (name, v)))
            .collect();
        Self { fields }
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
