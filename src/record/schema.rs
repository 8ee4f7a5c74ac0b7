use crate::config::RecordConfig;
use crate::record::Record;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

/// Ordered set of field names every accepted record must carry
///
/// Insertion order is preserved (it becomes the CSV column order) and
/// duplicate names are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields {
    names: Vec<String>,
}

impl RequiredFields {
    /// Creates a required-field set from any list of names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = Self::default();
        for name in names {
            let name = name.into();
            if !fields.contains(&name) {
                fields.names.push(name);
            }
        }
        fields
    }

    /// Iterates over the field names in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns true if the record carries every required field
    pub fn is_satisfied_by(&self, record: &Record) -> bool {
        self.iter().all(|name| record.contains(name))
    }

    /// Lists the required fields the record is missing
    pub fn missing_from<'a>(&'a self, record: &Record) -> Vec<&'a str> {
        self.iter().filter(|name| !record.contains(name)).collect()
    }
}

/// Field layout of the records a crawl produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    /// Field whose value identifies a record for deduplication
    pub identity_field: String,

    /// Fields every accepted record must carry
    pub required: RequiredFields,

    /// Fields the extractor should emit as numbers rather than text
    pub numeric: BTreeSet<String>,
}

impl RecordSchema {
    /// Builds the schema from the `[record]` configuration section
    pub fn from_config(config: &RecordConfig) -> Self {
        Self {
            identity_field: config.identity_field.clone(),
            required: RequiredFields::new(config.required_fields.iter().cloned()),
            numeric: config.numeric_fields.iter().cloned().collect(),
        }
    }

    /// JSON schema describing an array of records, handed to the LLM
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for name in self.required.iter() {
            let kind = if self.numeric.contains(name) {
                "number"
            } else {
                "string"
            };
            properties.insert(name.to_string(), json!({ "type": kind }));
        }

        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": properties,
                "required": self.required.iter().collect::<Vec<_>>(),
            }
        })
    }

    /// Column order for tabular output: required fields first, then any
    /// extra fields seen in `records`, sorted by name
    pub fn column_order(&self, records: &[Record]) -> Vec<String> {
        let extras: BTreeSet<&str> = records
            .iter()
            .flat_map(Record::field_names)
            .filter(|name| !self.required.contains(name))
            .collect();

        self.required
            .iter()
            .map(str::to_string)
            .chain(extras.into_iter().map(str::to_string))
            .collect()
    }
}
