use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value: either text or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Converts a JSON value into a field value
    ///
    /// Returns `None` for `null`, which callers treat as an absent field.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Some(Self::Text(value.to_string())),
        }
    }

    /// Returns the text value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Returns the numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            // Integral values render without a trailing ".0"
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

/// Typed identity of a record, used for duplicate detection
///
/// Text and numbers never compare equal, even when they render alike:
/// `7` and `"7"` are distinct identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Text(String),
    /// Bit pattern of the value, with `-0.0` folded into `0.0`
    Number(u64),
}

impl IdentityKey {
    /// Returns the identity of a field value, or `None` for empty text
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(s) if s.is_empty() => None,
            FieldValue::Text(s) => Some(Self::Text(s.clone())),
            FieldValue::Number(n) if *n == 0.0 => Some(Self::Number(0f64.to_bits())),
            FieldValue::Number(n) => Some(Self::Number(n.to_bits())),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(bits) => write!(f, "{}", FieldValue::Number(f64::from_bits(*bits))),
        }
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
