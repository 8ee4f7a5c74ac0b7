//! Parsing of LLM completion text into records

use crate::extraction::ExtractionError;
use crate::record::Record;
use serde_json::{Map, Value};

/// Parses the text of a completion into records
///
/// Accepted shapes:
/// - a JSON array of objects
/// - an object wrapping such an array (its only field, or an array field
///   holding only objects)
/// - a single object, taken as one record
///
/// Reasoning preambles (`<think>...</think>`) and markdown code fences are
/// stripped first. Array entries that are not objects are skipped. An
/// `"error": false` marker on an entry is removed.
pub fn parse_records(content: &str) -> Result<Vec<Record>, ExtractionError> {
    let body = strip_code_fence(strip_reasoning(content));

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        // Models sometimes wrap the array in prose
        Err(e) => match bracketed_array(body) {
            Some(slice) => serde_json::from_str(slice)
                .map_err(|e| ExtractionError::Parse(e.to_string()))?,
            None => return Err(ExtractionError::Parse(e.to_string())),
        },
    };

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut object) => {
            match wrapper_key(&object).and_then(|key| object.remove(&key)) {
                Some(Value::Array(entries)) => entries,
                _ => vec![Value::Object(object)],
            }
        }
        other => {
            return Err(ExtractionError::Parse(format!(
                "expected a JSON array or object, got {}",
                other
            )));
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(mut object) => {
                if object.get("error") == Some(&Value::Bool(false)) {
                    object.remove("error");
                }
                Some(Record::from_json_object(object))
            }
            _ => None,
        })
        .collect())
}

/// Finds the field of an object that wraps the record array
///
/// A lone array field is always the wrapper. Otherwise the wrapper is the
/// first array field holding only objects; an object whose arrays hold
/// plain values (a list of amenities, say) is a record itself.
fn wrapper_key(object: &Map<String, Value>) -> Option<String> {
    if object.len() == 1 {
        return object
            .iter()
            .find(|(_, v)| v.is_array())
            .map(|(k, _)| k.clone());
    }

    object
        .iter()
        .find(|(_, v)| match v {
            Value::Array(entries) => {
                !entries.is_empty() && entries.iter().all(Value::is_object)
            }
            _ => false,
        })
        .map(|(k, _)| k.clone())
}

fn strip_reasoning(content: &str) -> &str {
    match content.find("</think>") {
        Some(end) => &content[end + "</think>".len()..],
        None => content,
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn bracketed_array(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    (end > start).then(|| &content[start..=end])
}
