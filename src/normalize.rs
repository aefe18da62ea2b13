//! Shape detection for manager responses.
//!
//! The manager answers either with a bare JSON array of results or with an
//! object that carries the array under one of a few conventional keys.

use serde_json::Value;

/// Keys checked on an object body, in priority order. When several are present
/// the earliest array-typed one wins.
pub const CANDIDATE_KEYS: [&str; 6] = ["results", "data", "items", "hits", "documents", "docs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// The body itself is the result list.
    Sequence,
    /// The body is an object holding the result list under `key`.
    KeyedMapping { key: &'static str },
    Unrecognized,
}

pub fn classify(body: &Value) -> ResponseShape {
    match body {
        Value::Array(_) => ResponseShape::Sequence,
        Value::Object(map) => CANDIDATE_KEYS
            .iter()
            .find(|key| matches!(map.get(**key), Some(Value::Array(_))))
            .map(|key| ResponseShape::KeyedMapping { key: *key })
            .unwrap_or(ResponseShape::Unrecognized),
        _ => ResponseShape::Unrecognized,
    }
}

/// Extract the ordered result list from a manager response body.
pub fn normalize(body: Value) -> Vec<Value> {
    match (classify(&body), body) {
        (ResponseShape::Sequence, Value::Array(items)) => items,
        (ResponseShape::KeyedMapping { key }, Value::Object(mut map)) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
