//! Stable configuration hashing for run provenance.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use scint_core::errors::{ErrorInfo, SimError};

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key
/// ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SimError> {
    let value = serde_json::to_value(value).map_err(|err| {
        SimError::Serde(ErrorInfo::new("json-serialize", err.to_string()))
    })?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| {
        SimError::Serde(ErrorInfo::new("json-write", err.to_string()))
    })?;
    Ok(bytes)
}

/// Computes a stable hexadecimal digest of a serializable value. Equal
/// configurations hash equal regardless of map iteration order.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, SimError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
