//! Named sub-documents of the application data blob.
//!
//! The blob is a JSON object whose top-level keys each belong to one feature module, e.g.
//! `{"sources": {...}, "fastdeploy": {...}}`. Writing one subset leaves the others intact.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Feature-owned section of the application data blob.
pub trait DataSubset: Serialize + DeserializeOwned {
    const NAME: &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSubsetError {
    #[error("application data is not a JSON object")]
    NotAnObject,
    #[error("invalid application data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Return `existing` with the subset's key replaced by `subset`.
pub fn merge_data_subset<S: DataSubset>(
    existing: Option<&str>,
    subset: &S,
) -> Result<String, DataSubsetError> {
    let mut document = parse_document(existing)?;
    document.insert(S::NAME.to_string(), serde_json::to_value(subset)?);
    Ok(serde_json::to_string(&Value::Object(document))?)
}

/// Decode the named subset, `None` when the blob is empty or lacks the key.
pub fn data_subset<S: DataSubset>(data: Option<&str>) -> Result<Option<S>, DataSubsetError> {
    let mut document = parse_document(data)?;
    match document.remove(S::NAME) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

fn parse_document(data: Option<&str>) -> Result<Map<String, Value>, DataSubsetError> {
    let Some(raw) = data.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Map::new());
    };
    match serde_json::from_str(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(DataSubsetError::NotAnObject),
    }
}
