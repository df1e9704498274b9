//! Loading helpers for the static JSON reference data.

use crate::error::EngineError;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Parse a JSON document, tagging errors with where it came from.
pub(crate) fn parse_json<T: DeserializeOwned>(text: &str, source_name: &str) -> Result<T, EngineError> {
    serde_json::from_str(text).map_err(|e| EngineError::TemplateLoad {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Read a JSON document from disk.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EngineError> {
    let source_name = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| EngineError::TemplateLoad {
        source_name: source_name.clone(),
        message: e.to_string(),
    })?;
    parse_json(&text, &source_name)
}

/// Parse a map key into a typed identifier.
pub(crate) fn parse_key<T>(key: &str, source_name: &str) -> Result<T, EngineError>
where
    T: FromStr<Err = String>,
{
    key.parse::<T>().map_err(|message| EngineError::TemplateLoad {
        source_name: source_name.to_string(),
        message,
    })
}

/// Parse a house number key ("1".."12").
pub(crate) fn parse_house_key(key: &str, source_name: &str) -> Result<u8, EngineError> {
    match key.trim().parse::<u8>() {
        Ok(house) if (1..=12).contains(&house) => Ok(house),
        _ => Err(EngineError::TemplateLoad {
            source_name: source_name.to_string(),
            message: format!("Invalid house number: {}", key),
        }),
    }
}
