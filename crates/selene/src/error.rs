use crate::ephemeris::EphemerisError;
use thiserror::Error;

/// Errors surfaced by the engine's public operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown timezone: {name}")]
    InvalidTimezone { name: String },
    #[error("Missing required field: {field}")]
    MissingField { field: String },
    #[error("Ephemeris failure: {message}")]
    EphemerisFailure { message: String },
    #[error("Invalid date or time '{value}': {message}")]
    InvalidDate { value: String, message: String },
    #[error("Coordinate {field} must be within ±{limit}, got {value}")]
    InvalidCoordinate { field: String, value: f64, limit: f64 },
    #[error("Failed to load templates from {source_name}: {message}")]
    TemplateLoad { source_name: String, message: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<EphemerisError> for EngineError {
    fn from(err: EphemerisError) -> Self {
        EngineError::EphemerisFailure {
            message: err.to_string(),
        }
    }
}
