//! Core error types for hydrate-core.
//!
//! Nothing in this system is fatal: permission and dispatch failures surface
//! as logs or flags, and absent persisted values default silently. The types
//! here cover the remaining genuine error paths (storage, configuration,
//! input validation).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for hydrate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification dispatch errors
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Validation errors
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Data directory could not be created
    #[error("failed to prepare data directory: {0}")]
    DataDir(#[from] std::io::Error),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::QueryFailed(err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Notification dispatch errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The platform service refused or failed to deliver
    #[error("notification dispatch failed: {0}")]
    DispatchFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn positive(field: &str, value: f64) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("must be a positive number, got {value}"),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
