//! Core error types for focusroom-core.
//!
//! Only preset lookups and missing confirmations are surfaced to callers of
//! the timer. Store failures are reported by the store itself but swallowed
//! (and logged) by the engine, recorder and streak tracker.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer command rejected
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Project lookup / mutation errors
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),
}

/// Errors a timer command hands back to its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Unknown preset key passed to `update_preset`
    #[error("Unknown preset: {0}")]
    InvalidPreset(String),

    /// `reset` / `end_session` called without the user's confirmation
    #[error("{0} requires confirmation")]
    ConfirmationRequired(&'static str),
}

/// Persistent store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// Stored value could not be (de)serialized
    #[error("JSON error for key '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Another thread panicked while holding the store lock
    #[error("Store lock poisoned")]
    Poisoned,

    /// Store was told to fail (used by tests and read-only hosts)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Project errors.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// No project with that id in the collection
    #[error("Project not found: {0}")]
    NotFound(String),

    /// Project names may not be blank
    #[error("Project name must not be empty")]
    EmptyName,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
