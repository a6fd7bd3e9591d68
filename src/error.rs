//! Error types for Parley
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.
//!
//! None of these errors is fatal to a chat session: the session state
//! machine recovers from every one of them locally (apology message for
//! gateway failures, in-memory-only operation for storage failures,
//! dropped indicators for clipboard/share failures).

use thiserror::Error;

/// Main error type for Parley operations
///
/// This enum encompasses all possible errors that can occur during
/// session handling, gateway calls, history persistence, and platform
/// capability access.
#[derive(Error, Debug)]
pub enum ParleyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response gateway errors (API call failed or returned malformed data)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Gateway call exceeded the configured timeout
    #[error("Gateway timed out after {0} seconds")]
    GatewayTimeout(u64),

    /// History storage errors (durable collection or scratch copy)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Clipboard access errors
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Share capability errors
    #[error("Share error: {0}")]
    Share(String),

    /// The session has been closed; no further mutations are accepted
    #[error("Session is closed")]
    SessionClosed,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Parley operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
