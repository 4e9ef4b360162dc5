//! Error types for the SQL workspace.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Message surfaced when the SQL service cannot be reached at all.
pub const SERVICE_UNREACHABLE: &str = "Could not connect to the SQL service";

/// Message surfaced when the service rejects a request without an `error` field.
pub const UNKNOWN_SERVICE_ERROR: &str = "Unknown error";

/// Main error type for workspace operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// The service rejected a statement (non-2xx status or `{error}` body).
    #[error("Statement error: {0}")]
    Statement(String),

    /// The service produced no response (connect failure, timeout, broken body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A tables/columns/databases listing failed. Absorbed by the schema cache.
    #[error("Schema load error: {0}")]
    SchemaLoad(String),

    /// Configuration errors (invalid config file, bad service URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkspaceError {
    /// Creates a statement error with the given message.
    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a schema load error with the given message.
    pub fn schema_load(msg: impl Into<String>) -> Self {
        Self::SchemaLoad(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Statement(_) => "Statement Error",
            Self::Transport(_) => "Transport Error",
            Self::SchemaLoad(_) => "Schema Load Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    ///
    /// Statement errors are surfaced verbatim to the user, so callers that
    /// render them use this instead of `to_string()`.
    pub fn message(&self) -> &str {
        match self {
            Self::Statement(m)
            | Self::Transport(m)
            | Self::SchemaLoad(m)
            | Self::Config(m)
            | Self::Internal(m) => m,
        }
    }

    /// Returns true if the service could not be reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias using WorkspaceError.
pub type Result<T> = std::result::Result<T, WorkspaceError>;
