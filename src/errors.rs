/*!
 * Error types for the livetrans library.
 *
 * This module contains custom error types for the different layers of the
 * orchestrator, using the thiserror crate for ergonomic error definitions.
 * Language resolution has no error type: it always degrades to a default tag.
 */

use std::fmt;
use thiserror::Error;

/// Whether a backend failure is worth trying again later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Network, timeout or rate-limit failure
    Transient,
    /// Credential or configuration failure
    Permanent,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// Error returned by a translation backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    /// Transient or permanent
    pub kind: BackendErrorKind,
    /// Human readable description
    pub message: String,
}

impl BackendError {
    /// Create a transient error (network, timeout, rate limit)
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Transient,
            message: message.into(),
        }
    }

    /// Create a permanent error (credentials, configuration)
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == BackendErrorKind::Transient
    }

    pub fn is_permanent(&self) -> bool {
        self.kind == BackendErrorKind::Permanent
    }
}

/// Errors raised before a request reaches the orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Text was empty or whitespace only
    #[error("Input text is empty")]
    EmptyText,
}

/// Errors from the history store
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The underlying database rejected the operation
    #[error("History database error: {0}")]
    Database(String),

    /// The blocking database task could not complete
    #[error("History task failed: {0}")]
    Task(String),
}

impl From<anyhow::Error> for PersistenceError {
    fn from(error: anyhow::Error) -> Self {
        Self::Database(format!("{:#}", error))
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Rejected user input
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Error from a backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Error from the history store
    #[error("History error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
