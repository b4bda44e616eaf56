//! Error handling utilities for the devocional application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Note that a day without a configured template is *not* an error: the
//! resolver reports it as [`crate::resolver::Resolution::NotConfigured`], a
//! valid outcome callers render as an informative empty state.

use crate::model::FieldId;
use chrono::NaiveDate;
use std::io;
use thiserror::Error;

/// Errors raised by the SQLite-backed stores.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An underlying SQLite operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection pool could not provide a connection.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A row expected to exist was not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors raised while talking to a remote collaborator (template repository
/// or entry store reached over HTTP+JSON).
///
/// These are terminal for the current operation: the core performs no retry
/// and no partial commit. Callers own timeout and retry policy.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The request could not be sent or the response could not be read.
    #[error("Collaborator unreachable: {0}. Please check the service URL and network connectivity.")]
    Transport(#[from] reqwest::Error),

    /// The collaborator answered with a non-success status.
    #[error("Collaborator returned status {status}: {body}")]
    Status {
        /// HTTP status code of the response
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The response body could not be decoded as the expected JSON shape.
    #[error("Failed to decode collaborator response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Represents all possible errors that can occur in the devocional application.
///
/// This enum is the central error type used across the application, with
/// variants for different error categories. It uses `thiserror` for deriving
/// the `Error` trait implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use devocional::errors::AppError;
///
/// let error = AppError::Config("Missing database path".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing database path");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range calendar input.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// An edit referenced a field that is not part of the active schema.
    /// This is a programmer/client error and is surfaced immediately.
    #[error("Unknown field {0}: not part of the active entry schema")]
    UnknownField(FieldId),

    /// A commit was attempted while a required field was still blank.
    /// Recoverable: the user can fill the field and retry.
    #[error("Required field '{label}' ({field}) is empty")]
    MissingRequiredField {
        /// Id of the offending field definition
        field: FieldId,
        /// Label of the field, for the user-facing message
        label: String,
    },

    /// A save was attempted on a date with no configured template; the
    /// session carries an empty schema and there is nothing to persist.
    #[error("Nothing is configured for {0}; there is no entry to save")]
    NothingToSave(NaiveDate),

    /// A remote collaborator call failed or timed out.
    #[error("Collaborator unavailable: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// A local store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A command-line argument was malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::InvalidDate(err.to_string())
    }
}

/// Convenience type alias for results with `AppError`.
pub type AppResult<T> = Result<T, AppError>;
