//! Error types for roomescape.
//!
//! This module defines all error types used throughout the roomescape crate.
//! Domain rule violations (missing records, duplicates, references that block
//! a delete) are kept apart from infrastructure failures so the HTTP layer can
//! map them onto status codes.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for roomescape operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// The requested record does not exist.
    #[error("{resource} not found{}", .id.map_or_else(String::new, |id| format!(" (id {id})")))]
    NotFound {
        /// Name of the missing resource, e.g. `"theme"`.
        resource: &'static str,
        /// Identifier that was looked up, when there is one.
        id: Option<i64>,
    },

    /// A record with the same natural key already exists.
    #[error("{resource} already exists")]
    Duplicated {
        /// Name of the duplicated resource.
        resource: &'static str,
    },

    /// The record is still referenced by reservations and cannot be removed.
    #[error("{resource} {id} is still referenced by reservations")]
    InUse {
        /// Name of the referenced resource.
        resource: &'static str,
        /// Identifier of the referenced record.
        id: i64,
    },

    /// Request input failed validation.
    #[error("invalid input: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The shared connection lock was poisoned by a panicking holder.
    #[error("database connection lock poisoned")]
    LockPoisoned,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for roomescape operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for the given resource and id.
    #[must_use]
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound {
            resource,
            id: Some(id),
        }
    }

    /// Create a duplicate error for the given resource.
    #[must_use]
    pub fn duplicated(resource: &'static str) -> Self {
        Self::Duplicated { resource }
    }

    /// Create an in-use error for the given resource and id.
    #[must_use]
    pub fn in_use(resource: &'static str, id: i64) -> Self {
        Self::InUse { resource, id }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error reports a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error reports a duplicate record.
    #[must_use]
    pub fn is_duplicated(&self) -> bool {
        matches!(self, Self::Duplicated { .. })
    }

    /// Check if this error is caused by bad caller input rather than the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Duplicated { .. }
                | Self::InUse { .. }
                | Self::Validation { .. }
        )
    }
}
