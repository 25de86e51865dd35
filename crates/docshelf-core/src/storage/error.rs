//! Storage error handling
//!
//! Provides typed errors for document store operations with descriptive
//! messages and recovery suggestions.

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::models::DocumentKey;

/// Errors that can occur during document store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be opened; every operation fails with this
    #[error("Database unavailable: {reason}")]
    Unavailable { reason: String },

    /// A document with this key already exists
    #[error("A document already exists for '{key}'")]
    ConstraintViolation { key: DocumentKey },

    /// No row matched the key
    #[error("No document found for '{key}'")]
    NotFound { key: DocumentKey },

    /// A stored row could not be interpreted
    #[error("Stored document '{key}' is invalid: {details}")]
    Corrupt { key: DocumentKey, details: String },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    /// Classify a write error, mapping unique-key failures to `ConstraintViolation`
    pub fn from_write(error: rusqlite::Error, key: &DocumentKey) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::ConstraintViolation { key: key.clone() }
            }
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::PermissionDenied
                ) =>
            {
                StoreError::Unavailable {
                    reason: error.to_string(),
                }
            }
            _ => StoreError::Database(error),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if the user can fix this by changing their input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::ConstraintViolation { .. } | StoreError::NotFound { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Unavailable { .. } => Some(
                "Check database_path in the configuration and that the file is readable and writable.",
            ),
            StoreError::ConstraintViolation { .. } => {
                Some("Use a different label, or edit the existing document instead.")
            }
            StoreError::NotFound { .. } => {
                Some("Refresh the catalog; the document may have been deleted.")
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
