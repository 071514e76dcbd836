//! Data access errors
//!
//! Every `Store` operation fails with a [`StoreError`]. Callers map errors to
//! user-facing outcomes with [`StoreError::status_code`].

use std::fmt;
use std::str::FromStr;

use rusqlite::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the data access layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Required input missing or malformed
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Uniqueness or foreign-key rule rejected by SQLite
    #[error("Constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    /// Any other SQLite failure
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// A thread panicked while holding the connection
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }

    /// HTTP-equivalent status for this error
    ///
    /// Constraint violations stay 500 under [`ConflictStatus::Internal`];
    /// [`ConflictStatus::Conflict`] reports them as 409 instead.
    pub fn status_code(&self, conflicts: ConflictStatus) -> u16 {
        match self {
            StoreError::Validation(_) => 400,
            StoreError::NotFound { .. } => 404,
            StoreError::ConstraintViolation(_) => match conflicts {
                ConflictStatus::Internal => 500,
                ConflictStatus::Conflict => 409,
            },
            StoreError::Database(_) | StoreError::LockPoisoned => 500,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::ConstraintViolation(error),
            _ => StoreError::Database(error),
        }
    }
}

/// Result type for data access operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Reporting policy for constraint violations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStatus {
    /// Undifferentiated internal failure (500)
    #[default]
    Internal,
    /// Distinct conflict (409)
    Conflict,
}

impl FromStr for ConflictStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" | "500" => Ok(ConflictStatus::Internal),
            "conflict" | "409" => Ok(ConflictStatus::Conflict),
            other => Err(format!(
                "unknown conflict status '{}', expected 'internal' or 'conflict'",
                other
            )),
        }
    }
}

impl fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictStatus::Internal => write!(f, "internal"),
            ConflictStatus::Conflict => write!(f, "conflict"),
        }
    }
}
