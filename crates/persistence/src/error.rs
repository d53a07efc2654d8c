// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use docket::RepoError;
use tracing::{debug, error};

/// Message raised by the booking overlap triggers.
pub const OVERLAP_TRIGGER_MESSAGE: &str = "booking_overlap";

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error that has no more specific classification.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The booking overlap trigger aborted the statement.
    OverlapViolation,
    /// A queue uniqueness index rejected the row.
    TokenConflict,
    /// The database stayed locked past the busy timeout.
    Busy,
    /// The requested row was not found.
    NotFound { entity: &'static str, id: String },
    /// A stored row could not be mapped back to a domain value.
    CorruptRow { table: &'static str, reason: String },
}

impl PersistenceError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::OverlapViolation => write!(f, "Booking range overlaps an active booking"),
            Self::TokenConflict => write!(f, "Queue token or client already taken for the day"),
            Self::Busy => write!(f, "Database is busy"),
            Self::NotFound { entity, id } => write!(f, "Not found: {entity} {id}"),
            Self::CorruptRow { table, reason } => {
                write!(f, "Corrupt row in {table}: {reason}")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

fn is_busy(message: &str) -> bool {
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("database is busy")
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::not_found("row", "unknown"),
            DieselError::DatabaseError(kind, info) => {
                let message = info.message();
                if message.contains(OVERLAP_TRIGGER_MESSAGE) {
                    Self::OverlapViolation
                } else if matches!(kind, DatabaseErrorKind::UniqueViolation)
                    && message.contains("queue_entries.")
                {
                    Self::TokenConflict
                } else if is_busy(message) {
                    Self::Busy
                } else {
                    Self::DatabaseError(message.to_string())
                }
            }
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<PersistenceError> for RepoError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::OverlapViolation => {
                debug!("Overlap trigger rejected booking");
                Self::OverlapViolation
            }
            PersistenceError::TokenConflict => {
                debug!("Queue uniqueness index rejected entry");
                Self::TokenConflict
            }
            PersistenceError::Busy => Self::Busy,
            PersistenceError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => {
                error!(error = %other, "Unclassified persistence error");
                Self::Backend(other.to_string())
            }
        }
    }
}
