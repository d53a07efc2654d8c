// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ports::RepoError;
use docket_domain::DomainError;
use serde::{Deserialize, Serialize};

/// Stable error vocabulary returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    Forbidden,
    ValidationFailed,
    InvalidTransition,
    ConflictOverlap,
    ConflictToken,
    CaseMismatch,
    TimedOut,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::ConflictOverlap => "CONFLICT_OVERLAP",
            Self::ConflictToken => "CONFLICT_TOKEN",
            Self::CaseMismatch => "CASE_MISMATCH",
            Self::TimedOut => "TIMED_OUT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors returned by the scheduling engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The referenced entity does not exist or is not visible to the caller.
    NotFound {
        /// The kind of entity.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },
    /// The caller lacks the role, privilege or ownership for the operation.
    Forbidden {
        /// The operation that was refused.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// A declared precondition does not hold.
    ValidationFailed(String),
    /// The booking time range intersects an active booking.
    ConflictOverlap(String),
    /// A token number was taken by a concurrent generator.
    ConflictToken(String),
    /// The booking references a case not owned by the caller.
    CaseMismatch {
        /// The referenced case.
        case_id: i64,
    },
    /// The caller-supplied deadline passed before the operation committed.
    TimedOut,
    /// An invariant violation that cannot be classified further.
    Internal(String),
}

impl CoreError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DomainViolation(DomainError::InvalidStatusTransition { .. }) => {
                ErrorCode::InvalidTransition
            }
            Self::DomainViolation(_) | Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::ConflictOverlap(_) => ErrorCode::ConflictOverlap,
            Self::ConflictToken(_) => ErrorCode::ConflictToken,
            Self::CaseMismatch { .. } => ErrorCode::CaseMismatch,
            Self::TimedOut => ErrorCode::TimedOut,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn forbidden(action: &str, reason: &str) -> Self {
        Self::Forbidden {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Self::Forbidden { action, reason } => write!(f, "Forbidden to {action}: {reason}"),
            Self::ValidationFailed(msg) => write!(f, "Validation failed: {msg}"),
            Self::ConflictOverlap(msg) => write!(f, "Booking overlap: {msg}"),
            Self::ConflictToken(msg) => write!(f, "Token number conflict: {msg}"),
            Self::CaseMismatch { case_id } => {
                write!(f, "Case {case_id} does not belong to the caller")
            }
            Self::TimedOut => write!(f, "Deadline exceeded"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<RepoError> for CoreError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::OverlapViolation => Self::ConflictOverlap(String::from(
                "an active booking already occupies this time range",
            )),
            RepoError::TokenConflict => Self::ConflictToken(String::from(
                "token number already assigned for this lawyer and day",
            )),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Busy => Self::TimedOut,
            RepoError::Backend(msg) => Self::Internal(msg),
        }
    }
}
