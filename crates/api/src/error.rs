// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use docket::{CoreError, ErrorCode};
use docket_domain::DomainError;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

/// API-level errors.
///
/// Every failure a caller can observe carries a stable code, a readable
/// message and optional structured details.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The caller could not be identified.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// An operation failed with a taxonomy code.
    #[error("{code}: {message}")]
    Operation {
        code: ErrorCode,
        message: String,
        details: Option<Value>,
    },
}

/// Wire representation of an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    /// Builds a `VALIDATION_FAILED` error naming the offending field.
    #[must_use]
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::Operation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: Some(json!({ "field": field })),
        }
    }

    /// Returns the taxonomy code, or `None` for authentication failures.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::AuthenticationFailed { .. } => None,
            Self::Operation { code, .. } => Some(*code),
        }
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::AuthenticationFailed { reason } => ErrorBody {
                code: String::from("UNAUTHENTICATED"),
                message: reason.clone(),
                details: None,
            },
            Self::Operation {
                code,
                message,
                details,
            } => ErrorBody {
                code: code.as_str().to_string(),
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

fn domain_details(err: &DomainError) -> Option<Value> {
    match err {
        DomainError::InvalidTemplate {
            template_id,
            reason,
        } => Some(json!({ "template_id": template_id, "reason": reason })),
        DomainError::OverlappingTemplates {
            weekday,
            existing_template_id,
        } => Some(json!({
            "weekday": weekday,
            "existing_template_id": existing_template_id,
        })),
        DomainError::InvalidStatusTransition { from, to, .. } => {
            Some(json!({ "from": from, "to": to }))
        }
        _ => None,
    }
}

/// Translates a core error into an API error.
///
/// Internal failures are logged in full and reported without detail.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    let code = err.code();
    match err {
        CoreError::Internal(msg) => {
            error!(error = %msg, "Internal error");
            ApiError::Operation {
                code,
                message: String::from("internal error"),
                details: None,
            }
        }
        other => {
            let details = match &other {
                CoreError::DomainViolation(domain_err) => domain_details(domain_err),
                CoreError::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
                CoreError::CaseMismatch { case_id } => Some(json!({ "case_id": case_id })),
                _ => None,
            };
            ApiError::Operation {
                code,
                message: other.to_string(),
                details,
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}
