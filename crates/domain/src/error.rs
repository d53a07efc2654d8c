// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An interval ends before it starts.
    InvalidInterval {
        /// The interval start (RFC 3339).
        start: String,
        /// The interval end (RFC 3339).
        end: String,
    },
    /// A local time range is empty or inverted.
    InvalidTimeRange {
        /// Description of the violation.
        reason: String,
    },
    /// A stored weekly template or exception cannot be resolved.
    InvalidTemplate {
        /// The template the offending row belongs to.
        template_id: i64,
        /// Description of the violation.
        reason: String,
    },
    /// Two active templates for the same weekday overlap in local time.
    OverlappingTemplates {
        /// The weekday both templates apply to.
        weekday: String,
        /// The already active template that overlaps.
        existing_template_id: i64,
    },
    /// Slot duration or step is not usable.
    InvalidSlotParameters {
        /// Description of the violation.
        reason: String,
    },
    /// Role string is not one of the known roles.
    InvalidRole(String),
    /// Booking status string is not recognised.
    InvalidBookingStatus {
        /// The rejected status string.
        status: String,
    },
    /// Queue status string is not recognised.
    InvalidQueueStatus {
        /// The rejected status string.
        status: String,
    },
    /// The requested status change is not allowed by the lifecycle.
    InvalidStatusTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// A civil date or instant outside the supported years.
    DateOutOfRange {
        /// The rejected date.
        date: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInterval { start, end } => {
                write!(f, "Invalid interval: end {end} is before start {start}")
            }
            Self::InvalidTimeRange { reason } => write!(f, "Invalid time range: {reason}"),
            Self::InvalidTemplate {
                template_id,
                reason,
            } => write!(f, "Invalid availability template {template_id}: {reason}"),
            Self::OverlappingTemplates {
                weekday,
                existing_template_id,
            } => write!(
                f,
                "Template overlaps active template {existing_template_id} on {weekday}"
            ),
            Self::InvalidSlotParameters { reason } => {
                write!(f, "Invalid slot parameters: {reason}")
            }
            Self::InvalidRole(role) => write!(f, "Invalid role: {role}"),
            Self::InvalidBookingStatus { status } => {
                write!(f, "Invalid booking status: {status}")
            }
            Self::InvalidQueueStatus { status } => write!(f, "Invalid queue status: {status}"),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from {from} to {to}: {reason}")
            }
            Self::DateOutOfRange { date } => write!(f, "Date {date} is out of range"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow during {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
