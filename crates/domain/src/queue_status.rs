// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queue entry status and transition logic.
//!
//! Entries start `waiting`. A waiting entry is called in (`in_progress`),
//! marked `no_show` or `cancelled`. An entry in progress is `completed`.
//! Legacy callers may send `served`, which is stored as `completed`.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Legacy input spelling of `completed`.
const SERVED_ALIAS: &str = "served";

/// Lifecycle states of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    InProgress,
    Completed,
    NoShow,
    Cancelled,
}

impl QueueStatus {
    /// Returns the canonical string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "no_show" => Ok(Self::NoShow),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidQueueStatus {
                status: s.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::NoShow | Self::Cancelled)
    }

    /// Validates a requested status change.
    ///
    /// `waiting -> completed` is only accepted when the request used the
    /// legacy `served` spelling.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the change is not allowed.
    pub fn validate_transition(&self, requested: RequestedQueueStatus) -> Result<(), DomainError> {
        let new_status = requested.status;
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::Waiting => match new_status {
                Self::InProgress | Self::NoShow | Self::Cancelled => true,
                Self::Completed => requested.legacy_served,
                Self::Waiting => false,
            },
            Self::InProgress => new_status == Self::Completed,
            Self::Completed | Self::NoShow | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by queue lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for QueueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status requested by a caller, remembering whether it arrived as `served`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedQueueStatus {
    pub status: QueueStatus,
    pub legacy_served: bool,
}

impl RequestedQueueStatus {
    /// Parses caller input into a canonical status.
    ///
    /// # Arguments
    ///
    /// * `input` - The status string sent by the caller
    /// * `served_alias_enabled` - Whether `served` is accepted as `completed`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQueueStatus` for unknown strings, including
    /// `served` when the alias is disabled.
    pub fn parse(input: &str, served_alias_enabled: bool) -> Result<Self, DomainError> {
        let normalized = input.trim().to_ascii_lowercase();
        if normalized == SERVED_ALIAS {
            if served_alias_enabled {
                return Ok(Self {
                    status: QueueStatus::Completed,
                    legacy_served: true,
                });
            }
            return Err(DomainError::InvalidQueueStatus {
                status: input.to_string(),
            });
        }
        Ok(Self {
            status: QueueStatus::parse_str(&normalized)?,
            legacy_served: false,
        })
    }
}

impl From<QueueStatus> for RequestedQueueStatus {
    fn from(status: QueueStatus) -> Self {
        Self {
            status,
            legacy_served: false,
        }
    }
}
