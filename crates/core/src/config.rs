// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use docket_domain::CivilTimezone;
use std::str::FromStr;
use std::time::Duration;

/// How booking overlap exclusion is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapEnforcement {
    /// Rely on the store's exclusion constraint alone.
    DbExclusion,
    /// Re-check for overlaps inside the serializable transaction before
    /// inserting. The store constraint remains the backstop.
    #[default]
    SerializableRecheck,
}

impl OverlapEnforcement {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DbExclusion => "db-exclusion",
            Self::SerializableRecheck => "serializable-recheck",
        }
    }
}

impl FromStr for OverlapEnforcement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "db-exclusion" => Ok(Self::DbExclusion),
            "serializable-recheck" => Ok(Self::SerializableRecheck),
            other => Err(format!(
                "unknown overlap enforcement '{other}', expected db-exclusion or serializable-recheck"
            )),
        }
    }
}

impl std::fmt::Display for OverlapEnforcement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options recognised by the scheduling engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingConfig {
    /// Timezone local dates and times are interpreted in.
    pub civil_timezone: CivilTimezone,
    /// Step between slot starts when listing bookable slots.
    pub default_slot_step_minutes: u32,
    pub booking_overlap_enforcement: OverlapEnforcement,
    /// Accept the legacy `served` queue status as `completed`.
    pub queue_status_alias_served_completed: bool,
    /// Deadline applied to each request.
    pub request_timeout: Duration,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            civil_timezone: CivilTimezone::default(),
            default_slot_step_minutes: 15,
            booking_overlap_enforcement: OverlapEnforcement::default(),
            queue_status_alias_served_completed: true,
            request_timeout: Duration::from_secs(5),
        }
    }
}
