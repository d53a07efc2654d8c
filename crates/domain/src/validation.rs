// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::WeeklyAvailabilityTemplate;
use chrono::{NaiveTime, Weekday};

/// Validates that a local time range is non-empty.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeRange` if `start >= end`.
pub fn validate_local_range(start: NaiveTime, end: NaiveTime) -> Result<(), DomainError> {
    if start >= end {
        return Err(DomainError::InvalidTimeRange {
            reason: format!("start {start} must be before end {end}"),
        });
    }
    Ok(())
}

/// Validates a template slot length.
///
/// # Errors
///
/// Returns `DomainError::InvalidSlotParameters` if the length is zero.
pub fn validate_slot_minutes(slot_minutes: u32) -> Result<(), DomainError> {
    if slot_minutes == 0 {
        return Err(DomainError::InvalidSlotParameters {
            reason: String::from("slot_minutes must be greater than zero"),
        });
    }
    Ok(())
}

/// Validates exception overrides against the template they modify.
///
/// A single override replaces only its own end of the template range, so
/// the effective range must still be non-empty.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeRange` if the effective range is empty.
pub fn validate_exception_overrides(
    template: &WeeklyAvailabilityTemplate,
    override_start: Option<NaiveTime>,
    override_end: Option<NaiveTime>,
) -> Result<(), DomainError> {
    if override_start.is_none() && override_end.is_none() {
        return Ok(());
    }
    validate_local_range(
        override_start.unwrap_or(template.start_local_time),
        override_end.unwrap_or(template.end_local_time),
    )
}

/// Finds an active template for the same weekday that overlaps `[start, end)`.
///
/// Returns the id of the first overlapping template, ignoring `exclude_id`.
#[must_use]
pub fn find_overlapping_template(
    existing: &[WeeklyAvailabilityTemplate],
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
    exclude_id: Option<i64>,
) -> Option<i64> {
    existing
        .iter()
        .filter(|t| t.is_active && t.weekday == weekday && Some(t.id) != exclude_id)
        .find(|t| t.start_local_time < end && start < t.end_local_time)
        .map(|t| t.id)
}
