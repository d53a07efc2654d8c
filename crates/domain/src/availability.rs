// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Resolution of weekly templates into concrete UTC availability.
//!
//! ## Rules
//!
//! - Only active templates for the weekday of the requested date apply
//! - An active exception with no overrides cancels the occurrence
//! - An exception with overrides replaces the fields it carries
//! - A blackout day suppresses every interval on that date
//! - Intervals are never merged, so branch identity survives
//!
//! A row whose local range is empty or inverted is reported as
//! `DomainError::InvalidTemplate`; it is never skipped.

use crate::civil_time::{CivilTimezone, validate_civil_date};
use crate::error::DomainError;
use crate::interval::Interval;
use crate::types::{AvailabilityException, BlackoutDay, WeeklyAvailabilityTemplate};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

/// A concrete window in which a lawyer accepts bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityInterval {
    pub branch_id: Option<i64>,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub max_bookings: u32,
    pub slot_minutes: u32,
    pub source_template_id: i64,
}

impl AvailabilityInterval {
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::spanning(self.start_utc, self.end_utc)
    }

    /// Returns true if this interval can serve a request for `branch_filter`.
    ///
    /// Intervals without a branch serve every branch.
    #[must_use]
    pub fn serves_branch(&self, branch_filter: Option<i64>) -> bool {
        match (branch_filter, self.branch_id) {
            (None, _) | (Some(_), None) => true,
            (Some(wanted), Some(own)) => wanted == own,
        }
    }
}

/// Resolves a lawyer's availability on one local date.
///
/// # Arguments
///
/// * `date_local` - The civil date being resolved
/// * `templates` - The lawyer's weekly templates
/// * `exceptions` - The lawyer's exceptions (any dates)
/// * `blackouts` - The lawyer's blackout days (any dates)
/// * `branch_filter` - Restrict to intervals serving this branch
/// * `tz` - The civil timezone the local values are expressed in
///
/// # Returns
///
/// Intervals ordered by `start_utc`, then by template id.
///
/// # Errors
///
/// Returns `DomainError::InvalidTemplate` if a template or exception yields an
/// empty or inverted local range, or `DomainError::DateOutOfRange`.
pub fn resolve_day_availability(
    date_local: NaiveDate,
    templates: &[WeeklyAvailabilityTemplate],
    exceptions: &[AvailabilityException],
    blackouts: &[BlackoutDay],
    branch_filter: Option<i64>,
    tz: &CivilTimezone,
) -> Result<Vec<AvailabilityInterval>, DomainError> {
    validate_civil_date(date_local)?;
    let weekday = date_local.weekday();
    let mut resolved = Vec::new();

    for template in templates
        .iter()
        .filter(|t| t.is_active && t.weekday == weekday)
    {
        if template.start_local_time >= template.end_local_time {
            return Err(DomainError::InvalidTemplate {
                template_id: template.id,
                reason: format!(
                    "start {} is not before end {}",
                    template.start_local_time, template.end_local_time
                ),
            });
        }

        let exception = exceptions
            .iter()
            .filter(|e| e.is_active && e.template_id == template.id && e.date == date_local)
            .max_by_key(|e| e.id);

        let (start, end, max_bookings) = match exception {
            Some(e) if e.cancels_occurrence() => continue,
            Some(e) => (
                e.override_start.unwrap_or(template.start_local_time),
                e.override_end.unwrap_or(template.end_local_time),
                e.override_max_bookings.unwrap_or(template.max_bookings),
            ),
            None => (
                template.start_local_time,
                template.end_local_time,
                template.max_bookings,
            ),
        };

        if start >= end {
            return Err(DomainError::InvalidTemplate {
                template_id: template.id,
                reason: format!("exception on {date_local} yields start {start} not before end {end}"),
            });
        }

        let interval = AvailabilityInterval {
            branch_id: template.branch_id,
            start_utc: tz.local_to_utc(date_local, start),
            end_utc: tz.local_to_utc(date_local, end),
            max_bookings,
            slot_minutes: template.slot_minutes,
            source_template_id: template.id,
        };
        if interval.serves_branch(branch_filter) {
            resolved.push(interval);
        }
    }

    if blackouts.iter().any(|b| b.date == date_local) {
        return Ok(Vec::new());
    }

    resolved.sort_by_key(|i| (i.start_utc, i.source_template_id));
    Ok(resolved)
}
