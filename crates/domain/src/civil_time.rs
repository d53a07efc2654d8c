// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Civil (wall-clock) time handling.
//!
//! All public surfaces exchange UTC instants. Local dates and local times
//! are interpreted in a single configured civil timezone.
//!
//! ## Invariants
//!
//! - An unknown timezone identifier resolves to UTC, and only to UTC
//! - A local day window always spans exactly 24 hours
//! - Ambiguous local times resolve to the earliest instant
//! - Local times inside a DST gap shift forward to the first valid minute
//! - Only dates in years `MIN_CIVIL_YEAR..=MAX_CIVIL_YEAR` are converted

use crate::error::DomainError;
use crate::interval::Interval;
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use tracing::warn;

/// The civil timezone used when none is configured.
pub const DEFAULT_CIVIL_TIMEZONE: &str = "Asia/Colombo";

/// Longest DST gap searched when a local time does not exist.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Earliest year a civil date may fall in.
pub const MIN_CIVIL_YEAR: i32 = 1900;

/// Latest year a civil date may fall in. The day after still has a
/// four-digit year, so stored timestamps keep a fixed width.
pub const MAX_CIVIL_YEAR: i32 = 9998;

/// Rejects civil dates outside the supported years.
///
/// # Errors
///
/// Returns `DomainError::DateOutOfRange` for years outside
/// `MIN_CIVIL_YEAR..=MAX_CIVIL_YEAR`.
pub fn validate_civil_date(date: NaiveDate) -> Result<(), DomainError> {
    if (MIN_CIVIL_YEAR..=MAX_CIVIL_YEAR).contains(&date.year()) {
        Ok(())
    } else {
        Err(DomainError::DateOutOfRange {
            date: date.to_string(),
        })
    }
}

/// Rejects instants whose UTC date is outside the supported years.
///
/// # Errors
///
/// Returns `DomainError::DateOutOfRange`.
pub fn validate_instant(instant: DateTime<Utc>) -> Result<(), DomainError> {
    validate_civil_date(instant.date_naive())
}

/// A validated IANA timezone used to interpret local dates and times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTimezone {
    tz: Tz,
}

impl CivilTimezone {
    /// Wraps an already parsed timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parses an IANA identifier, falling back to UTC when it is unknown.
    #[must_use]
    pub fn parse_or_utc(identifier: &str) -> Self {
        identifier.trim().parse::<Tz>().map_or_else(
            |_| {
                warn!(
                    timezone = identifier,
                    "Unknown civil timezone, falling back to UTC"
                );
                Self { tz: Tz::UTC }
            },
            |tz| Self { tz },
        )
    }

    /// Returns the underlying timezone.
    #[must_use]
    pub const fn tz(&self) -> Tz {
        self.tz
    }

    /// Returns the IANA name of the timezone.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Converts a local civil date and time to a UTC instant.
    #[must_use]
    pub fn local_to_utc(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time);
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => self.shift_out_of_gap(naive),
        }
    }

    fn shift_out_of_gap(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        for minutes in 1..=MAX_GAP_MINUTES {
            let Some(candidate) = naive.checked_add_signed(Duration::minutes(minutes)) else {
                break;
            };
            if let Some(dt) = self.tz.from_local_datetime(&candidate).earliest() {
                return dt.with_timezone(&Utc);
            }
        }
        Utc.from_utc_datetime(&naive)
    }

    /// Returns the local civil date on which `instant` falls.
    #[must_use]
    pub fn local_date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Returns the local wall-clock time of `instant`.
    #[must_use]
    pub fn local_time_of(&self, instant: DateTime<Utc>) -> NaiveTime {
        instant.with_timezone(&self.tz).time()
    }
}

impl Default for CivilTimezone {
    fn default() -> Self {
        Self::parse_or_utc(DEFAULT_CIVIL_TIMEZONE)
    }
}

/// Returns the UTC window covering a local civil date.
///
/// The window starts at local midnight and always ends 24 hours later,
/// including on days with a DST transition.
///
/// # Errors
///
/// Returns `DomainError::DateOutOfRange` for unsupported dates.
pub fn local_day_to_utc_window(
    date: NaiveDate,
    tz: &CivilTimezone,
) -> Result<Interval, DomainError> {
    validate_civil_date(date)?;
    let start = tz.local_to_utc(date, NaiveTime::MIN);
    Interval::starting_at(start, Duration::hours(24))
}
