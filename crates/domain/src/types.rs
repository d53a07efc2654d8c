// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking_status::BookingStatus;
use crate::error::DomainError;
use crate::interval::Interval;
use crate::queue_status::QueueStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The capability a user holds.
///
/// Role strings are normalised into this type once, at the authentication
/// boundary. Nothing past that boundary compares roles as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Lawyer,
    Apprentice,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Lawyer => "lawyer",
            Self::Apprentice => "apprentice",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    /// Parses a role, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "lawyer" => Ok(Self::Lawyer),
            "apprentice" => Ok(Self::Apprentice),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A platform identity. Owned by the auth collaborator; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub role: Role,
    pub display_name: String,
}

/// A lawyer-owned physical location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub owner_lawyer_id: i64,
    pub name: String,
}

/// A bookable service offered by a lawyer. Supplies the booking duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePackage {
    pub id: i64,
    pub lawyer_id: i64,
    pub name: String,
    pub duration_minutes: u32,
    pub active: bool,
}

/// The part of a case the scheduling core needs: who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRef {
    pub id: i64,
    pub client_id: i64,
}

/// A recurring weekly opening for a lawyer, expressed in local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailabilityTemplate {
    pub id: i64,
    pub lawyer_id: i64,
    /// `None` means the opening is valid for every branch of the lawyer.
    pub branch_id: Option<i64>,
    pub weekday: Weekday,
    pub start_local_time: NaiveTime,
    pub end_local_time: NaiveTime,
    pub slot_minutes: u32,
    pub max_bookings: u32,
    pub is_active: bool,
}

/// Overrides or cancels a single occurrence of a weekly template.
///
/// With both overrides absent the occurrence is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: i64,
    pub lawyer_id: i64,
    pub template_id: i64,
    pub date: NaiveDate,
    pub override_start: Option<NaiveTime>,
    pub override_end: Option<NaiveTime>,
    pub override_max_bookings: Option<u32>,
    pub is_active: bool,
}

impl AvailabilityException {
    /// Returns true if this exception removes the occurrence entirely.
    #[must_use]
    pub const fn cancels_occurrence(&self) -> bool {
        self.override_start.is_none() && self.override_end.is_none()
    }
}

/// A local date on which a lawyer takes no bookings at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutDay {
    pub id: i64,
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

/// A client's request for time with a lawyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    pub case_id: i64,
    pub service_package_id: Option<i64>,
    pub scheduled_at_utc: DateTime<Utc>,
    pub ends_at_utc: DateTime<Utc>,
    pub status: BookingStatus,
    pub blocks_time: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Returns the half-open time range the booking occupies.
    #[must_use]
    pub fn range(&self) -> Interval {
        Interval::spanning(self.scheduled_at_utc, self.ends_at_utc)
    }

    /// Returns true if the booking participates in overlap exclusion.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.blocks_time && self.status.blocks_time() && !self.range().is_empty()
    }
}

/// A validated booking that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub client_id: i64,
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    pub case_id: i64,
    pub service_package_id: Option<i64>,
    pub scheduled_at_utc: DateTime<Utc>,
    pub ends_at_utc: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    #[must_use]
    pub fn range(&self) -> Interval {
        Interval::spanning(self.scheduled_at_utc, self.ends_at_utc)
    }
}

/// One client's position in a lawyer's queue for a local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub date_local: NaiveDate,
    pub lawyer_id: i64,
    pub client_id: i64,
    pub booking_id: Option<i64>,
    pub token_number: u32,
    pub scheduled_time_local: Option<NaiveTime>,
    pub branch_id: Option<i64>,
    pub status: QueueStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// A queue entry about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueueEntry {
    pub date_local: NaiveDate,
    pub lawyer_id: i64,
    pub client_id: i64,
    pub booking_id: Option<i64>,
    pub token_number: u32,
    pub scheduled_time_local: Option<NaiveTime>,
    pub branch_id: Option<i64>,
}

/// A weekly template about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWeeklyTemplate {
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    pub weekday: Weekday,
    pub start_local_time: NaiveTime,
    pub end_local_time: NaiveTime,
    pub slot_minutes: u32,
    pub max_bookings: u32,
}

/// An availability exception about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAvailabilityException {
    pub lawyer_id: i64,
    pub template_id: i64,
    pub date: NaiveDate,
    pub override_start: Option<NaiveTime>,
    pub override_end: Option<NaiveTime>,
    pub override_max_bookings: Option<u32>,
}

/// A blackout day about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlackoutDay {
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub reason: Option<String>,
}
