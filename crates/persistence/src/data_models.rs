// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and the text encodings used for time values.
//!
//! Instants are stored as fixed-width UTC text so that SQL string
//! comparison matches time order, which the overlap triggers rely on.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use diesel::prelude::*;
use docket_domain::{
    AvailabilityException, BlackoutDay, Booking, BookingStatus, Branch, CaseRef, DomainError,
    QueueEntry, QueueStatus, Role, ServicePackage, User, WeeklyAvailabilityTemplate,
};
use num_traits::FromPrimitive;

use crate::diesel_schema::{
    availability_exceptions, blackout_days, bookings, branches, cases, queue_entries,
    service_packages, users, weekly_availability,
};
use crate::error::PersistenceError;

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

#[must_use]
pub fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

#[must_use]
pub fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[must_use]
pub fn encode_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[must_use]
pub const fn encode_weekday(weekday: Weekday) -> i32 {
    match weekday {
        Weekday::Mon => 0,
        Weekday::Tue => 1,
        Weekday::Wed => 2,
        Weekday::Thu => 3,
        Weekday::Fri => 4,
        Weekday::Sat => 5,
        Weekday::Sun => 6,
    }
}

/// # Errors
///
/// Returns `CorruptRow` if the value does not fit an SQL integer column.
pub fn encode_count(table: &'static str, value: u32) -> Result<i32, PersistenceError> {
    i32::try_from(value)
        .map_err(|_| PersistenceError::corrupt(table, format!("{value} out of range")))
}

#[must_use]
pub const fn encode_flag(value: bool) -> i32 {
    if value { 1 } else { 0 }
}

fn decode_instant(table: &'static str, raw: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PersistenceError::corrupt(table, format!("instant '{raw}': {e}")))
}

fn decode_optional_instant(
    table: &'static str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, PersistenceError> {
    raw.map(|r| decode_instant(table, r)).transpose()
}

fn decode_date(table: &'static str, raw: &str) -> Result<NaiveDate, PersistenceError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| PersistenceError::corrupt(table, format!("date '{raw}': {e}")))
}

fn decode_time(table: &'static str, raw: &str) -> Result<NaiveTime, PersistenceError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|e| PersistenceError::corrupt(table, format!("time '{raw}': {e}")))
}

fn decode_optional_time(
    table: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveTime>, PersistenceError> {
    raw.map(|r| decode_time(table, r)).transpose()
}

fn decode_count(table: &'static str, value: i32) -> Result<u32, PersistenceError> {
    u32::try_from(value)
        .map_err(|_| PersistenceError::corrupt(table, format!("negative count {value}")))
}

fn decode_weekday(table: &'static str, value: i32) -> Result<Weekday, PersistenceError> {
    Weekday::from_i32(value)
        .ok_or_else(|| PersistenceError::corrupt(table, format!("weekday {value}")))
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub user_id: i64,
    pub role: String,
    pub display_name: String,
}

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: DomainError| PersistenceError::corrupt("users", e.to_string()))?;
        Ok(Self {
            id: row.user_id,
            role,
            display_name: row.display_name,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = branches)]
pub struct BranchRow {
    pub branch_id: i64,
    pub owner_lawyer_id: i64,
    pub name: String,
}

impl From<BranchRow> for Branch {
    fn from(row: BranchRow) -> Self {
        Self {
            id: row.branch_id,
            owner_lawyer_id: row.owner_lawyer_id,
            name: row.name,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = cases)]
pub struct CaseRow {
    pub case_id: i64,
    pub client_id: i64,
}

impl From<CaseRow> for CaseRef {
    fn from(row: CaseRow) -> Self {
        Self {
            id: row.case_id,
            client_id: row.client_id,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = service_packages)]
pub struct ServicePackageRow {
    pub service_package_id: i64,
    pub lawyer_id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub active: i32,
}

impl TryFrom<ServicePackageRow> for ServicePackage {
    type Error = PersistenceError;

    fn try_from(row: ServicePackageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.service_package_id,
            lawyer_id: row.lawyer_id,
            name: row.name,
            duration_minutes: decode_count("service_packages", row.duration_minutes)?,
            active: row.active != 0,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = weekly_availability)]
pub struct TemplateRow {
    pub template_id: i64,
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    pub weekday: i32,
    pub start_local_time: String,
    pub end_local_time: String,
    pub slot_minutes: i32,
    pub max_bookings: i32,
    pub is_active: i32,
}

impl TryFrom<TemplateRow> for WeeklyAvailabilityTemplate {
    type Error = PersistenceError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "weekly_availability";
        Ok(Self {
            id: row.template_id,
            lawyer_id: row.lawyer_id,
            branch_id: row.branch_id,
            weekday: decode_weekday(TABLE, row.weekday)?,
            start_local_time: decode_time(TABLE, &row.start_local_time)?,
            end_local_time: decode_time(TABLE, &row.end_local_time)?,
            slot_minutes: decode_count(TABLE, row.slot_minutes)?,
            max_bookings: decode_count(TABLE, row.max_bookings)?,
            is_active: row.is_active != 0,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = availability_exceptions)]
pub struct ExceptionRow {
    pub exception_id: i64,
    pub lawyer_id: i64,
    pub template_id: i64,
    pub exception_date: String,
    pub override_start: Option<String>,
    pub override_end: Option<String>,
    pub override_max_bookings: Option<i32>,
    pub is_active: i32,
}

impl TryFrom<ExceptionRow> for AvailabilityException {
    type Error = PersistenceError;

    fn try_from(row: ExceptionRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "availability_exceptions";
        Ok(Self {
            id: row.exception_id,
            lawyer_id: row.lawyer_id,
            template_id: row.template_id,
            date: decode_date(TABLE, &row.exception_date)?,
            override_start: decode_optional_time(TABLE, row.override_start.as_deref())?,
            override_end: decode_optional_time(TABLE, row.override_end.as_deref())?,
            override_max_bookings: row
                .override_max_bookings
                .map(|v| decode_count(TABLE, v))
                .transpose()?,
            is_active: row.is_active != 0,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = blackout_days)]
pub struct BlackoutRow {
    pub blackout_id: i64,
    pub lawyer_id: i64,
    pub blackout_date: String,
    pub reason: Option<String>,
}

impl TryFrom<BlackoutRow> for BlackoutDay {
    type Error = PersistenceError;

    fn try_from(row: BlackoutRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.blackout_id,
            lawyer_id: row.lawyer_id,
            date: decode_date("blackout_days", &row.blackout_date)?,
            reason: row.reason,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
pub struct BookingRow {
    pub booking_id: i64,
    pub client_id: i64,
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    pub case_id: i64,
    pub service_package_id: Option<i64>,
    pub scheduled_at_utc: String,
    pub ends_at_utc: String,
    pub status: String,
    pub blocks_time: i32,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "bookings";
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e: DomainError| PersistenceError::corrupt(TABLE, e.to_string()))?;
        Ok(Self {
            id: row.booking_id,
            client_id: row.client_id,
            lawyer_id: row.lawyer_id,
            branch_id: row.branch_id,
            case_id: row.case_id,
            service_package_id: row.service_package_id,
            scheduled_at_utc: decode_instant(TABLE, &row.scheduled_at_utc)?,
            ends_at_utc: decode_instant(TABLE, &row.ends_at_utc)?,
            status,
            blocks_time: row.blocks_time != 0,
            note: row.note,
            created_at: decode_instant(TABLE, &row.created_at)?,
            updated_at: decode_instant(TABLE, &row.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = queue_entries)]
pub struct QueueEntryRow {
    pub queue_entry_id: i64,
    pub queue_date: String,
    pub lawyer_id: i64,
    pub client_id: i64,
    pub booking_id: Option<i64>,
    pub token_number: i32,
    pub scheduled_time_local: Option<String>,
    pub branch_id: Option<i64>,
    pub status: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub reason: Option<String>,
}

impl TryFrom<QueueEntryRow> for QueueEntry {
    type Error = PersistenceError;

    fn try_from(row: QueueEntryRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "queue_entries";
        let status: QueueStatus = row
            .status
            .parse()
            .map_err(|e: DomainError| PersistenceError::corrupt(TABLE, e.to_string()))?;
        Ok(Self {
            id: row.queue_entry_id,
            date_local: decode_date(TABLE, &row.queue_date)?,
            lawyer_id: row.lawyer_id,
            client_id: row.client_id,
            booking_id: row.booking_id,
            token_number: decode_count(TABLE, row.token_number)?,
            scheduled_time_local: decode_optional_time(TABLE, row.scheduled_time_local.as_deref())?,
            branch_id: row.branch_id,
            status,
            started_at: decode_optional_instant(TABLE, row.started_at.as_deref())?,
            completed_at: decode_optional_instant(TABLE, row.completed_at.as_deref())?,
            reason: row.reason,
        })
    }
}

/// Converts a batch of rows, failing on the first corrupt one.
///
/// # Errors
///
/// Returns `CorruptRow` for the first row that does not decode.
pub fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, PersistenceError>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}
