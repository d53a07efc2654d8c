// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! These types are the wire contract. They are distinct from the domain
//! types so that storage or engine changes do not leak onto the wire.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use docket_domain::{
    AvailabilityException, AvailabilityInterval, BlackoutDay, Booking, QueueEntry, Slot,
    WeeklyAvailabilityTemplate,
};
use serde::{Deserialize, Serialize};

pub use docket::{CreateBookingRequest, CreateExceptionRequest, CreateTemplateRequest};

/// Query for `list_availability`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvailabilityQuery {
    pub lawyer_id: i64,
    /// The local civil date.
    pub date: NaiveDate,
    pub branch_id: Option<i64>,
}

/// Query for `list_bookable_slots`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlotsQuery {
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub service_package_id: i64,
    pub branch_id: Option<i64>,
}

/// Body for `generate_today_queue`. An absent date means today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerateQueueRequest {
    pub date: Option<NaiveDate>,
}

/// Query for `list_today_queue`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueueQuery {
    pub date: Option<NaiveDate>,
    /// Status filter, e.g. `waiting`. `served` is accepted when the alias
    /// is enabled.
    pub status: Option<String>,
}

/// Body for `update_queue_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateQueueEntryRequest {
    pub status: String,
    pub notes: Option<String>,
}

/// Query for `list_weekly_templates`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplatesQuery {
    pub lawyer_id: i64,
}

/// Body for `create_blackout_day`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBlackoutRequest {
    pub date: NaiveDate,
    pub reason: Option<String>,
}

/// Query for `list_blackout_days`. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlackoutRangeQuery {
    pub lawyer_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// A booking as exposed on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInfo {
    pub booking_id: i64,
    pub client_id: i64,
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    pub case_id: i64,
    pub service_package_id: Option<i64>,
    pub scheduled_at_utc: DateTime<Utc>,
    pub ends_at_utc: DateTime<Utc>,
    pub status: String,
    pub blocks_time: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingInfo {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.id,
            client_id: booking.client_id,
            lawyer_id: booking.lawyer_id,
            branch_id: booking.branch_id,
            case_id: booking.case_id,
            service_package_id: booking.service_package_id,
            scheduled_at_utc: booking.scheduled_at_utc,
            ends_at_utc: booking.ends_at_utc,
            status: booking.status.as_str().to_string(),
            blocks_time: booking.blocks_time,
            note: booking.note,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// API response for a booking mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking: BookingInfo,
    /// A success message.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBookingsResponse {
    pub bookings: Vec<BookingInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityIntervalInfo {
    pub branch_id: Option<i64>,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub max_bookings: u32,
    pub slot_minutes: u32,
    pub source_template_id: i64,
}

impl From<AvailabilityInterval> for AvailabilityIntervalInfo {
    fn from(interval: AvailabilityInterval) -> Self {
        Self {
            branch_id: interval.branch_id,
            start_utc: interval.start_utc,
            end_utc: interval.end_utc,
            max_bookings: interval.max_bookings,
            slot_minutes: interval.slot_minutes,
            source_template_id: interval.source_template_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAvailabilityResponse {
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub intervals: Vec<AvailabilityIntervalInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

impl From<Slot> for SlotInfo {
    fn from(slot: Slot) -> Self {
        Self {
            start_utc: slot.start_utc,
            end_utc: slot.end_utc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSlotsResponse {
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub service_package_id: i64,
    pub slots: Vec<SlotInfo>,
}

/// A queue entry as exposed on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntryInfo {
    pub queue_entry_id: i64,
    pub date: NaiveDate,
    pub lawyer_id: i64,
    pub client_id: i64,
    pub booking_id: Option<i64>,
    pub token_number: u32,
    /// Local wall-clock time of the originating booking.
    pub scheduled_time_local: Option<NaiveTime>,
    pub branch_id: Option<i64>,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl From<QueueEntry> for QueueEntryInfo {
    fn from(entry: QueueEntry) -> Self {
        Self {
            queue_entry_id: entry.id,
            date: entry.date_local,
            lawyer_id: entry.lawyer_id,
            client_id: entry.client_id,
            booking_id: entry.booking_id,
            token_number: entry.token_number,
            scheduled_time_local: entry.scheduled_time_local,
            branch_id: entry.branch_id,
            status: entry.status.as_str().to_string(),
            started_at: entry.started_at,
            completed_at: entry.completed_at,
            reason: entry.reason,
        }
    }
}

/// A day's queue, ordered by token number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueResponse {
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub entries: Vec<QueueEntryInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntryResponse {
    pub entry: QueueEntryInfo,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub template_id: i64,
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    /// Three-letter English weekday, e.g. `Mon`.
    pub weekday: String,
    pub start_local_time: NaiveTime,
    pub end_local_time: NaiveTime,
    pub slot_minutes: u32,
    pub max_bookings: u32,
    pub is_active: bool,
}

impl From<WeeklyAvailabilityTemplate> for TemplateInfo {
    fn from(template: WeeklyAvailabilityTemplate) -> Self {
        Self {
            template_id: template.id,
            lawyer_id: template.lawyer_id,
            branch_id: template.branch_id,
            weekday: template.weekday.to_string(),
            start_local_time: template.start_local_time,
            end_local_time: template.end_local_time,
            slot_minutes: template.slot_minutes,
            max_bookings: template.max_bookings,
            is_active: template.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub template: TemplateInfo,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTemplatesResponse {
    pub lawyer_id: i64,
    pub templates: Vec<TemplateInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub exception_id: i64,
    pub lawyer_id: i64,
    pub template_id: i64,
    pub date: NaiveDate,
    pub override_start: Option<NaiveTime>,
    pub override_end: Option<NaiveTime>,
    pub override_max_bookings: Option<u32>,
    /// True when the exception removes the occurrence entirely.
    pub cancels_occurrence: bool,
}

impl From<AvailabilityException> for ExceptionInfo {
    fn from(exception: AvailabilityException) -> Self {
        Self {
            cancels_occurrence: exception.cancels_occurrence(),
            exception_id: exception.id,
            lawyer_id: exception.lawyer_id,
            template_id: exception.template_id,
            date: exception.date,
            override_start: exception.override_start,
            override_end: exception.override_end,
            override_max_bookings: exception.override_max_bookings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionResponse {
    pub exception: ExceptionInfo,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutInfo {
    pub blackout_id: i64,
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

impl From<BlackoutDay> for BlackoutInfo {
    fn from(blackout: BlackoutDay) -> Self {
        Self {
            blackout_id: blackout.id,
            lawyer_id: blackout.lawyer_id,
            date: blackout.date,
            reason: blackout.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutResponse {
    pub blackout: BlackoutInfo,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBlackoutResponse {
    pub lawyer_id: i64,
    pub date: NaiveDate,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlackoutsResponse {
    pub lawyer_id: i64,
    pub blackouts: Vec<BlackoutInfo>,
}

/// Liveness check payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub civil_timezone: String,
}
