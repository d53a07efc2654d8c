// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Boundary layer between transports and the scheduling engines.
//!
//! Callers are authenticated once, every operation returns a response DTO,
//! and every failure is an [`ApiError`] with a stable code.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::AuthenticationService;
pub use error::{ApiError, ErrorBody, translate_core_error};
pub use handlers::{
    cancel_booking, complete_booking, confirm_booking, create_availability_exception,
    create_blackout_day, create_booking, create_weekly_template, deactivate_weekly_template,
    delete_blackout_day, generate_today_queue, health, lawyer_incoming_bookings,
    list_availability, list_blackout_days, list_bookable_slots, list_my_bookings,
    list_today_queue, list_weekly_templates, reject_booking, update_queue_entry,
};
pub use request_response::{
    AvailabilityIntervalInfo, AvailabilityQuery, BlackoutInfo, BlackoutRangeQuery,
    BlackoutResponse, BookingInfo, BookingResponse, CreateBlackoutRequest, CreateBookingRequest,
    CreateExceptionRequest, CreateTemplateRequest, DeleteBlackoutResponse, ExceptionInfo,
    ExceptionResponse, GenerateQueueRequest, HealthResponse, ListAvailabilityResponse,
    ListBlackoutsResponse, ListBookingsResponse, ListSlotsResponse, ListTemplatesResponse,
    QueueEntryInfo, QueueEntryResponse, QueueQuery, QueueResponse, SlotInfo, SlotsQuery,
    TemplateInfo, TemplateResponse, TemplatesQuery, UpdateQueueEntryRequest,
};
