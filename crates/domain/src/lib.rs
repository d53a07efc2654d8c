// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod availability;
mod booking_status;
mod civil_time;
mod error;
mod interval;
mod queue_status;
mod slots;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityInterval, resolve_day_availability};
pub use booking_status::BookingStatus;
pub use civil_time::{
    CivilTimezone, DEFAULT_CIVIL_TIMEZONE, MAX_CIVIL_YEAR, MIN_CIVIL_YEAR, local_day_to_utc_window,
    validate_civil_date, validate_instant,
};
pub use error::DomainError;
pub use interval::{Interval, clamp_to_day, intersect, subtract, union};
pub use queue_status::{QueueStatus, RequestedQueueStatus};
pub use slots::{Slot, generate_slots};

// Re-export public types
pub use types::{
    AvailabilityException, BlackoutDay, Booking, Branch, CaseRef, NewAvailabilityException,
    NewBlackoutDay, NewBooking, NewQueueEntry, NewWeeklyTemplate, QueueEntry, Role,
    ServicePackage, User, WeeklyAvailabilityTemplate,
};
pub use validation::{
    find_overlapping_template, validate_exception_overrides, validate_local_range,
    validate_slot_minutes,
};
