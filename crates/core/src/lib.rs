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

mod authz;
mod availability_admin;
mod booking;
mod config;
mod context;
mod deadline;
mod error;
mod ports;
mod queue;
mod resolver;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use authz::{Actor, Authorizer, Privilege, RolePolicy};
pub use availability_admin::{
    CreateExceptionRequest, CreateTemplateRequest, create_availability_exception,
    create_blackout_day, create_weekly_template, deactivate_weekly_template, delete_blackout_day,
    list_blackout_days, list_weekly_templates,
};
pub use booking::{
    CreateBookingRequest, cancel_booking, complete_booking, confirm_booking, create_booking,
    lawyer_incoming_bookings, list_my_bookings, reject_booking,
};
pub use config::{OverlapEnforcement, SchedulingConfig};
pub use context::OperationContext;
pub use deadline::Deadline;
pub use error::{CoreError, ErrorCode};
pub use ports::{
    AvailabilityRepo, BookingRepo, DirectoryRepo, QueueRepo, RepoError, Repositories, UnitOfWork,
};
pub use queue::{MAX_TOKEN_RETRIES, generate_today_queue, list_today_queue, update_queue_entry};
pub use resolver::{list_availability, list_bookable_slots, resolve_availability};
