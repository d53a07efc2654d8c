// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking engine.
//!
//! ## Lifecycle
//!
//! | From      | To        | Caller        |
//! |-----------|-----------|---------------|
//! | (new)     | pending   | client        |
//! | pending   | confirmed | owning lawyer |
//! | pending   | rejected  | owning lawyer |
//! | pending   | cancelled | owning client |
//! | confirmed | cancelled | owning client |
//! | confirmed | completed | owning lawyer |
//!
//! Leaving `pending`/`confirmed` for a terminal state clears `blocks_time`,
//! so the range can be booked again.
//!
//! ## Overlap exclusion
//!
//! The store rejects any insert that would make two blocking bookings on
//! the same lawyer and branch intersect. Under
//! [`OverlapEnforcement::SerializableRecheck`] the engine also looks for a
//! conflicting booking inside the same transaction before inserting, so the
//! caller learns which booking is in the way.

use crate::authz::{Actor, Privilege};
use crate::config::OverlapEnforcement;
use crate::context::OperationContext;
use crate::error::CoreError;
use crate::ports::{Repositories, UnitOfWork};
use crate::resolver::{require_lawyer, resolve_availability};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use docket_domain::{
    AvailabilityInterval, Booking, BookingStatus, Interval, NewBooking, Role, validate_instant,
};
use serde::Deserialize;
use tracing::info;

/// Longest note accepted on a booking.
const MAX_NOTE_CHARS: usize = 2000;

/// A client's booking request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBookingRequest {
    pub lawyer_id: i64,
    pub branch_id: Option<i64>,
    pub case_id: i64,
    pub service_package_id: Option<i64>,
    pub scheduled_at_utc: DateTime<Utc>,
    pub note: Option<String>,
}

/// Creates a pending booking.
///
/// Preconditions are checked in order: case ownership, blackout day,
/// containment in a single resolved availability interval, then overlap.
/// All checks and the insert share one serializable transaction.
///
/// The start is truncated to whole microseconds, the precision the store
/// keeps, before any check. The booking takes the branch of the interval
/// that contains it, so a booking inside a branchless template is stored
/// without a branch even when one was requested.
///
/// # Errors
///
/// - `Forbidden` if the caller may not create bookings
/// - `NotFound` for an unknown lawyer, branch or case
/// - `CaseMismatch` if the case belongs to another client
/// - `ValidationFailed` for an unknown package, a blackout day, an
///   unsupported date, or a time outside availability
/// - `ConflictOverlap` if an active booking intersects the range
pub fn create_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &CreateBookingRequest,
) -> Result<Booking, CoreError> {
    ctx.require(actor, Privilege::BookingCreate)?;

    if let Some(note) = &request.note
        && note.chars().count() > MAX_NOTE_CHARS
    {
        return Err(CoreError::ValidationFailed(format!(
            "note exceeds {MAX_NOTE_CHARS} characters"
        )));
    }

    let scheduled_at = request.scheduled_at_utc.trunc_subsecs(6);
    validate_instant(scheduled_at)?;

    let tz = *ctx.tz();
    let enforcement = ctx.config.booking_overlap_enforcement;
    let now = ctx.now;

    let booking = uow.write(ctx.deadline, |repos| {
        require_lawyer(repos, request.lawyer_id)?;

        if let Some(branch_id) = request.branch_id {
            let branch = repos
                .get_branch(branch_id)?
                .ok_or_else(|| CoreError::not_found("branch", branch_id))?;
            if branch.owner_lawyer_id != request.lawyer_id {
                return Err(CoreError::ValidationFailed(format!(
                    "branch {branch_id} does not belong to lawyer {}",
                    request.lawyer_id
                )));
            }
        }

        let case = repos
            .get_case(request.case_id)?
            .ok_or_else(|| CoreError::not_found("case", request.case_id))?;
        if case.client_id != actor.user_id {
            return Err(CoreError::CaseMismatch {
                case_id: request.case_id,
            });
        }

        let duration = package_duration(repos, request)?;
        let range = Interval::starting_at(scheduled_at, duration)?;
        validate_instant(range.end())?;

        let date_local = tz.local_date_of(range.start());
        if !repos
            .list_blackouts(request.lawyer_id, date_local, date_local)?
            .is_empty()
        {
            return Err(CoreError::ValidationFailed(format!(
                "lawyer {} is unavailable on {date_local}",
                request.lawyer_id
            )));
        }

        let availability =
            resolve_availability(repos, request.lawyer_id, date_local, request.branch_id, &tz)?;
        let branch_id = fit_into_availability(&availability, &range, request.branch_id)?;

        if enforcement == OverlapEnforcement::SerializableRecheck && !range.is_empty() {
            let conflict = repos
                .list_active_for_lawyer_between(request.lawyer_id, range.start(), range.end())?
                .into_iter()
                .find(|b| b.branch_id == branch_id && b.is_blocking() && b.range().overlaps(&range));
            if let Some(existing) = conflict {
                return Err(CoreError::ConflictOverlap(format!(
                    "booking {} already occupies {} to {}",
                    existing.id, existing.scheduled_at_utc, existing.ends_at_utc
                )));
            }
        }

        let booking = repos.insert_pending(&NewBooking {
            client_id: actor.user_id,
            lawyer_id: request.lawyer_id,
            branch_id,
            case_id: request.case_id,
            service_package_id: request.service_package_id,
            scheduled_at_utc: range.start(),
            ends_at_utc: range.end(),
            note: request.note.clone(),
            created_at: now,
        })?;
        Ok(booking)
    })?;

    info!(
        booking_id = booking.id,
        lawyer_id = booking.lawyer_id,
        client_id = booking.client_id,
        branch_id = ?booking.branch_id,
        scheduled_at = %booking.scheduled_at_utc,
        "Created pending booking"
    );
    Ok(booking)
}

fn package_duration(
    repos: &mut dyn Repositories,
    request: &CreateBookingRequest,
) -> Result<Duration, CoreError> {
    let Some(package_id) = request.service_package_id else {
        return Ok(Duration::zero());
    };
    let package = repos
        .get_service_package(package_id)?
        .ok_or_else(|| {
            CoreError::ValidationFailed(format!("unknown service package {package_id}"))
        })?;
    if !package.active || package.lawyer_id != request.lawyer_id {
        return Err(CoreError::ValidationFailed(format!(
            "service package {package_id} is not offered by lawyer {}",
            request.lawyer_id
        )));
    }
    Ok(Duration::minutes(i64::from(package.duration_minutes)))
}

/// Finds the one availability interval serving `branch_id` that holds all
/// of `range`, and returns that interval's branch.
///
/// Touching intervals are not merged: a booking may not straddle two
/// templates.
fn fit_into_availability(
    availability: &[AvailabilityInterval],
    range: &Interval,
    branch_id: Option<i64>,
) -> Result<Option<i64>, CoreError> {
    availability
        .iter()
        .filter(|a| a.serves_branch(branch_id))
        .find(|a| a.interval().contains(range))
        .map(|a| a.branch_id)
        .ok_or_else(|| {
            CoreError::ValidationFailed(format!(
                "{} to {} is outside the lawyer's availability",
                range.start(),
                range.end()
            ))
        })
}

/// Confirms a pending booking. Lawyer owner only.
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden` or `InvalidTransition`.
pub fn confirm_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<Booking, CoreError> {
    transition(uow, ctx, actor, booking_id, BookingStatus::Confirmed)
}

/// Rejects a pending booking and frees its range. Lawyer owner only.
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden` or `InvalidTransition`.
pub fn reject_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<Booking, CoreError> {
    transition(uow, ctx, actor, booking_id, BookingStatus::Rejected)
}

/// Cancels a pending or confirmed booking and frees its range. Client owner only.
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden` or `InvalidTransition`.
pub fn cancel_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<Booking, CoreError> {
    transition(uow, ctx, actor, booking_id, BookingStatus::Cancelled)
}

/// Completes a confirmed booking. Lawyer owner only.
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden` or `InvalidTransition`.
pub fn complete_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<Booking, CoreError> {
    transition(uow, ctx, actor, booking_id, BookingStatus::Completed)
}

fn transition<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
    target: BookingStatus,
) -> Result<Booking, CoreError> {
    let (privilege, owner_is_client) = match target {
        BookingStatus::Confirmed => (Privilege::BookingConfirm, false),
        BookingStatus::Rejected => (Privilege::BookingReject, false),
        BookingStatus::Cancelled => (Privilege::BookingCancel, true),
        BookingStatus::Completed => (Privilege::BookingComplete, false),
        BookingStatus::Pending => {
            return Err(CoreError::Internal(String::from(
                "bookings cannot be moved back to pending",
            )));
        }
    };
    ctx.require(actor, privilege)?;
    let now = ctx.now;

    let (from, booking) = uow.write(ctx.deadline, |repos| {
        let booking = repos
            .get_booking(booking_id)?
            .ok_or_else(|| CoreError::not_found("booking", booking_id))?;

        let owner = if owner_is_client {
            booking.client_id
        } else {
            booking.lawyer_id
        };
        if owner != actor.user_id {
            return Err(CoreError::forbidden(
                privilege.as_str(),
                "caller does not own this booking",
            ));
        }

        booking.status.validate_transition(target)?;

        if !target.blocks_time() {
            repos.set_blocks_time(booking_id, false, now)?;
        }
        let updated = repos.update_status(booking_id, target, now)?;
        Ok((booking.status, updated))
    })?;

    info!(
        booking_id,
        actor_id = actor.user_id,
        from = from.as_str(),
        to = target.as_str(),
        blocks_time = booking.blocks_time,
        "Booking status changed"
    );
    Ok(booking)
}

/// Lists the caller's bookings: as lawyer when the caller is a lawyer,
/// as client otherwise.
///
/// # Errors
///
/// Returns `Forbidden` if the caller may not read bookings.
pub fn list_my_bookings<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
) -> Result<Vec<Booking>, CoreError> {
    ctx.require(actor, Privilege::BookingRead)?;
    uow.read(ctx.deadline, |repos| {
        if actor.role == Role::Lawyer {
            Ok(repos.list_for_lawyer(actor.user_id, None)?)
        } else {
            Ok(repos.list_for_client(actor.user_id)?)
        }
    })
}

/// Lists pending bookings assigned to the calling lawyer.
///
/// # Errors
///
/// Returns `Forbidden` if the caller cannot confirm bookings.
pub fn lawyer_incoming_bookings<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
) -> Result<Vec<Booking>, CoreError> {
    ctx.require(actor, Privilege::BookingConfirm)?;
    uow.read(ctx.deadline, |repos| {
        Ok(repos.list_for_lawyer(actor.user_id, Some(BookingStatus::Pending))?)
    })
}
