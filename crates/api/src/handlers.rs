// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operation handlers.
//!
//! Each handler takes an authenticated [`Actor`], runs one engine operation
//! and shapes the result into its response DTO. Every failure leaves the
//! handler as an [`ApiError`].

use docket::{
    Actor, CoreError, OperationContext, UnitOfWork, cancel_booking as core_cancel_booking,
    complete_booking as core_complete_booking, confirm_booking as core_confirm_booking,
    create_availability_exception as core_create_availability_exception,
    create_blackout_day as core_create_blackout_day, create_booking as core_create_booking,
    create_weekly_template as core_create_weekly_template,
    deactivate_weekly_template as core_deactivate_weekly_template,
    delete_blackout_day as core_delete_blackout_day,
    generate_today_queue as core_generate_today_queue,
    lawyer_incoming_bookings as core_lawyer_incoming_bookings,
    list_availability as core_list_availability,
    list_blackout_days as core_list_blackout_days,
    list_bookable_slots as core_list_bookable_slots, list_my_bookings as core_list_my_bookings,
    list_today_queue as core_list_today_queue, list_weekly_templates as core_list_weekly_templates,
    reject_booking as core_reject_booking, update_queue_entry as core_update_queue_entry,
};
use chrono::NaiveDate;
use docket_domain::{Booking, QueueEntry, QueueStatus, RequestedQueueStatus};
use tracing::debug;

use crate::error::{ApiError, translate_core_error};
use crate::request_response::{
    AvailabilityQuery, BlackoutRangeQuery, BlackoutResponse, BookingInfo, BookingResponse,
    CreateBlackoutRequest, CreateBookingRequest, CreateExceptionRequest, CreateTemplateRequest,
    DeleteBlackoutResponse, ExceptionResponse, GenerateQueueRequest, HealthResponse,
    ListAvailabilityResponse, ListBlackoutsResponse, ListBookingsResponse, ListSlotsResponse,
    ListTemplatesResponse, QueueEntryInfo, QueueEntryResponse, QueueQuery, QueueResponse,
    SlotsQuery, TemplateResponse, TemplatesQuery, UpdateQueueEntryRequest,
};

fn booking_response(booking: Booking, verb: &str) -> BookingResponse {
    let message = format!("Booking {} {verb}", booking.id);
    BookingResponse {
        booking: BookingInfo::from(booking),
        message,
    }
}

fn list_bookings(bookings: Vec<Booking>) -> ListBookingsResponse {
    ListBookingsResponse {
        bookings: bookings.into_iter().map(BookingInfo::from).collect(),
    }
}

fn queue_response(
    lawyer_id: i64,
    date: NaiveDate,
    entries: Vec<QueueEntry>,
) -> QueueResponse {
    QueueResponse {
        lawyer_id,
        date,
        entries: entries.into_iter().map(QueueEntryInfo::from).collect(),
    }
}

/// Creates a pending booking for the calling client.
///
/// # Arguments
///
/// * `uow` - The store
/// * `ctx` - Configuration, clock and deadline for this request
/// * `actor` - The authenticated caller
/// * `request` - The booking request
///
/// # Errors
///
/// Returns `CONFLICT_OVERLAP`, `VALIDATION_FAILED`, `FORBIDDEN`, `NOT_FOUND`
/// or `CASE_MISMATCH`.
pub fn create_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &CreateBookingRequest,
) -> Result<BookingResponse, ApiError> {
    let booking = core_create_booking(uow, ctx, actor, request).map_err(translate_core_error)?;
    Ok(booking_response(booking, "created"))
}

/// Confirms a pending booking.
///
/// # Errors
///
/// Returns `INVALID_TRANSITION`, `FORBIDDEN` or `NOT_FOUND`.
pub fn confirm_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<BookingResponse, ApiError> {
    let booking =
        core_confirm_booking(uow, ctx, actor, booking_id).map_err(translate_core_error)?;
    Ok(booking_response(booking, "confirmed"))
}

/// Rejects a pending booking.
///
/// # Errors
///
/// Returns `INVALID_TRANSITION`, `FORBIDDEN` or `NOT_FOUND`.
pub fn reject_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<BookingResponse, ApiError> {
    let booking = core_reject_booking(uow, ctx, actor, booking_id).map_err(translate_core_error)?;
    Ok(booking_response(booking, "rejected"))
}

/// Cancels one of the caller's bookings.
///
/// # Errors
///
/// Returns `INVALID_TRANSITION`, `FORBIDDEN` or `NOT_FOUND`.
pub fn cancel_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<BookingResponse, ApiError> {
    let booking = core_cancel_booking(uow, ctx, actor, booking_id).map_err(translate_core_error)?;
    Ok(booking_response(booking, "cancelled"))
}

/// Completes a confirmed booking.
///
/// # Errors
///
/// Returns `INVALID_TRANSITION`, `FORBIDDEN` or `NOT_FOUND`.
pub fn complete_booking<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    booking_id: i64,
) -> Result<BookingResponse, ApiError> {
    let booking =
        core_complete_booking(uow, ctx, actor, booking_id).map_err(translate_core_error)?;
    Ok(booking_response(booking, "completed"))
}

/// Lists the caller's bookings.
///
/// # Errors
///
/// Returns `FORBIDDEN` if the caller may not read bookings.
pub fn list_my_bookings<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
) -> Result<ListBookingsResponse, ApiError> {
    let bookings = core_list_my_bookings(uow, ctx, actor).map_err(translate_core_error)?;
    Ok(list_bookings(bookings))
}

/// Lists pending bookings waiting on the calling lawyer.
///
/// # Errors
///
/// Returns `FORBIDDEN` for non-lawyers.
pub fn lawyer_incoming_bookings<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
) -> Result<ListBookingsResponse, ApiError> {
    let bookings =
        core_lawyer_incoming_bookings(uow, ctx, actor).map_err(translate_core_error)?;
    Ok(list_bookings(bookings))
}

/// Lists a lawyer's availability intervals on a local date.
///
/// # Errors
///
/// Returns `FORBIDDEN`, `NOT_FOUND` or `VALIDATION_FAILED`.
pub fn list_availability<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    query: &AvailabilityQuery,
) -> Result<ListAvailabilityResponse, ApiError> {
    let intervals =
        core_list_availability(uow, ctx, actor, query.lawyer_id, query.date, query.branch_id)
            .map_err(translate_core_error)?;
    Ok(ListAvailabilityResponse {
        lawyer_id: query.lawyer_id,
        date: query.date,
        intervals: intervals.into_iter().map(Into::into).collect(),
    })
}

/// Lists bookable slots for a service package on a local date.
///
/// # Errors
///
/// Returns `FORBIDDEN`, `NOT_FOUND` or `VALIDATION_FAILED`.
pub fn list_bookable_slots<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    query: &SlotsQuery,
) -> Result<ListSlotsResponse, ApiError> {
    let slots = core_list_bookable_slots(
        uow,
        ctx,
        actor,
        query.lawyer_id,
        query.date,
        query.service_package_id,
        query.branch_id,
    )
    .map_err(translate_core_error)?;
    Ok(ListSlotsResponse {
        lawyer_id: query.lawyer_id,
        date: query.date,
        service_package_id: query.service_package_id,
        slots: slots.into_iter().map(Into::into).collect(),
    })
}

/// Issues tokens for the calling lawyer's confirmed bookings of the day.
///
/// # Errors
///
/// Returns `FORBIDDEN` or `CONFLICT_TOKEN` once retries are exhausted.
pub fn generate_today_queue<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &GenerateQueueRequest,
) -> Result<QueueResponse, ApiError> {
    let date = request
        .date
        .unwrap_or_else(|| ctx.tz().local_date_of(ctx.now));
    let entries =
        core_generate_today_queue(uow, ctx, actor, Some(date)).map_err(translate_core_error)?;
    Ok(queue_response(actor.user_id, date, entries))
}

/// Lists the calling lawyer's queue for a day.
///
/// # Errors
///
/// Returns `FORBIDDEN`, or `VALIDATION_FAILED` for an unknown status filter.
pub fn list_today_queue<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    query: &QueueQuery,
) -> Result<QueueResponse, ApiError> {
    let status_filter: Option<QueueStatus> = query
        .status
        .as_deref()
        .map(|raw| {
            RequestedQueueStatus::parse(raw, ctx.config.queue_status_alias_served_completed)
                .map(|requested| requested.status)
                .map_err(|e| translate_core_error(CoreError::from(e)))
        })
        .transpose()?;
    let date = query
        .date
        .unwrap_or_else(|| ctx.tz().local_date_of(ctx.now));
    debug!(actor_id = actor.user_id, %date, ?status_filter, "Listing queue");

    let entries = core_list_today_queue(uow, ctx, actor, Some(date), status_filter)
        .map_err(translate_core_error)?;
    Ok(queue_response(actor.user_id, date, entries))
}

/// Moves a queue entry to a new status.
///
/// # Errors
///
/// Returns `FORBIDDEN`, `NOT_FOUND`, `VALIDATION_FAILED` or
/// `INVALID_TRANSITION`.
pub fn update_queue_entry<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    entry_id: i64,
    request: &UpdateQueueEntryRequest,
) -> Result<QueueEntryResponse, ApiError> {
    let entry = core_update_queue_entry(
        uow,
        ctx,
        actor,
        entry_id,
        &request.status,
        request.notes.clone(),
    )
    .map_err(translate_core_error)?;
    let message = format!("Token {} is now {}", entry.token_number, entry.status);
    Ok(QueueEntryResponse {
        entry: QueueEntryInfo::from(entry),
        message,
    })
}

/// Publishes a weekly template for the calling lawyer.
///
/// # Errors
///
/// Returns `FORBIDDEN`, `NOT_FOUND` or `VALIDATION_FAILED`.
pub fn create_weekly_template<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &CreateTemplateRequest,
) -> Result<TemplateResponse, ApiError> {
    let template =
        core_create_weekly_template(uow, ctx, actor, request).map_err(translate_core_error)?;
    let message = format!("Template {} created", template.id);
    Ok(TemplateResponse {
        template: template.into(),
        message,
    })
}

/// Deactivates one of the caller's templates.
///
/// # Errors
///
/// Returns `FORBIDDEN` or `NOT_FOUND`.
pub fn deactivate_weekly_template<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    template_id: i64,
) -> Result<TemplateResponse, ApiError> {
    let template = core_deactivate_weekly_template(uow, ctx, actor, template_id)
        .map_err(translate_core_error)?;
    let message = format!("Template {} deactivated", template.id);
    Ok(TemplateResponse {
        template: template.into(),
        message,
    })
}

/// Lists every template of a lawyer, active or not.
///
/// # Errors
///
/// Returns `FORBIDDEN` or `NOT_FOUND`.
pub fn list_weekly_templates<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    query: &TemplatesQuery,
) -> Result<ListTemplatesResponse, ApiError> {
    let templates = core_list_weekly_templates(uow, ctx, actor, query.lawyer_id)
        .map_err(translate_core_error)?;
    Ok(ListTemplatesResponse {
        lawyer_id: query.lawyer_id,
        templates: templates.into_iter().map(Into::into).collect(),
    })
}

/// Overrides or cancels a single template occurrence.
///
/// # Errors
///
/// Returns `FORBIDDEN`, `NOT_FOUND` or `VALIDATION_FAILED`.
pub fn create_availability_exception<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &CreateExceptionRequest,
) -> Result<ExceptionResponse, ApiError> {
    let exception = core_create_availability_exception(uow, ctx, actor, request)
        .map_err(translate_core_error)?;
    let message = format!(
        "Exception {} created for template {} on {}",
        exception.id, exception.template_id, exception.date
    );
    Ok(ExceptionResponse {
        exception: exception.into(),
        message,
    })
}

/// Blacks out a local date for the calling lawyer.
///
/// # Errors
///
/// Returns `FORBIDDEN` or `VALIDATION_FAILED`.
pub fn create_blackout_day<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &CreateBlackoutRequest,
) -> Result<BlackoutResponse, ApiError> {
    let blackout = core_create_blackout_day(uow, ctx, actor, request.date, request.reason.clone())
        .map_err(translate_core_error)?;
    let message = format!("{} blacked out", blackout.date);
    Ok(BlackoutResponse {
        blackout: blackout.into(),
        message,
    })
}

/// Removes a blackout day of the calling lawyer.
///
/// # Errors
///
/// Returns `FORBIDDEN` or `NOT_FOUND`.
pub fn delete_blackout_day<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    date: NaiveDate,
) -> Result<DeleteBlackoutResponse, ApiError> {
    core_delete_blackout_day(uow, ctx, actor, date).map_err(translate_core_error)?;
    Ok(DeleteBlackoutResponse {
        lawyer_id: actor.user_id,
        date,
        message: format!("Blackout on {date} removed"),
    })
}

/// Lists a lawyer's blackout days in an inclusive date range.
///
/// # Errors
///
/// Returns `FORBIDDEN`, `NOT_FOUND` or `VALIDATION_FAILED`.
pub fn list_blackout_days<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    query: &BlackoutRangeQuery,
) -> Result<ListBlackoutsResponse, ApiError> {
    let blackouts =
        core_list_blackout_days(uow, ctx, actor, query.lawyer_id, query.from, query.to)
            .map_err(translate_core_error)?;
    Ok(ListBlackoutsResponse {
        lawyer_id: query.lawyer_id,
        blackouts: blackouts.into_iter().map(Into::into).collect(),
    })
}

/// Liveness report.
#[must_use]
pub fn health(ctx: &OperationContext<'_>) -> HealthResponse {
    HealthResponse {
        status: String::from("ok"),
        civil_timezone: ctx.tz().name().to_string(),
    }
}
