// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Token queue engine.
//!
//! ## Invariants
//!
//! - Tokens for a `(lawyer, date_local)` are exactly `1..=N`
//! - Generation only appends; existing entries are never renumbered
//! - A client appears at most once per lawyer and day
//! - Generating twice with unchanged bookings adds nothing

use crate::authz::{Actor, Privilege};
use crate::context::OperationContext;
use crate::error::CoreError;
use crate::ports::{Repositories, UnitOfWork};
use chrono::NaiveDate;
use docket_domain::{
    BookingStatus, CivilTimezone, NewQueueEntry, QueueEntry, QueueStatus, RequestedQueueStatus,
    local_day_to_utc_window, validate_civil_date,
};
use std::collections::HashSet;
use tracing::{info, warn};

/// Attempts made when a concurrent generator takes the same token number.
pub const MAX_TOKEN_RETRIES: u32 = 3;

/// Appends newly confirmed bookings of the day to the caller's queue.
///
/// Bookings are taken in `scheduled_at_utc` order, ties broken by id.
/// `date_local` defaults to today in the civil timezone.
///
/// # Returns
///
/// The full queue for the day, ordered by token number.
///
/// # Errors
///
/// Returns `Forbidden`, `ValidationFailed` for an unsupported date, or
/// `ConflictToken` after `MAX_TOKEN_RETRIES` conflicting attempts.
pub fn generate_today_queue<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    date_local: Option<NaiveDate>,
) -> Result<Vec<QueueEntry>, CoreError> {
    ctx.require(actor, Privilege::QueueGenerate)?;
    let tz = *ctx.tz();
    let date = date_local.unwrap_or_else(|| tz.local_date_of(ctx.now));
    validate_civil_date(date)?;
    let lawyer_id = actor.user_id;

    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = uow.write(ctx.deadline, |repos| {
            append_confirmed_bookings(repos, lawyer_id, date, &tz)
        });
        match result {
            Ok((added, entries)) => {
                info!(
                    lawyer_id,
                    %date,
                    added,
                    total = entries.len(),
                    attempt,
                    "Generated queue"
                );
                return Ok(entries);
            }
            Err(CoreError::ConflictToken(msg)) if attempt < MAX_TOKEN_RETRIES => {
                warn!(lawyer_id, %date, attempt, error = %msg, "Token conflict, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

fn append_confirmed_bookings(
    repos: &mut dyn Repositories,
    lawyer_id: i64,
    date: NaiveDate,
    tz: &CivilTimezone,
) -> Result<(usize, Vec<QueueEntry>), CoreError> {
    let day = local_day_to_utc_window(date, tz)?;
    let bookings = repos.list_for_lawyer_starting_between(
        lawyer_id,
        BookingStatus::Confirmed,
        day.start(),
        day.end(),
    )?;

    let mut enqueued: HashSet<i64> = repos
        .list_for_day(lawyer_id, date)?
        .iter()
        .map(|e| e.client_id)
        .collect();
    let mut next_token = repos.max_token_number(lawyer_id, date)? + 1;

    let mut ordered = bookings;
    ordered.sort_by_key(|b| (b.scheduled_at_utc, b.id));

    let mut added = 0;
    for booking in ordered {
        if !enqueued.insert(booking.client_id) {
            continue;
        }
        let entry = repos.insert_entry(&NewQueueEntry {
            date_local: date,
            lawyer_id,
            client_id: booking.client_id,
            booking_id: Some(booking.id),
            token_number: next_token,
            scheduled_time_local: Some(tz.local_time_of(booking.scheduled_at_utc)),
            branch_id: booking.branch_id,
        })?;
        info!(
            queue_entry_id = entry.id,
            booking_id = booking.id,
            token_number = entry.token_number,
            "Issued token"
        );
        next_token += 1;
        added += 1;
    }

    Ok((added, repos.list_for_day(lawyer_id, date)?))
}

/// Lists the caller's queue for a day, ordered by token number.
///
/// # Errors
///
/// Returns `Forbidden` if the caller may not read queues, or
/// `ValidationFailed` for an unsupported date.
pub fn list_today_queue<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    date_local: Option<NaiveDate>,
    status_filter: Option<QueueStatus>,
) -> Result<Vec<QueueEntry>, CoreError> {
    ctx.require(actor, Privilege::QueueRead)?;
    let date = date_local.unwrap_or_else(|| ctx.tz().local_date_of(ctx.now));
    validate_civil_date(date)?;
    uow.read(ctx.deadline, |repos| {
        let mut entries = repos.list_for_day(actor.user_id, date)?;
        if let Some(status) = status_filter {
            entries.retain(|e| e.status == status);
        }
        Ok(entries)
    })
}

/// Moves a queue entry through its lifecycle.
///
/// `in_progress` stamps `started_at`; `completed` stamps `completed_at`.
/// `no_show` and `cancelled` leave timestamps untouched. `notes` replaces
/// the stored reason when given.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound`, `ValidationFailed` for an unknown status
/// string, or `InvalidTransition`.
pub fn update_queue_entry<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    entry_id: i64,
    status: &str,
    notes: Option<String>,
) -> Result<QueueEntry, CoreError> {
    ctx.require(actor, Privilege::QueueUpdate)?;
    let requested =
        RequestedQueueStatus::parse(status, ctx.config.queue_status_alias_served_completed)?;
    let now = ctx.now;

    let (from, entry) = uow.write(ctx.deadline, |repos| {
        let entry = repos
            .get_entry(entry_id)?
            .ok_or_else(|| CoreError::not_found("queue entry", entry_id))?;
        if entry.lawyer_id != actor.user_id {
            return Err(CoreError::forbidden(
                Privilege::QueueUpdate.as_str(),
                "caller does not own this queue entry",
            ));
        }

        entry.status.validate_transition(requested)?;

        let started_at = if requested.status == QueueStatus::InProgress {
            Some(now)
        } else {
            entry.started_at
        };
        let completed_at = if requested.status == QueueStatus::Completed {
            Some(now)
        } else {
            entry.completed_at
        };

        let updated = repos.update_status_and_timestamps(
            entry_id,
            requested.status,
            started_at,
            completed_at,
            notes.or_else(|| entry.reason.clone()),
        )?;
        Ok((entry.status, updated))
    })?;

    info!(
        queue_entry_id = entry_id,
        token_number = entry.token_number,
        from = from.as_str(),
        to = entry.status.as_str(),
        legacy_served = requested.legacy_served,
        "Queue entry status changed"
    );
    Ok(entry)
}
