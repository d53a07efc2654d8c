// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability resolution and bookable slot listing over the store.

use crate::authz::{Actor, Privilege};
use crate::context::OperationContext;
use crate::error::CoreError;
use crate::ports::{Repositories, UnitOfWork};
use chrono::{Datelike, NaiveDate};
use docket_domain::{
    AvailabilityInterval, CivilTimezone, Interval, Role, Slot, generate_slots,
    local_day_to_utc_window, resolve_day_availability,
};
use tracing::debug;

/// Resolves a lawyer's availability for a local date inside an open transaction.
///
/// # Errors
///
/// Returns `CoreError::DomainViolation(InvalidTemplate)` for malformed stored
/// rows, or a store error.
pub fn resolve_availability(
    repos: &mut dyn Repositories,
    lawyer_id: i64,
    date_local: NaiveDate,
    branch_filter: Option<i64>,
    tz: &CivilTimezone,
) -> Result<Vec<AvailabilityInterval>, CoreError> {
    let templates = repos.list_templates(lawyer_id, date_local.weekday())?;
    let exceptions = repos.list_exceptions(lawyer_id, date_local)?;
    let blackouts = repos.list_blackouts(lawyer_id, date_local, date_local)?;

    let intervals = resolve_day_availability(
        date_local,
        &templates,
        &exceptions,
        &blackouts,
        branch_filter,
        tz,
    )?;

    debug!(
        lawyer_id,
        %date_local,
        templates = templates.len(),
        intervals = intervals.len(),
        "Resolved availability"
    );
    Ok(intervals)
}

pub(crate) fn require_lawyer(
    repos: &mut dyn Repositories,
    lawyer_id: i64,
) -> Result<(), CoreError> {
    match repos.get_user(lawyer_id)? {
        Some(user) if user.role == Role::Lawyer => Ok(()),
        _ => Err(CoreError::not_found("lawyer", lawyer_id)),
    }
}

/// Lists a lawyer's availability intervals on a local date.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound` for an unknown lawyer, or a resolution error.
pub fn list_availability<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    lawyer_id: i64,
    date_local: NaiveDate,
    branch_id: Option<i64>,
) -> Result<Vec<AvailabilityInterval>, CoreError> {
    ctx.require(actor, Privilege::AvailabilityRead)?;
    let tz = *ctx.tz();
    uow.read(ctx.deadline, |repos| {
        require_lawyer(repos, lawyer_id)?;
        resolve_availability(repos, lawyer_id, date_local, branch_id, &tz)
    })
}

/// Lists the slots still bookable for a service package on a local date.
///
/// Every blocking booking of the lawyer that day is busy time, whatever its
/// branch.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound` for an unknown lawyer, `ValidationFailed`
/// for an unknown, inactive or foreign package, or a resolution error.
pub fn list_bookable_slots<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    lawyer_id: i64,
    date_local: NaiveDate,
    service_package_id: i64,
    branch_id: Option<i64>,
) -> Result<Vec<Slot>, CoreError> {
    ctx.require(actor, Privilege::AvailabilityRead)?;
    let tz = *ctx.tz();
    let step = ctx.config.default_slot_step_minutes;

    uow.read(ctx.deadline, |repos| {
        require_lawyer(repos, lawyer_id)?;
        let package = repos
            .get_service_package(service_package_id)?
            .filter(|p| p.active && p.lawyer_id == lawyer_id)
            .ok_or_else(|| {
                CoreError::ValidationFailed(format!(
                    "unknown service package {service_package_id} for lawyer {lawyer_id}"
                ))
            })?;

        let available: Vec<Interval> =
            resolve_availability(repos, lawyer_id, date_local, branch_id, &tz)?
                .iter()
                .map(AvailabilityInterval::interval)
                .collect();

        let day = local_day_to_utc_window(date_local, &tz)?;
        let busy: Vec<Interval> = repos
            .list_active_for_lawyer_between(lawyer_id, day.start(), day.end())?
            .iter()
            .filter(|b| b.is_blocking())
            .map(docket_domain::Booking::range)
            .collect();

        let slots = generate_slots(&available, &busy, package.duration_minutes, step)?;
        debug!(
            lawyer_id,
            %date_local,
            service_package_id,
            busy = busy.len(),
            slots = slots.len(),
            "Listed bookable slots"
        );
        Ok(slots)
    })
}
