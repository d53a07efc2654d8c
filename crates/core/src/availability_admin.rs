// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write path for weekly templates, exceptions and blackout days.
//!
//! Malformed local ranges are rejected here so the resolver never meets
//! them in normal operation.

use crate::authz::{Actor, Privilege};
use crate::context::OperationContext;
use crate::error::CoreError;
use crate::ports::{Repositories, UnitOfWork};
use crate::resolver::require_lawyer;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use docket_domain::{
    AvailabilityException, BlackoutDay, DomainError, NewAvailabilityException, NewBlackoutDay,
    NewWeeklyTemplate, WeeklyAvailabilityTemplate, find_overlapping_template,
    validate_civil_date, validate_exception_overrides, validate_local_range,
    validate_slot_minutes,
};
use serde::Deserialize;
use tracing::info;

/// Longest blackout reason accepted.
const MAX_REASON_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTemplateRequest {
    pub branch_id: Option<i64>,
    pub weekday: Weekday,
    pub start_local_time: NaiveTime,
    pub end_local_time: NaiveTime,
    pub slot_minutes: u32,
    pub max_bookings: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateExceptionRequest {
    pub template_id: i64,
    pub date: NaiveDate,
    pub override_start: Option<NaiveTime>,
    pub override_end: Option<NaiveTime>,
    pub override_max_bookings: Option<u32>,
}

fn require_branch_owner(
    repos: &mut dyn Repositories,
    branch_id: Option<i64>,
    lawyer_id: i64,
) -> Result<(), CoreError> {
    let Some(branch_id) = branch_id else {
        return Ok(());
    };
    let branch = repos
        .get_branch(branch_id)?
        .ok_or_else(|| CoreError::not_found("branch", branch_id))?;
    if branch.owner_lawyer_id != lawyer_id {
        return Err(CoreError::ValidationFailed(format!(
            "branch {branch_id} does not belong to lawyer {lawyer_id}"
        )));
    }
    Ok(())
}

fn owned_template(
    repos: &mut dyn Repositories,
    template_id: i64,
    actor: &Actor,
) -> Result<WeeklyAvailabilityTemplate, CoreError> {
    let template = repos
        .get_template(template_id)?
        .ok_or_else(|| CoreError::not_found("template", template_id))?;
    if template.lawyer_id != actor.user_id {
        return Err(CoreError::forbidden(
            Privilege::AvailabilityManage.as_str(),
            "caller does not own this template",
        ));
    }
    Ok(template)
}

/// Publishes a weekly template for the calling lawyer.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound` for an unknown branch, or
/// `ValidationFailed` for an empty range, zero slot length, a foreign branch
/// or an overlap with another active template on the same weekday.
pub fn create_weekly_template<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &CreateTemplateRequest,
) -> Result<WeeklyAvailabilityTemplate, CoreError> {
    ctx.require(actor, Privilege::AvailabilityManage)?;
    validate_local_range(request.start_local_time, request.end_local_time)?;
    validate_slot_minutes(request.slot_minutes)?;

    let template = uow.write(ctx.deadline, |repos| {
        require_branch_owner(repos, request.branch_id, actor.user_id)?;

        let existing = repos.list_templates(actor.user_id, request.weekday)?;
        if let Some(existing_template_id) = find_overlapping_template(
            &existing,
            request.weekday,
            request.start_local_time,
            request.end_local_time,
            None,
        ) {
            return Err(DomainError::OverlappingTemplates {
                weekday: request.weekday.to_string(),
                existing_template_id,
            }
            .into());
        }

        Ok(repos.insert_template(&NewWeeklyTemplate {
            lawyer_id: actor.user_id,
            branch_id: request.branch_id,
            weekday: request.weekday,
            start_local_time: request.start_local_time,
            end_local_time: request.end_local_time,
            slot_minutes: request.slot_minutes,
            max_bookings: request.max_bookings,
        })?)
    })?;

    info!(
        template_id = template.id,
        lawyer_id = template.lawyer_id,
        weekday = %template.weekday,
        start = %template.start_local_time,
        end = %template.end_local_time,
        "Created weekly template"
    );
    Ok(template)
}

/// Deactivates one of the caller's templates.
///
/// # Errors
///
/// Returns `Forbidden` or `NotFound`.
pub fn deactivate_weekly_template<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    template_id: i64,
) -> Result<WeeklyAvailabilityTemplate, CoreError> {
    ctx.require(actor, Privilege::AvailabilityManage)?;
    let template = uow.write(ctx.deadline, |repos| {
        owned_template(repos, template_id, actor)?;
        Ok(repos.deactivate_template(template_id)?)
    })?;
    info!(template_id, lawyer_id = actor.user_id, "Deactivated weekly template");
    Ok(template)
}

/// Lists every template of a lawyer.
///
/// # Errors
///
/// Returns `Forbidden` or `NotFound` for an unknown lawyer.
pub fn list_weekly_templates<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    lawyer_id: i64,
) -> Result<Vec<WeeklyAvailabilityTemplate>, CoreError> {
    ctx.require(actor, Privilege::AvailabilityRead)?;
    uow.read(ctx.deadline, |repos| {
        require_lawyer(repos, lawyer_id)?;
        Ok(repos.list_all_templates(lawyer_id)?)
    })
}

/// Overrides or cancels one occurrence of a template.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound` for an unknown template, or
/// `ValidationFailed` when the date is unsupported or not on the template's
/// weekday, the effective range is empty, or an active exception already
/// exists.
pub fn create_availability_exception<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    request: &CreateExceptionRequest,
) -> Result<AvailabilityException, CoreError> {
    ctx.require(actor, Privilege::AvailabilityManage)?;
    validate_civil_date(request.date)?;

    let exception = uow.write(ctx.deadline, |repos| {
        let template = owned_template(repos, request.template_id, actor)?;
        if request.date.weekday() != template.weekday {
            return Err(CoreError::ValidationFailed(format!(
                "{} is a {}, template {} applies on {}",
                request.date,
                request.date.weekday(),
                template.id,
                template.weekday
            )));
        }
        validate_exception_overrides(&template, request.override_start, request.override_end)?;

        if repos
            .list_exceptions(actor.user_id, request.date)?
            .iter()
            .any(|e| e.template_id == template.id)
        {
            return Err(CoreError::ValidationFailed(format!(
                "template {} already has an exception on {}",
                template.id, request.date
            )));
        }

        Ok(repos.insert_exception(&NewAvailabilityException {
            lawyer_id: actor.user_id,
            template_id: template.id,
            date: request.date,
            override_start: request.override_start,
            override_end: request.override_end,
            override_max_bookings: request.override_max_bookings,
        })?)
    })?;

    info!(
        exception_id = exception.id,
        template_id = exception.template_id,
        date = %exception.date,
        cancelled = exception.cancels_occurrence(),
        "Created availability exception"
    );
    Ok(exception)
}

/// Blocks out a whole local date for the calling lawyer.
///
/// # Errors
///
/// Returns `Forbidden`, or `ValidationFailed` if the date is unsupported or
/// already blacked out, or the reason is too long.
pub fn create_blackout_day<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    date: NaiveDate,
    reason: Option<String>,
) -> Result<BlackoutDay, CoreError> {
    ctx.require(actor, Privilege::AvailabilityManage)?;
    validate_civil_date(date)?;
    if let Some(reason) = &reason
        && reason.chars().count() > MAX_REASON_CHARS
    {
        return Err(CoreError::ValidationFailed(format!(
            "reason exceeds {MAX_REASON_CHARS} characters"
        )));
    }

    let blackout = uow.write(ctx.deadline, |repos| {
        if !repos.list_blackouts(actor.user_id, date, date)?.is_empty() {
            return Err(CoreError::ValidationFailed(format!(
                "{date} is already blacked out"
            )));
        }
        Ok(repos.insert_blackout(&NewBlackoutDay {
            lawyer_id: actor.user_id,
            date,
            reason,
        })?)
    })?;

    info!(lawyer_id = actor.user_id, %date, "Created blackout day");
    Ok(blackout)
}

/// Removes one of the caller's blackout days.
///
/// # Errors
///
/// Returns `Forbidden`, or `NotFound` if no blackout exists on that date.
pub fn delete_blackout_day<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    date: NaiveDate,
) -> Result<(), CoreError> {
    ctx.require(actor, Privilege::AvailabilityManage)?;
    uow.write(ctx.deadline, |repos| {
        if repos.delete_blackout(actor.user_id, date)? {
            Ok(())
        } else {
            Err(CoreError::not_found("blackout day", date))
        }
    })?;
    info!(lawyer_id = actor.user_id, %date, "Deleted blackout day");
    Ok(())
}

/// Lists a lawyer's blackout days between two dates, inclusive.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound` for an unknown lawyer, or
/// `ValidationFailed` if `from` is after `to`.
pub fn list_blackout_days<U: UnitOfWork>(
    uow: &mut U,
    ctx: &OperationContext<'_>,
    actor: &Actor,
    lawyer_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<BlackoutDay>, CoreError> {
    ctx.require(actor, Privilege::AvailabilityRead)?;
    if from > to {
        return Err(CoreError::ValidationFailed(format!(
            "from {from} is after to {to}"
        )));
    }
    uow.read(ctx.deadline, |repos| {
        require_lawyer(repos, lawyer_id)?;
        Ok(repos.list_blackouts(lawyer_id, from, to)?)
    })
}
