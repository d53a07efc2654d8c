// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::prelude::*;
use docket_domain::{NewAvailabilityException, NewBlackoutDay, NewWeeklyTemplate};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{encode_count, encode_date, encode_flag, encode_time, encode_weekday};
use crate::diesel_schema::{availability_exceptions, blackout_days, weekly_availability};
use crate::error::PersistenceError;

/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_template(
    conn: &mut SqliteConnection,
    template: &NewWeeklyTemplate,
) -> Result<i64, PersistenceError> {
    const TABLE: &str = "weekly_availability";
    diesel::insert_into(weekly_availability::table)
        .values((
            weekly_availability::lawyer_id.eq(template.lawyer_id),
            weekly_availability::branch_id.eq(template.branch_id),
            weekly_availability::weekday.eq(encode_weekday(template.weekday)),
            weekly_availability::start_local_time.eq(encode_time(template.start_local_time)),
            weekly_availability::end_local_time.eq(encode_time(template.end_local_time)),
            weekly_availability::slot_minutes.eq(encode_count(TABLE, template.slot_minutes)?),
            weekly_availability::max_bookings.eq(encode_count(TABLE, template.max_bookings)?),
            weekly_availability::is_active.eq(encode_flag(true)),
        ))
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// # Errors
///
/// Returns `NotFound` if no template has this id.
pub fn deactivate_template(
    conn: &mut SqliteConnection,
    template_id: i64,
) -> Result<(), PersistenceError> {
    let updated = diesel::update(weekly_availability::table)
        .filter(weekly_availability::template_id.eq(template_id))
        .set(weekly_availability::is_active.eq(encode_flag(false)))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::not_found("template", template_id));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_exception(
    conn: &mut SqliteConnection,
    exception: &NewAvailabilityException,
) -> Result<i64, PersistenceError> {
    let override_max_bookings = exception
        .override_max_bookings
        .map(|v| encode_count("availability_exceptions", v))
        .transpose()?;
    diesel::insert_into(availability_exceptions::table)
        .values((
            availability_exceptions::lawyer_id.eq(exception.lawyer_id),
            availability_exceptions::template_id.eq(exception.template_id),
            availability_exceptions::exception_date.eq(encode_date(exception.date)),
            availability_exceptions::override_start.eq(exception.override_start.map(encode_time)),
            availability_exceptions::override_end.eq(exception.override_end.map(encode_time)),
            availability_exceptions::override_max_bookings.eq(override_max_bookings),
            availability_exceptions::is_active.eq(encode_flag(true)),
        ))
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// # Errors
///
/// Returns an error if the insert fails, including a second blackout on the
/// same date.
pub fn insert_blackout(
    conn: &mut SqliteConnection,
    blackout: &NewBlackoutDay,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(blackout_days::table)
        .values((
            blackout_days::lawyer_id.eq(blackout.lawyer_id),
            blackout_days::blackout_date.eq(encode_date(blackout.date)),
            blackout_days::reason.eq(blackout.reason.as_deref()),
        ))
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Deletes a blackout day, returning whether one existed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_blackout(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    date: NaiveDate,
) -> Result<bool, PersistenceError> {
    let deleted = diesel::delete(
        blackout_days::table
            .filter(blackout_days::lawyer_id.eq(lawyer_id))
            .filter(blackout_days::blackout_date.eq(encode_date(date))),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}
