// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{NaiveDate, Weekday};
use diesel::SqliteConnection;
use diesel::prelude::*;
use docket_domain::{AvailabilityException, BlackoutDay, WeeklyAvailabilityTemplate};

use crate::data_models::{
    BlackoutRow, ExceptionRow, TemplateRow, decode_all, encode_date, encode_weekday,
};
use crate::diesel_schema::{availability_exceptions, blackout_days, weekly_availability};
use crate::error::PersistenceError;

/// Lists a lawyer's active templates for one weekday.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_templates(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    weekday: Weekday,
) -> Result<Vec<WeeklyAvailabilityTemplate>, PersistenceError> {
    let rows: Vec<TemplateRow> = weekly_availability::table
        .filter(weekly_availability::lawyer_id.eq(lawyer_id))
        .filter(weekly_availability::weekday.eq(encode_weekday(weekday)))
        .filter(weekly_availability::is_active.eq(1))
        .order(weekly_availability::template_id.asc())
        .select(TemplateRow::as_select())
        .load(conn)?;
    decode_all(rows)
}

/// Lists all of a lawyer's templates, active or not.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_all_templates(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
) -> Result<Vec<WeeklyAvailabilityTemplate>, PersistenceError> {
    let rows: Vec<TemplateRow> = weekly_availability::table
        .filter(weekly_availability::lawyer_id.eq(lawyer_id))
        .order((
            weekly_availability::weekday.asc(),
            weekly_availability::start_local_time.asc(),
            weekly_availability::template_id.asc(),
        ))
        .select(TemplateRow::as_select())
        .load(conn)?;
    decode_all(rows)
}

/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_template(
    conn: &mut SqliteConnection,
    template_id: i64,
) -> Result<Option<WeeklyAvailabilityTemplate>, PersistenceError> {
    weekly_availability::table
        .filter(weekly_availability::template_id.eq(template_id))
        .select(TemplateRow::as_select())
        .first::<TemplateRow>(conn)
        .optional()?
        .map(WeeklyAvailabilityTemplate::try_from)
        .transpose()
}

/// Lists a lawyer's active exceptions on a date, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_exceptions(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    date: NaiveDate,
) -> Result<Vec<AvailabilityException>, PersistenceError> {
    let rows: Vec<ExceptionRow> = availability_exceptions::table
        .filter(availability_exceptions::lawyer_id.eq(lawyer_id))
        .filter(availability_exceptions::exception_date.eq(encode_date(date)))
        .filter(availability_exceptions::is_active.eq(1))
        .order(availability_exceptions::exception_id.asc())
        .select(ExceptionRow::as_select())
        .load(conn)?;
    decode_all(rows)
}

/// Lists blackout days in `[from, to]`, ordered by date.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_blackouts(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<BlackoutDay>, PersistenceError> {
    let rows: Vec<BlackoutRow> = blackout_days::table
        .filter(blackout_days::lawyer_id.eq(lawyer_id))
        .filter(blackout_days::blackout_date.ge(encode_date(from)))
        .filter(blackout_days::blackout_date.le(encode_date(to)))
        .order(blackout_days::blackout_date.asc())
        .select(BlackoutRow::as_select())
        .load(conn)?;
    decode_all(rows)
}
