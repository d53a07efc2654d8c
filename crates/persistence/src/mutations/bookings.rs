// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use docket_domain::{BookingStatus, NewBooking};
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{encode_flag, encode_instant};
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;

/// Inserts a pending, time-blocking booking.
///
/// The overlap triggers run as part of this statement.
///
/// # Errors
///
/// Returns `OverlapViolation` if the range intersects an active booking of
/// the same lawyer and branch, or another database error.
pub fn insert_pending(
    conn: &mut SqliteConnection,
    booking: &NewBooking,
) -> Result<i64, PersistenceError> {
    let created_at = encode_instant(booking.created_at);
    diesel::insert_into(bookings::table)
        .values((
            bookings::client_id.eq(booking.client_id),
            bookings::lawyer_id.eq(booking.lawyer_id),
            bookings::branch_id.eq(booking.branch_id),
            bookings::case_id.eq(booking.case_id),
            bookings::service_package_id.eq(booking.service_package_id),
            bookings::scheduled_at_utc.eq(encode_instant(booking.scheduled_at_utc)),
            bookings::ends_at_utc.eq(encode_instant(booking.ends_at_utc)),
            bookings::status.eq(BookingStatus::Pending.as_str()),
            bookings::blocks_time.eq(encode_flag(true)),
            bookings::note.eq(booking.note.as_deref()),
            bookings::created_at.eq(&created_at),
            bookings::updated_at.eq(&created_at),
        ))
        .execute(conn)?;

    let booking_id = get_last_insert_rowid(conn)?;
    debug!(booking_id, lawyer_id = booking.lawyer_id, "Inserted booking row");
    Ok(booking_id)
}

/// # Errors
///
/// Returns `NotFound` if no booking has this id.
pub fn update_status(
    conn: &mut SqliteConnection,
    booking_id: i64,
    status: BookingStatus,
    updated_at: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let updated = diesel::update(bookings::table)
        .filter(bookings::booking_id.eq(booking_id))
        .set((
            bookings::status.eq(status.as_str()),
            bookings::updated_at.eq(encode_instant(updated_at)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::not_found("booking", booking_id));
    }
    Ok(())
}

/// Sets whether the booking takes part in overlap exclusion.
///
/// # Errors
///
/// Returns `NotFound` if no booking has this id, or `OverlapViolation` when
/// re-blocking a range that is now taken.
pub fn set_blocks_time(
    conn: &mut SqliteConnection,
    booking_id: i64,
    blocks_time: bool,
    updated_at: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let updated = diesel::update(bookings::table)
        .filter(bookings::booking_id.eq(booking_id))
        .set((
            bookings::blocks_time.eq(encode_flag(blocks_time)),
            bookings::updated_at.eq(encode_instant(updated_at)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::not_found("booking", booking_id));
    }
    Ok(())
}
