// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use docket_domain::{Booking, BookingStatus};
use tracing::debug;

use crate::data_models::{BookingRow, decode_all, encode_instant};
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;

/// Retrieves a booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(Booking::try_from)
        .transpose()
}

/// Lists blocking bookings of a lawyer whose range intersects `[from, to)`.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_active_for_lawyer_between(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    utc_from: DateTime<Utc>,
    utc_to: DateTime<Utc>,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::lawyer_id.eq(lawyer_id))
        .filter(bookings::blocks_time.eq(1))
        .filter(bookings::status.eq_any([
            BookingStatus::Pending.as_str(),
            BookingStatus::Confirmed.as_str(),
        ]))
        .filter(bookings::scheduled_at_utc.lt(encode_instant(utc_to)))
        .filter(bookings::ends_at_utc.gt(encode_instant(utc_from)))
        .order((bookings::scheduled_at_utc.asc(), bookings::booking_id.asc()))
        .select(BookingRow::as_select())
        .load(conn)?;

    debug!(lawyer_id, found = rows.len(), "Loaded active bookings");
    decode_all(rows)
}

/// Lists bookings of a lawyer in `status` that start inside `[from, to)`,
/// ordered by start then id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_for_lawyer_starting_between(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    status: BookingStatus,
    utc_from: DateTime<Utc>,
    utc_to: DateTime<Utc>,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::lawyer_id.eq(lawyer_id))
        .filter(bookings::status.eq(status.as_str()))
        .filter(bookings::scheduled_at_utc.ge(encode_instant(utc_from)))
        .filter(bookings::scheduled_at_utc.lt(encode_instant(utc_to)))
        .order((bookings::scheduled_at_utc.asc(), bookings::booking_id.asc()))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_all(rows)
}

/// Lists every booking made by a client, oldest start first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_for_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::client_id.eq(client_id))
        .order((bookings::scheduled_at_utc.asc(), bookings::booking_id.asc()))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_all(rows)
}

/// Lists a lawyer's bookings, optionally restricted to one status.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_for_lawyer(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    status: Option<BookingStatus>,
) -> Result<Vec<Booking>, PersistenceError> {
    let mut query = bookings::table
        .filter(bookings::lawyer_id.eq(lawyer_id))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(bookings::status.eq(status.as_str()));
    }
    let rows: Vec<BookingRow> = query
        .order((bookings::scheduled_at_utc.asc(), bookings::booking_id.asc()))
        .select(BookingRow::as_select())
        .load(conn)?;
    decode_all(rows)
}
