// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::dsl::max;
use diesel::prelude::*;
use docket_domain::QueueEntry;

use crate::data_models::{QueueEntryRow, decode_all, encode_date};
use crate::diesel_schema::queue_entries;
use crate::error::PersistenceError;

/// Returns the highest token issued for `(lawyer, date)`, or 0.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn max_token_number(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    date_local: NaiveDate,
) -> Result<u32, PersistenceError> {
    let highest: Option<i32> = queue_entries::table
        .filter(queue_entries::lawyer_id.eq(lawyer_id))
        .filter(queue_entries::queue_date.eq(encode_date(date_local)))
        .select(max(queue_entries::token_number))
        .first(conn)?;
    let highest = highest.unwrap_or(0);
    u32::try_from(highest).map_err(|_| {
        PersistenceError::corrupt("queue_entries", format!("token number {highest}"))
    })
}

/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
) -> Result<Option<QueueEntry>, PersistenceError> {
    queue_entries::table
        .filter(queue_entries::queue_entry_id.eq(entry_id))
        .select(QueueEntryRow::as_select())
        .first::<QueueEntryRow>(conn)
        .optional()?
        .map(QueueEntry::try_from)
        .transpose()
}

/// Lists the queue for `(lawyer, date)` ordered by token number.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_for_day(
    conn: &mut SqliteConnection,
    lawyer_id: i64,
    date_local: NaiveDate,
) -> Result<Vec<QueueEntry>, PersistenceError> {
    let rows: Vec<QueueEntryRow> = queue_entries::table
        .filter(queue_entries::lawyer_id.eq(lawyer_id))
        .filter(queue_entries::queue_date.eq(encode_date(date_local)))
        .order(queue_entries::token_number.asc())
        .select(QueueEntryRow::as_select())
        .load(conn)?;
    decode_all(rows)
}
