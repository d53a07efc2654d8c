// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use docket_domain::{NewQueueEntry, QueueStatus};
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{encode_count, encode_date, encode_instant, encode_time};
use crate::diesel_schema::queue_entries;
use crate::error::PersistenceError;

/// Appends a waiting entry.
///
/// # Errors
///
/// Returns `TokenConflict` if the token number or the client is already
/// taken for this lawyer and day.
pub fn insert_entry(
    conn: &mut SqliteConnection,
    entry: &NewQueueEntry,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(queue_entries::table)
        .values((
            queue_entries::queue_date.eq(encode_date(entry.date_local)),
            queue_entries::lawyer_id.eq(entry.lawyer_id),
            queue_entries::client_id.eq(entry.client_id),
            queue_entries::booking_id.eq(entry.booking_id),
            queue_entries::token_number.eq(encode_count("queue_entries", entry.token_number)?),
            queue_entries::scheduled_time_local.eq(entry.scheduled_time_local.map(encode_time)),
            queue_entries::branch_id.eq(entry.branch_id),
            queue_entries::status.eq(QueueStatus::Waiting.as_str()),
        ))
        .execute(conn)?;

    let entry_id = get_last_insert_rowid(conn)?;
    debug!(
        queue_entry_id = entry_id,
        token_number = entry.token_number,
        "Inserted queue row"
    );
    Ok(entry_id)
}

/// # Errors
///
/// Returns `NotFound` if no entry has this id.
pub fn update_status_and_timestamps(
    conn: &mut SqliteConnection,
    entry_id: i64,
    status: QueueStatus,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    reason: Option<&str>,
) -> Result<(), PersistenceError> {
    let updated = diesel::update(queue_entries::table)
        .filter(queue_entries::queue_entry_id.eq(entry_id))
        .set((
            queue_entries::status.eq(status.as_str()),
            queue_entries::started_at.eq(started_at.map(encode_instant)),
            queue_entries::completed_at.eq(completed_at.map(encode_instant)),
            queue_entries::reason.eq(reason),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::not_found("queue entry", entry_id));
    }
    Ok(())
}
