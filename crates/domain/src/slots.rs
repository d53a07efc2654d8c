// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bookable slot generation.
//!
//! Free windows are the available intervals minus the busy ones. Slots are
//! emitted per window starting exactly at the window start and stepping
//! forward while the slot still fits (sequential-earliest rule). A gap later
//! in a window never moves its first slot.

use crate::error::DomainError;
use crate::interval::{Interval, subtract};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// A bookable `[start_utc, end_utc)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Slot {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

/// Generates bookable slots.
///
/// # Arguments
///
/// * `available` - Resolved availability intervals
/// * `busy` - Ranges of bookings that block time
/// * `slot_duration_minutes` - Length of each slot
/// * `step_minutes` - Distance between consecutive slot starts
///
/// # Returns
///
/// Slots ordered by start, deduplicated by start.
///
/// # Errors
///
/// Returns `DomainError::InvalidSlotParameters` if the duration or step is zero.
pub fn generate_slots(
    available: &[Interval],
    busy: &[Interval],
    slot_duration_minutes: u32,
    step_minutes: u32,
) -> Result<Vec<Slot>, DomainError> {
    if slot_duration_minutes == 0 {
        return Err(DomainError::InvalidSlotParameters {
            reason: String::from("slot duration must be greater than zero"),
        });
    }
    if step_minutes == 0 {
        return Err(DomainError::InvalidSlotParameters {
            reason: String::from("step must be greater than zero"),
        });
    }

    let length = Duration::minutes(i64::from(slot_duration_minutes));
    let step = Duration::minutes(i64::from(step_minutes));

    let mut seen_starts = BTreeSet::new();
    let mut slots = Vec::new();

    for window in subtract(available, busy) {
        let mut start = window.start();
        while let Some(end) = start.checked_add_signed(length)
            && end <= window.end()
        {
            if seen_starts.insert(start) {
                slots.push(Slot {
                    start_utc: start,
                    end_utc: end,
                });
            }
            let Some(next) = start.checked_add_signed(step) else {
                break;
            };
            start = next;
        }
    }

    slots.sort();
    Ok(slots)
}
