// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CivilTimezone, Interval, WeeklyAvailabilityTemplate};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

/// Monday 2026-02-02, the reference day used throughout.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
}

pub fn colombo() -> CivilTimezone {
    CivilTimezone::parse_or_utc("Asia/Colombo")
}

pub fn local(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// A UTC instant on the reference day.
pub fn utc(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, h, m, 0).unwrap()
}

pub fn span(a: (u32, u32), b: (u32, u32)) -> Interval {
    Interval::new(utc(a.0, a.1), utc(b.0, b.1)).unwrap()
}

pub fn create_test_template(
    id: i64,
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
) -> WeeklyAvailabilityTemplate {
    WeeklyAvailabilityTemplate {
        id,
        lawyer_id: 10,
        branch_id: None,
        weekday,
        start_local_time: start,
        end_local_time: end,
        slot_minutes: 15,
        max_bookings: 1,
        is_active: true,
    }
}
