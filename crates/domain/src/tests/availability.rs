// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{colombo, create_test_template, local, monday, utc};
use crate::{AvailabilityException, BlackoutDay, DomainError, resolve_day_availability};
use chrono::Weekday;

fn create_test_exception(
    template_id: i64,
    start: Option<(u32, u32)>,
    end: Option<(u32, u32)>,
) -> AvailabilityException {
    AvailabilityException {
        id: 1,
        lawyer_id: 10,
        template_id,
        date: monday(),
        override_start: start.map(|(h, m)| local(h, m)),
        override_end: end.map(|(h, m)| local(h, m)),
        override_max_bookings: None,
        is_active: true,
    }
}

#[test]
fn test_template_resolves_to_utc() {
    let templates = [create_test_template(1, Weekday::Mon, local(9, 0), local(11, 0))];
    let resolved = resolve_day_availability(monday(), &templates, &[], &[], None, &colombo()).unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].start_utc, utc(3, 30));
    assert_eq!(resolved[0].end_utc, utc(5, 30));
    assert_eq!(resolved[0].source_template_id, 1);
}

#[test]
fn test_other_weekdays_and_inactive_templates_are_ignored() {
    let mut inactive = create_test_template(2, Weekday::Mon, local(13, 0), local(14, 0));
    inactive.is_active = false;
    let templates = [
        create_test_template(1, Weekday::Tue, local(9, 0), local(11, 0)),
        inactive,
    ];
    let resolved = resolve_day_availability(monday(), &templates, &[], &[], None, &colombo()).unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn test_exception_without_overrides_cancels_occurrence() {
    let templates = [create_test_template(1, Weekday::Mon, local(9, 0), local(11, 0))];
    let exceptions = [create_test_exception(1, None, None)];
    let resolved =
        resolve_day_availability(monday(), &templates, &exceptions, &[], None, &colombo()).unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn test_exception_overrides_replace_template_fields() {
    let templates = [create_test_template(1, Weekday::Mon, local(9, 0), local(11, 0))];
    let mut exception = create_test_exception(1, Some((10, 0)), None);
    exception.override_max_bookings = Some(4);
    let resolved =
        resolve_day_availability(monday(), &templates, &[exception], &[], None, &colombo())
            .unwrap();

    assert_eq!(resolved[0].start_utc, utc(4, 30));
    assert_eq!(resolved[0].end_utc, utc(5, 30));
    assert_eq!(resolved[0].max_bookings, 4);
}

#[test]
fn test_exception_for_other_date_is_ignored() {
    let templates = [create_test_template(1, Weekday::Mon, local(9, 0), local(11, 0))];
    let mut exception = create_test_exception(1, None, None);
    exception.date = monday().succ_opt().unwrap();
    let resolved =
        resolve_day_availability(monday(), &templates, &[exception], &[], None, &colombo())
            .unwrap();
    assert_eq!(resolved.len(), 1);
}

#[test]
fn test_blackout_drops_everything() {
    let templates = [
        create_test_template(1, Weekday::Mon, local(9, 0), local(11, 0)),
        create_test_template(2, Weekday::Mon, local(14, 0), local(16, 0)),
    ];
    let blackouts = [BlackoutDay {
        id: 1,
        lawyer_id: 10,
        date: monday(),
        reason: Some(String::from("court day")),
    }];
    let resolved =
        resolve_day_availability(monday(), &templates, &[], &blackouts, None, &colombo()).unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn test_inverted_template_is_surfaced() {
    let templates = [create_test_template(7, Weekday::Mon, local(11, 0), local(9, 0))];
    let result = resolve_day_availability(monday(), &templates, &[], &[], None, &colombo());
    assert!(matches!(
        result,
        Err(DomainError::InvalidTemplate { template_id: 7, .. })
    ));
}

#[test]
fn test_inverted_exception_is_surfaced() {
    let templates = [create_test_template(3, Weekday::Mon, local(9, 0), local(11, 0))];
    let exceptions = [create_test_exception(3, Some((12, 0)), None)];
    let result = resolve_day_availability(monday(), &templates, &exceptions, &[], None, &colombo());
    assert!(matches!(
        result,
        Err(DomainError::InvalidTemplate { template_id: 3, .. })
    ));
}

#[test]
fn test_branches_are_kept_apart_and_filtered() {
    let mut first = create_test_template(1, Weekday::Mon, local(9, 0), local(10, 0));
    first.branch_id = Some(100);
    let mut second = create_test_template(2, Weekday::Mon, local(10, 0), local(11, 0));
    second.branch_id = Some(200);
    let shared = create_test_template(3, Weekday::Mon, local(14, 0), local(15, 0));
    let templates = [second, first, shared];

    let all = resolve_day_availability(monday(), &templates, &[], &[], None, &colombo()).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].branch_id, Some(100));
    assert_eq!(all[1].branch_id, Some(200));
    assert_eq!(all[0].end_utc, all[1].start_utc);

    let only_200 =
        resolve_day_availability(monday(), &templates, &[], &[], Some(200), &colombo()).unwrap();
    let ids: Vec<i64> = only_200.iter().map(|i| i.source_template_id).collect();
    assert_eq!(ids, vec![2, 3]);
}
