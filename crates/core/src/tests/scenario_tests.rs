// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end flows over the in-memory store.

use super::helpers::{
    CASE_C, CASE_D, CASE_E, CLIENT_C, CLIENT_D, CLIENT_E, InMemoryStore, LAWYER,
    booking_request, client, context, create_test_store, lawyer, monday, test_config, utc,
};
use crate::{
    ErrorCode, SchedulingConfig, cancel_booking, confirm_booking, create_blackout_day,
    create_booking, generate_today_queue, reject_booking, update_queue_entry,
};
use docket_domain::{BookingStatus, QueueStatus};

fn with_three_confirmed(config: &SchedulingConfig) -> InMemoryStore {
    let mut store = create_test_store();
    for (client_id, case_id, at) in [
        (CLIENT_C, CASE_C, utc(3, 30)),
        (CLIENT_D, CASE_D, utc(4, 0)),
        (CLIENT_E, CASE_E, utc(4, 30)),
    ] {
        let booking = create_booking(
            &mut store,
            &context(config),
            &client(client_id),
            &booking_request(case_id, at),
        )
        .unwrap();
        confirm_booking(&mut store, &context(config), &lawyer(LAWYER), booking.id).unwrap();
    }
    store
}

#[test]
fn test_happy_booking() {
    let mut store = create_test_store();
    let config = test_config();
    let booking = create_booking(
        &mut store,
        &context(&config),
        &client(CLIENT_C),
        &booking_request(CASE_C, utc(3, 30)),
    )
    .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.ends_at_utc, utc(4, 0));
    assert!(booking.blocks_time);
}

#[test]
fn test_overlap_rejected_then_cancel_frees_the_range() {
    let mut store = create_test_store();
    let config = test_config();
    let first = create_booking(
        &mut store,
        &context(&config),
        &client(CLIENT_C),
        &booking_request(CASE_C, utc(3, 30)),
    )
    .unwrap();

    let clash = create_booking(
        &mut store,
        &context(&config),
        &client(CLIENT_D),
        &booking_request(CASE_D, utc(3, 45)),
    );
    assert_eq!(clash.unwrap_err().code(), ErrorCode::ConflictOverlap);
    assert_eq!(store.bookings().len(), 1);

    let cancelled =
        cancel_booking(&mut store, &context(&config), &client(CLIENT_C), first.id).unwrap();
    assert!(!cancelled.blocks_time);

    let retry = create_booking(
        &mut store,
        &context(&config),
        &client(CLIENT_D),
        &booking_request(CASE_D, utc(3, 45)),
    )
    .unwrap();
    assert_eq!(retry.status, BookingStatus::Pending);
}

#[test]
fn test_rejected_range_accepts_an_identical_request() {
    let mut store = create_test_store();
    let config = test_config();
    let request = booking_request(CASE_C, utc(3, 30));
    let first = create_booking(&mut store, &context(&config), &client(CLIENT_C), &request).unwrap();
    reject_booking(&mut store, &context(&config), &lawyer(LAWYER), first.id).unwrap();

    let second = create_booking(&mut store, &context(&config), &client(CLIENT_C), &request).unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn test_blackout_blocks_create() {
    let mut store = create_test_store();
    let config = test_config();
    create_blackout_day(&mut store, &context(&config), &lawyer(LAWYER), monday(), None).unwrap();

    for at in [utc(3, 30), utc(4, 30)] {
        let result = create_booking(
            &mut store,
            &context(&config),
            &client(CLIENT_C),
            &booking_request(CASE_C, at),
        );
        assert_eq!(result.unwrap_err().code(), ErrorCode::ValidationFailed);
    }
    assert!(store.bookings().is_empty());
}

#[test]
fn test_queue_generation_is_ordered_and_idempotent() {
    let config = test_config();
    let mut store = with_three_confirmed(&config);

    let entries =
        generate_today_queue(&mut store, &context(&config), &lawyer(LAWYER), None).unwrap();
    let tokens: Vec<(u32, i64)> = entries.iter().map(|e| (e.token_number, e.client_id)).collect();
    assert_eq!(tokens, vec![(1, CLIENT_C), (2, CLIENT_D), (3, CLIENT_E)]);

    let again = generate_today_queue(&mut store, &context(&config), &lawyer(LAWYER), None).unwrap();
    assert_eq!(again, entries);
    assert_eq!(store.queue().len(), 3);
}

#[test]
fn test_serve_sequence() {
    let config = test_config();
    let mut store = with_three_confirmed(&config);
    let entries =
        generate_today_queue(&mut store, &context(&config), &lawyer(LAWYER), None).unwrap();
    let (first, second, third) = (&entries[0], &entries[1], &entries[2]);

    let started = update_queue_entry(
        &mut store,
        &context(&config),
        &lawyer(LAWYER),
        first.id,
        "in_progress",
        None,
    )
    .unwrap();
    assert_eq!(started.status, QueueStatus::InProgress);
    assert!(started.started_at.is_some());
    assert!(started.completed_at.is_none());

    let done = update_queue_entry(
        &mut store,
        &context(&config),
        &lawyer(LAWYER),
        first.id,
        "completed",
        None,
    )
    .unwrap();
    assert_eq!(done.status, QueueStatus::Completed);
    assert_eq!(done.started_at, started.started_at);
    assert!(done.completed_at.is_some());

    let next = update_queue_entry(
        &mut store,
        &context(&config),
        &lawyer(LAWYER),
        second.id,
        "in_progress",
        None,
    )
    .unwrap();
    assert_eq!(next.status, QueueStatus::InProgress);

    let waiting = store.queue().iter().find(|e| e.id == third.id).unwrap();
    assert_eq!(waiting.status, QueueStatus::Waiting);
}

#[test]
fn test_blocking_bookings_never_overlap_per_branch() {
    let mut store = create_test_store();
    let config = test_config();
    let attempts = [
        (CLIENT_C, CASE_C, utc(3, 30)),
        (CLIENT_D, CASE_D, utc(3, 45)),
        (CLIENT_E, CASE_E, utc(4, 0)),
        (CLIENT_C, CASE_C, utc(4, 15)),
        (CLIENT_D, CASE_D, utc(4, 45)),
        (CLIENT_E, CASE_E, utc(5, 0)),
    ];
    for (client_id, case_id, at) in attempts {
        let _ = create_booking(
            &mut store,
            &context(&config),
            &client(client_id),
            &booking_request(case_id, at),
        );
    }

    let blocking: Vec<_> = store.bookings().iter().filter(|b| b.is_blocking()).collect();
    assert!(blocking.len() >= 3);
    for (i, a) in blocking.iter().enumerate() {
        for b in &blocking[i + 1..] {
            if a.branch_id == b.branch_id {
                assert!(!a.range().overlaps(&b.range()), "{} overlaps {}", a.id, b.id);
            }
        }
    }
}
