// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use crate::Persistence;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use docket::{
    Actor, CreateTemplateRequest, Deadline, OperationContext, RolePolicy, SchedulingConfig,
    create_weekly_template,
};
use docket_domain::{Branch, CaseRef, Role, ServicePackage, User};

pub const LAWYER: i64 = 10;
pub const CLIENT_C: i64 = 20;
pub const CLIENT_D: i64 = 21;
pub const CLIENT_E: i64 = 22;
pub const CASE_C: i64 = 200;
pub const CASE_D: i64 = 201;
pub const CASE_E: i64 = 202;
pub const PACKAGE_30: i64 = 300;
pub const BRANCH: i64 = 400;
pub const SECOND_BRANCH: i64 = 401;

pub static POLICY: RolePolicy = RolePolicy;

/// Monday 2026-02-02.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
}

pub fn local(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn utc(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, h, m, 0).unwrap()
}

pub fn client(id: i64) -> Actor {
    Actor::new(id, Role::Client)
}

pub fn lawyer(id: i64) -> Actor {
    Actor::new(id, Role::Lawyer)
}

pub fn context(config: &SchedulingConfig) -> OperationContext<'_> {
    OperationContext::new(config, &POLICY, utc(1, 0), Deadline::none())
}

fn user(id: i64, role: Role) -> User {
    User {
        id,
        role,
        display_name: format!("user {id}"),
    }
}

/// An empty database with the directory rows registered.
pub fn create_test_directory() -> Persistence {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence.register_user(&user(LAWYER, Role::Lawyer)).unwrap();
    for id in [CLIENT_C, CLIENT_D, CLIENT_E] {
        persistence.register_user(&user(id, Role::Client)).unwrap();
    }
    for (case_id, client_id) in [(CASE_C, CLIENT_C), (CASE_D, CLIENT_D), (CASE_E, CLIENT_E)] {
        persistence
            .register_case(&CaseRef {
                id: case_id,
                client_id,
            })
            .unwrap();
    }
    persistence
        .register_branch(&Branch {
            id: BRANCH,
            owner_lawyer_id: LAWYER,
            name: String::from("Colombo 03"),
        })
        .unwrap();
    persistence
        .register_service_package(&ServicePackage {
            id: PACKAGE_30,
            lawyer_id: LAWYER,
            name: String::from("Consultation"),
            duration_minutes: 30,
            active: true,
        })
        .unwrap();
    persistence
}

/// The directory plus a Monday 09:00-11:00 template valid for any branch.
pub fn create_test_persistence() -> Persistence {
    let mut persistence = create_test_directory();
    let config = SchedulingConfig::default();
    create_weekly_template(
        &mut persistence,
        &context(&config),
        &lawyer(LAWYER),
        &CreateTemplateRequest {
            branch_id: None,
            weekday: Weekday::Mon,
            start_local_time: local(9, 0),
            end_local_time: local(11, 0),
            slot_minutes: 15,
            max_bookings: 1,
        },
    )
    .unwrap();
    persistence
}

fn add_template(persistence: &mut Persistence, branch_id: Option<i64>, start: u32, end: u32) {
    let config = SchedulingConfig::default();
    create_weekly_template(
        persistence,
        &context(&config),
        &lawyer(LAWYER),
        &CreateTemplateRequest {
            branch_id,
            weekday: Weekday::Mon,
            start_local_time: local(start, 0),
            end_local_time: local(end, 0),
            slot_minutes: 15,
            max_bookings: 1,
        },
    )
    .unwrap();
}

/// The directory plus Monday 09:00-10:00 at `BRANCH` and 10:00-11:00 at
/// `SECOND_BRANCH`.
pub fn create_two_branch_persistence() -> Persistence {
    let mut persistence = create_test_directory();
    persistence
        .register_branch(&Branch {
            id: SECOND_BRANCH,
            owner_lawyer_id: LAWYER,
            name: String::from("Kandy"),
        })
        .unwrap();
    add_template(&mut persistence, Some(BRANCH), 9, 10);
    add_template(&mut persistence, Some(SECOND_BRANCH), 10, 11);
    persistence
}

pub fn booking_request(case_id: i64, at: DateTime<Utc>) -> docket::CreateBookingRequest {
    docket::CreateBookingRequest {
        lawyer_id: LAWYER,
        branch_id: None,
        case_id,
        service_package_id: Some(PACKAGE_30),
        scheduled_at_utc: at,
        note: None,
    }
}
