// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use docket::{Actor, Deadline, OperationContext, RolePolicy, SchedulingConfig};
use docket_domain::{Branch, CaseRef, Role, ServicePackage, User};
use docket_persistence::Persistence;

use crate::{CreateBookingRequest, CreateTemplateRequest, create_weekly_template};

pub const LAWYER: i64 = 10;
pub const OTHER_LAWYER: i64 = 11;
pub const CLIENT: i64 = 20;
pub const OTHER_CLIENT: i64 = 21;
pub const APPRENTICE: i64 = 30;
pub const ADMIN: i64 = 40;
pub const CASE: i64 = 200;
pub const OTHER_CASE: i64 = 201;
pub const PACKAGE_30: i64 = 300;
pub const BRANCH: i64 = 400;

pub static POLICY: RolePolicy = RolePolicy;

/// Monday 2026-02-02.
pub fn create_test_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
}

pub fn local(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// An instant on the test Monday, in UTC.
pub fn utc(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, h, m, 0).unwrap()
}

pub fn create_test_actor(id: i64, role: Role) -> Actor {
    Actor::new(id, role)
}

pub fn create_test_lawyer() -> Actor {
    create_test_actor(LAWYER, Role::Lawyer)
}

pub fn create_test_client() -> Actor {
    create_test_actor(CLIENT, Role::Client)
}

/// A context evaluated at 01:00Z on the test Monday (06:30 in Colombo).
pub fn create_test_context(config: &SchedulingConfig) -> OperationContext<'_> {
    OperationContext::new(config, &POLICY, utc(1, 0), Deadline::none())
}

fn user(id: i64, role: Role) -> User {
    User {
        id,
        role,
        display_name: format!("user {id}"),
    }
}

/// An in-memory store with the directory registered and one Monday
/// template from 09:00 to 11:00 local at `BRANCH`.
pub fn setup_test_persistence(config: &SchedulingConfig) -> Persistence {
    let mut persistence = Persistence::new_in_memory().unwrap();
    for (id, role) in [
        (LAWYER, Role::Lawyer),
        (OTHER_LAWYER, Role::Lawyer),
        (CLIENT, Role::Client),
        (OTHER_CLIENT, Role::Client),
        (APPRENTICE, Role::Apprentice),
        (ADMIN, Role::Admin),
    ] {
        persistence.register_user(&user(id, role)).unwrap();
    }
    for (case_id, client_id) in [(CASE, CLIENT), (OTHER_CASE, OTHER_CLIENT)] {
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
            name: String::from("Colombo Fort"),
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

    let ctx = create_test_context(config);
    create_weekly_template(
        &mut persistence,
        &ctx,
        &create_test_lawyer(),
        &create_test_template_request(),
    )
    .unwrap();
    persistence
}

pub fn create_test_template_request() -> CreateTemplateRequest {
    CreateTemplateRequest {
        branch_id: Some(BRANCH),
        weekday: Weekday::Mon,
        start_local_time: local(9, 0),
        end_local_time: local(11, 0),
        slot_minutes: 30,
        max_bookings: 4,
    }
}

pub fn create_test_booking_request(case_id: i64, at: DateTime<Utc>) -> CreateBookingRequest {
    CreateBookingRequest {
        lawyer_id: LAWYER,
        branch_id: None,
        case_id,
        service_package_id: Some(PACKAGE_30),
        scheduled_at_utc: at,
        note: None,
    }
}
