// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use docket_domain::{Branch, CaseRef, Role, ServicePackage, User};
use serde_json::{Value, json};
use tower::ServiceExt;

const LAWYER: i64 = 10;
const CLIENT: i64 = 20;
const OTHER_CLIENT: i64 = 21;
const CASE: i64 = 200;
const OTHER_CASE: i64 = 201;
const PACKAGE_30: i64 = 300;
const BRANCH: i64 = 400;

/// Helper to create test app state with a seeded in-memory store.
fn create_test_app_state(config: SchedulingConfig) -> AppState {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    for (id, role) in [
        (LAWYER, Role::Lawyer),
        (CLIENT, Role::Client),
        (OTHER_CLIENT, Role::Client),
    ] {
        persistence
            .register_user(&User {
                id,
                role,
                display_name: format!("user {id}"),
            })
            .unwrap();
    }
    for (id, client_id) in [(CASE, CLIENT), (OTHER_CASE, OTHER_CLIENT)] {
        persistence.register_case(&CaseRef { id, client_id }).unwrap();
    }
    persistence
        .register_branch(&Branch {
            id: BRANCH,
            owner_lawyer_id: LAWYER,
            name: String::from("Kandy"),
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
    AppState::new(persistence, config)
}

fn request(method: &str, uri: &str, actor_id: Option<i64>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor_id) = actor_id {
        builder = builder.header(caller::ACTOR_ID_HEADER, actor_id.to_string());
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (HttpStatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_monday_template(app: &Router) {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/templates",
            Some(LAWYER),
            Some(&json!({
                "branch_id": BRANCH,
                "weekday": "Mon",
                "start_local_time": "09:00:00",
                "end_local_time": "11:00:00",
                "slot_minutes": 30,
                "max_bookings": 4
            })),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");
}

fn booking_body(case_id: i64, at: &str) -> Value {
    json!({
        "lawyer_id": LAWYER,
        "case_id": case_id,
        "service_package_id": PACKAGE_30,
        "scheduled_at_utc": at
    })
}

#[tokio::test]
async fn test_health_needs_no_caller() {
    let app = build_router(create_test_app_state(SchedulingConfig::default()));
    let (status, body) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["civil_timezone"], "Asia/Colombo");
}

#[tokio::test]
async fn test_missing_or_unknown_caller_is_unauthorized() {
    let app = build_router(create_test_app_state(SchedulingConfig::default()));

    let (status, body) = send(&app, request("GET", "/bookings/mine", None, None)).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, _) = send(&app, request("GET", "/bookings/mine", Some(999), None)).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_booking_to_served_token() {
    let app = build_router(create_test_app_state(SchedulingConfig::default()));
    create_monday_template(&app).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/bookings",
            Some(CLIENT),
            Some(&booking_body(CASE, "2026-02-02T03:30:00Z")),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");
    assert_eq!(body["booking"]["status"], "pending");
    assert_eq!(body["booking"]["ends_at_utc"], "2026-02-02T04:00:00Z");
    let booking_id = body["booking"]["booking_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/bookings",
            Some(OTHER_CLIENT),
            Some(&booking_body(OTHER_CASE, "2026-02-02T03:45:00Z")),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT_OVERLAP");

    let (status, body) = send(
        &app,
        request(
            "PATCH",
            &format!("/bookings/{booking_id}/confirm"),
            Some(LAWYER),
            None,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["booking"]["status"], "confirmed");

    let (status, body) = send(
        &app,
        request("POST", "/queue/generate?date=2026-02-02", Some(LAWYER), None),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");
    assert_eq!(body["entries"][0]["token_number"], 1);
    assert_eq!(body["entries"][0]["scheduled_time_local"], "09:00:00");
    let entry_id = body["entries"][0]["queue_entry_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "PATCH",
            &format!("/queue/{entry_id}"),
            Some(LAWYER),
            Some(&json!({ "status": "served" })),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");
    assert_eq!(body["entry"]["status"], "completed");

    let (status, body) = send(
        &app,
        request("GET", "/queue?date=2026-02-02&status=completed", Some(LAWYER), None),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_status_codes_follow_error_taxonomy() {
    let app = build_router(create_test_app_state(SchedulingConfig::default()));
    create_monday_template(&app).await;

    let (status, body) = send(
        &app,
        request("PATCH", "/bookings/9999/confirm", Some(LAWYER), None),
    )
    .await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["details"]["entity"], "booking");

    let (_, created) = send(
        &app,
        request(
            "POST",
            "/bookings",
            Some(CLIENT),
            Some(&booking_body(CASE, "2026-02-02T04:00:00Z")),
        ),
    )
    .await;
    let booking_id = created["booking"]["booking_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "PATCH",
            &format!("/bookings/{booking_id}/confirm"),
            Some(CLIENT),
            None,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = send(
        &app,
        request(
            "PATCH",
            &format!("/bookings/{booking_id}/complete"),
            Some(LAWYER),
            None,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/bookings",
            Some(CLIENT),
            Some(&booking_body(OTHER_CASE, "2026-02-02T05:00:00Z")),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "CASE_MISMATCH");
}

#[tokio::test]
async fn test_malformed_input_is_validation_failure() {
    let app = build_router(create_test_app_state(SchedulingConfig::default()));

    let (status, body) = send(
        &app,
        request("POST", "/bookings", Some(CLIENT), Some(&json!({ "lawyer_id": "x" }))),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["field"], "body");

    let (status, body) = send(
        &app,
        request("PATCH", "/bookings/abc/confirm", Some(LAWYER), None),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "path");

    let (status, body) = send(
        &app,
        request("GET", "/availability?lawyer_id=10", Some(CLIENT), None),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "query");
}

#[tokio::test]
async fn test_availability_and_slots_over_http() {
    let app = build_router(create_test_app_state(SchedulingConfig::default()));
    create_monday_template(&app).await;

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/availability?lawyer_id=10&date=2026-02-02",
            Some(CLIENT),
            None,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["intervals"][0]["start_utc"], "2026-02-02T03:30:00Z");
    assert_eq!(body["intervals"][0]["end_utc"], "2026-02-02T05:30:00Z");

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/availability/slots?lawyer_id=10&date=2026-02-02&service_package_id=300",
            Some(CLIENT),
            None,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["slots"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_blackout_endpoints() {
    let app = build_router(create_test_app_state(SchedulingConfig::default()));

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/blackouts",
            Some(LAWYER),
            Some(&json!({ "date": "2026-02-02", "reason": "court" })),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/blackouts?lawyer_id=10&from=2026-02-01&to=2026-02-28",
            Some(CLIENT),
            None,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["blackouts"][0]["date"], "2026-02-02");

    let (status, _) = send(
        &app,
        request("DELETE", "/blackouts/2026-02-02", Some(LAWYER), None),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, body) = send(
        &app,
        request("DELETE", "/blackouts/2026-02-02", Some(LAWYER), None),
    )
    .await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_expired_deadline_is_gateway_timeout() {
    let config = SchedulingConfig {
        request_timeout: Duration::ZERO,
        ..SchedulingConfig::default()
    };
    let app = build_router(create_test_app_state(config));

    let (status, body) = send(&app, request("GET", "/bookings/mine", Some(CLIENT), None)).await;
    assert_eq!(status, HttpStatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "TIMED_OUT");
}

#[test]
fn test_args_defaults() {
    let args = Args::try_parse_from(["docket-server"]).unwrap();
    let config = args.scheduling_config();
    assert_eq!(args.port, 3000);
    assert_eq!(config.default_slot_step_minutes, 15);
    assert_eq!(
        config.booking_overlap_enforcement,
        OverlapEnforcement::SerializableRecheck
    );
    assert!(config.queue_status_alias_served_completed);
    assert_eq!(config.request_timeout, Duration::from_millis(5000));
}

#[test]
fn test_args_overrides() {
    let args = Args::try_parse_from([
        "docket-server",
        "--civil-timezone",
        "Not/AZone",
        "--booking-overlap-enforcement",
        "db-exclusion",
        "--queue-status-alias-served-completed",
        "false",
        "--request-timeout-ms",
        "250",
    ])
    .unwrap();
    let config = args.scheduling_config();
    assert_eq!(config.civil_timezone.name(), "UTC");
    assert_eq!(
        config.booking_overlap_enforcement,
        OverlapEnforcement::DbExclusion
    );
    assert!(!config.queue_status_alias_served_completed);
    assert_eq!(config.request_timeout, Duration::from_millis(250));

    assert!(
        Args::try_parse_from(["docket-server", "--booking-overlap-enforcement", "optimistic"])
            .is_err()
    );
}
