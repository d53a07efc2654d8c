// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use docket::{CoreError, ErrorCode, SchedulingConfig};
use docket_domain::DomainError;
use serde_json::json;

use crate::{ApiError, confirm_booking, translate_core_error};

use super::helpers::{create_test_context, create_test_lawyer, setup_test_persistence};

#[test]
fn test_not_found_names_entity() {
    let config = SchedulingConfig::default();
    let mut persistence = setup_test_persistence(&config);
    let ctx = create_test_context(&config);

    let err = confirm_booking(&mut persistence, &ctx, &create_test_lawyer(), 9_999).unwrap_err();
    let body = err.body();
    assert_eq!(body.code, "NOT_FOUND");
    assert_eq!(body.details, Some(json!({ "entity": "booking", "id": "9999" })));
}

#[test]
fn test_invalid_template_details_name_the_row() {
    let err = translate_core_error(CoreError::DomainViolation(DomainError::InvalidTemplate {
        template_id: 7,
        reason: String::from("start after end"),
    }));
    assert_eq!(err.code(), Some(ErrorCode::ValidationFailed));
    assert_eq!(
        err.body().details,
        Some(json!({ "template_id": 7, "reason": "start after end" }))
    );
}

#[test]
fn test_transition_errors_keep_their_code() {
    let err = translate_core_error(CoreError::DomainViolation(
        DomainError::InvalidStatusTransition {
            from: String::from("completed"),
            to: String::from("waiting"),
            reason: String::from("terminal"),
        },
    ));
    assert_eq!(err.body().code, "INVALID_TRANSITION");
    assert_eq!(
        err.body().details,
        Some(json!({ "from": "completed", "to": "waiting" }))
    );
}

#[test]
fn test_internal_errors_are_not_leaked() {
    let err = translate_core_error(CoreError::Internal(String::from("disk on fire")));
    let body = err.body();
    assert_eq!(body.code, "INTERNAL");
    assert_eq!(body.message, "internal error");
    assert!(body.details.is_none());
}

#[test]
fn test_timed_out_and_token_conflict_codes() {
    assert_eq!(
        translate_core_error(CoreError::TimedOut).code(),
        Some(ErrorCode::TimedOut)
    );
    assert_eq!(
        translate_core_error(CoreError::ConflictToken(String::from("token 3"))).code(),
        Some(ErrorCode::ConflictToken)
    );
}

#[test]
fn test_body_omits_absent_details() {
    let err = ApiError::invalid_input("date", "bad date");
    let body = serde_json::to_value(err.body()).unwrap();
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["field"], "date");

    let plain = translate_core_error(CoreError::TimedOut);
    let body = serde_json::to_value(plain.body()).unwrap();
    assert!(body.get("details").is_none());
}
