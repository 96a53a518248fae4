//! Integration tests for the `/api/v1/intake` endpoints.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use bgv_core::checks::CheckConfig;
use common::{body_json, get, post_json};
use serde_json::{json, Value};

fn complete_basic() -> Value {
    json!({
        "firstName": "Asha",
        "lastName": "Rao",
        "fatherName": "Ravi Rao",
        "gender": "FEMALE",
        "email": "asha@example.com",
        "phone": 9876543210u64,
        "dob": "1994-03-12",
        "addresses": []
    })
}

fn closed_address(id: &str, from: &str, to: &str) -> Value {
    json!({
        "id": id,
        "addressLine1": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "country": "India",
        "pincode": "560001",
        "addressType": "PERMANENT",
        "stayingFrom": from,
        "stayingTo": to
    })
}

// ---------------------------------------------------------------------------
// GET /intake/steps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_steps_skips_disabled_checks() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/intake/steps?enabledChecks=ADDRESS,EMPLOYMENT").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let steps: Vec<u64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["step"].as_u64().unwrap())
        .collect();
    assert_eq!(steps, vec![1, 2, 5, 6, 7]);
    assert_eq!(json["data"][1]["check"], "ADDRESS");
}

#[tokio::test]
async fn list_steps_rejects_unknown_check_code() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/intake/steps?enabledChecks=ADDRESS,CRIMINAL").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// POST /intake/steps/{step}/validate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validate_empty_basic_step_reports_field_errors() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/1/validate",
        json!({ "form": {}, "enabledChecks": [] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let report = &json["data"];
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"]["firstName"], "First name is required");
    assert_eq!(report["firstErrorKey"], "firstName");
    // DOB is required while IDENTITY is disabled.
    assert!(report["errors"]["dob"].is_string());
}

#[tokio::test]
async fn validate_complete_basic_step_is_valid() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/1/validate",
        json!({ "form": { "basic": complete_basic() }, "enabledChecks": [] }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], true);
    assert_eq!(json["data"]["errors"], json!({}));
    assert_matches!(json["data"]["firstErrorKey"], Value::Null);
}

#[tokio::test]
async fn validate_address_applies_request_policy() {
    let app = common::build_test_app();
    let mut basic = complete_basic();
    basic["addresses"] = json!([closed_address("a1", "2019-01-01", "2020-01-01")]);

    let response = post_json(
        app,
        "/api/v1/intake/steps/2/validate",
        json!({
            "form": { "basic": basic },
            "checkConfig": { "ADDRESS": { "history": "past", "customHistory": 3 } },
            "enabledChecks": ["ADDRESS"]
        }),
    )
    .await;

    let json = body_json(response).await;
    let report = &json["data"];
    assert_eq!(report["valid"], false);
    let message = report["errors"]["addr_general"].as_str().unwrap();
    assert!(message.starts_with("Residency history of 3 years is mandatory."));
    assert_eq!(report["aggregateKeys"], json!(["addr_general"]));
}

#[tokio::test]
async fn validate_address_falls_back_to_default_policy() {
    let config = CheckConfig::from_json(r#"{ "ADDRESS": { "history": "permanent" } }"#).unwrap();
    let app = common::build_test_app_with(config);

    let mut address = closed_address("a1", "2019-01-01", "2020-01-01");
    address["addressType"] = json!("CURRENT");
    let mut basic = complete_basic();
    basic["addresses"] = json!([address]);

    let response = post_json(
        app,
        "/api/v1/intake/steps/2/validate",
        json!({ "form": { "basic": basic }, "enabledChecks": ["ADDRESS"] }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(
        json["data"]["errors"]["addr_general"],
        "A permanent address is mandatory."
    );
}

#[tokio::test]
async fn validate_rejects_ill_shaped_request_policy() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/2/validate",
        json!({
            "form": {},
            "checkConfig": { "ADDRESS": { "history": "past", "customHistory": -1 } },
            "enabledChecks": ["ADDRESS"]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_POLICY");
}

#[tokio::test]
async fn validate_reports_badly_typed_policy_as_invalid_policy() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/2/validate",
        json!({
            "form": {},
            "checkConfig": { "ADDRESS": { "history": true } },
            "enabledChecks": ["ADDRESS"]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_POLICY");
    assert!(json["error"].as_str().unwrap().contains("ADDRESS"));
}

#[tokio::test]
async fn malformed_body_is_a_json_bad_request() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/resume",
        json!({ "form": { "consent": "yes" }, "enabledChecks": [] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn step_numbers_outside_u8_or_non_numeric_are_validation_errors() {
    for uri in [
        "/api/v1/intake/steps/300/validate",
        "/api/v1/intake/steps/two/validate",
        "/api/v1/intake/steps/300/advance",
    ] {
        let app = common::build_test_app();
        let response = post_json(app, uri, json!({ "form": {}, "enabledChecks": [] })).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR", "{uri}");
    }
}

#[tokio::test]
async fn validate_rejects_out_of_range_step() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/9/validate",
        json!({ "form": {}, "enabledChecks": [] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// POST /intake/steps/{step}/advance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn advance_blocked_step_returns_422() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/1/advance",
        json!({ "form": {}, "enabledChecks": ["ADDRESS"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "STEP_BLOCKED");
    assert_eq!(json["errors"]["lastName"], "Last name is required");
}

#[tokio::test]
async fn advance_valid_step_moves_to_next_enabled_step() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/1/advance",
        json!({ "form": { "basic": complete_basic() }, "enabledChecks": ["EMPLOYMENT"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["from"], 1);
    assert_eq!(json["data"]["to"], 5);
    assert_eq!(json["data"]["complete"], false);
}

#[tokio::test]
async fn advance_disabled_step_is_bad_request() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/3/advance",
        json!({ "form": {}, "enabledChecks": ["ADDRESS"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn advance_from_review_completes_the_form() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/steps/7/advance",
        json!({ "form": { "consent": true }, "enabledChecks": [] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["to"], Value::Null);
    assert_eq!(json["data"]["complete"], true);
}

// ---------------------------------------------------------------------------
// POST /intake/resume
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resume_lands_on_first_incomplete_step() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/resume",
        json!({
            "form": { "basic": complete_basic() },
            "enabledChecks": ["ADDRESS", "EDUCATION"]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["step"], 2);
    assert_eq!(json["data"]["reasons"], json!(["addr_general"]));
}

#[tokio::test]
async fn resume_rejects_unknown_check_code() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/resume",
        json!({ "form": {}, "enabledChecks": ["DRUG_TEST"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// POST /intake/coverage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coverage_merges_touching_intervals() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/coverage",
        json!({
            "intervals": [
                { "start": "2021-01-01", "end": "2022-01-01" },
                { "start": "2020-01-01", "end": "2021-01-01" }
            ]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let years = json["data"]["years"].as_f64().unwrap();
    assert!((years - 731.0 / 365.25).abs() < 1e-9);
    assert_eq!(json["data"]["breakdown"]["years"], 2);
    assert_eq!(json["data"]["mergedIntervals"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn coverage_rejects_inverted_interval() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/coverage",
        json!({ "intervals": [{ "start": "2022-01-01", "end": "2021-01-01" }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn coverage_rejects_unparseable_date() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/intake/coverage",
        json!({ "intervals": [{ "start": "yesterday", "end": "2021-01-01" }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "intervals[0].start is not a valid date");
}
