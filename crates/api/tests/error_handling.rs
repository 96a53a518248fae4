//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server is
//! involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use bgv_api::error::AppError;
use bgv_core::error::CoreError;
use bgv_core::intake::error_map::{ErrorMap, ViolationKind};
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Step must be between 1 and 7".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Step must be between 1 and 7");
}

#[tokio::test]
async fn unknown_check_type_returns_400_validation_error() {
    let err = AppError::Core(CoreError::UnknownCheckType("CRIMINAL".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("CRIMINAL"));
}

#[tokio::test]
async fn invalid_policy_returns_400_invalid_policy() {
    let err = AppError::Core(CoreError::InvalidPolicy {
        check: "ADDRESS",
        reason: "customHistory must be numeric".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_POLICY");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn step_blocked_returns_422_with_error_map() {
    let mut errors = ErrorMap::new();
    errors.insert_field("firstName", ViolationKind::FieldRequired, "First name is required");

    let err = AppError::StepBlocked { step: 1, errors };
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "STEP_BLOCKED");
    assert_eq!(json["errors"]["firstName"], "First name is required");
}
