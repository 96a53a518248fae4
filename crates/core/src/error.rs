/// Errors raised for malformed *input shape* (unknown step numbers, unknown
/// check codes, unusable policy objects).
///
/// Business-rule violations on the form itself are never `CoreError`s; they
/// are collected into an [`ErrorMap`](crate::intake::error_map::ErrorMap).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown check type '{0}'. Must be one of: ADDRESS, EMPLOYMENT, EDUCATION, IDENTITY")]
    UnknownCheckType(String),

    #[error("Invalid {check} policy: {reason}")]
    InvalidPolicy { check: &'static str, reason: String },
}
