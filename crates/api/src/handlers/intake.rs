//! Handlers for the `/intake` resource.
//!
//! Thin adapters over the pure engine in `bgv_core::intake`: decode the
//! form state and configuration, run the engine, wrap the result.

use axum::extract::{Path, Query, State};
use axum::Json;
use bgv_core::checks::{CheckConfig, EnabledChecks};
use bgv_core::coverage::{compute_coverage_years, merge_intervals, CoverageBreakdown, Interval};
use bgv_core::dates::parse_form_date;
use bgv_core::form::FormRecord;
use bgv_core::intake::resume::{resolve_resume_point_at, ResumePoint};
use bgv_core::intake::step::{next_step, reachable_steps, IntakeStep};
use bgv_core::intake::validator::{step_report_at, validate_step_at, StepValidationReport};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

// ── Request types ────────────────────────────────────────────────────

/// Body shared by the step, advance and resume endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    #[serde(default)]
    pub form: FormRecord,
    /// Overrides the server's default policy when present. Kept raw so a
    /// badly typed policy surfaces as `INVALID_POLICY` for its check.
    #[serde(default)]
    pub check_config: Option<serde_json::Value>,
    #[serde(default)]
    pub enabled_checks: Vec<String>,
}

impl IntakeRequest {
    /// Resolve the effective policy and enabled-check set.
    ///
    /// A request-supplied policy is shape-checked; the default one was
    /// checked when it was loaded.
    fn resolve(&self, state: &AppState) -> AppResult<(CheckConfig, EnabledChecks)> {
        let enabled = EnabledChecks::from_codes(&self.enabled_checks)?;
        let config = match &self.check_config {
            Some(raw) => {
                let config = CheckConfig::from_value(raw.clone())?;
                config.validate()?;
                config
            }
            None => state.default_check_config.as_ref().clone(),
        };
        Ok((config, enabled))
    }
}

/// Query parameters for listing steps.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStepsParams {
    /// Comma-separated check codes.
    #[serde(default)]
    pub enabled_checks: Option<String>,
}

/// One raw interval in a coverage request. Dates accept the same formats
/// as form fields.
#[derive(Debug, Deserialize)]
pub struct CoverageIntervalInput {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverageRequest {
    pub intervals: Vec<CoverageIntervalInput>,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    pub step: u8,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceResponse {
    pub from: u8,
    /// Next reachable step; `None` when `from` was Review.
    pub to: Option<u8>,
    /// Whether the whole form is ready for submission.
    pub complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResponse {
    pub years: f64,
    pub breakdown: CoverageBreakdown,
    pub merged_intervals: Vec<Interval>,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// GET /api/v1/intake/steps?enabledChecks=ADDRESS,EDUCATION
///
/// List the steps reachable for the given check set, in wizard order.
pub async fn list_steps(
    Query(params): Query<ListStepsParams>,
) -> AppResult<Json<DataResponse<Vec<StepInfo>>>> {
    let enabled = match params.enabled_checks.as_deref() {
        Some(csv) => EnabledChecks::parse_csv(csv)?,
        None => EnabledChecks::default(),
    };

    let steps = reachable_steps(&enabled)
        .into_iter()
        .map(|step| StepInfo {
            step: step.to_number(),
            label: step.label(),
            check: step.check_type().map(|c| c.as_code()),
        })
        .collect();

    Ok(Json(DataResponse { data: steps }))
}

/// POST /api/v1/intake/steps/{step}/validate
///
/// Validate one step. A blocked step is not an HTTP error; the report
/// carries `valid: false` and the keyed errors.
pub async fn validate_step(
    State(state): State<AppState>,
    Path(step): Path<String>,
    AppJson(body): AppJson<IntakeRequest>,
) -> AppResult<Json<DataResponse<StepValidationReport>>> {
    let step = IntakeStep::parse(&step)?;
    let (config, enabled) = body.resolve(&state)?;

    let report = step_report_at(step, &body.form, &config, &enabled, Utc::now());
    tracing::debug!(
        step = step.to_number(),
        error_count = report.errors.len(),
        "Validated intake step"
    );

    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/intake/steps/{step}/advance
///
/// Validate the step and return the next reachable step. Responds 422
/// `STEP_BLOCKED` with the error map when the step has errors.
pub async fn advance_step(
    State(state): State<AppState>,
    Path(step): Path<String>,
    AppJson(body): AppJson<IntakeRequest>,
) -> AppResult<Json<DataResponse<AdvanceResponse>>> {
    let step = IntakeStep::parse(&step)?;
    let (config, enabled) = body.resolve(&state)?;

    if !step.is_reachable(&enabled) {
        return Err(AppError::BadRequest(format!(
            "Step {} ({}) is not enabled for this candidate",
            step.to_number(),
            step.label()
        )));
    }

    let errors = validate_step_at(step, &body.form, &config, &enabled, Utc::now());
    if !errors.is_empty() {
        tracing::debug!(
            step = step.to_number(),
            error_count = errors.len(),
            "Intake step blocked"
        );
        return Err(AppError::StepBlocked {
            step: step.to_number(),
            errors,
        });
    }

    let to = next_step(step, &enabled);
    Ok(Json(DataResponse {
        data: AdvanceResponse {
            from: step.to_number(),
            to: to.map(IntakeStep::to_number),
            complete: to.is_none(),
        },
    }))
}

/// POST /api/v1/intake/resume
///
/// Determine the step a returning candidate should continue on.
pub async fn resume(
    State(state): State<AppState>,
    AppJson(body): AppJson<IntakeRequest>,
) -> AppResult<Json<DataResponse<ResumePoint>>> {
    let (config, enabled) = body.resolve(&state)?;

    let point = resolve_resume_point_at(&body.form, &config, &enabled, Utc::now());
    tracing::info!(resume_step = point.step, reasons = ?point.reasons, "Resolved resume step");

    Ok(Json(DataResponse { data: point }))
}

/// POST /api/v1/intake/coverage
///
/// Merge the supplied intervals and report the covered duration.
pub async fn coverage(
    AppJson(body): AppJson<CoverageRequest>,
) -> AppResult<Json<DataResponse<CoverageResponse>>> {
    let intervals = body
        .intervals
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let start = parse_form_date(&raw.start).ok_or_else(|| {
                AppError::BadRequest(format!("intervals[{index}].start is not a valid date"))
            })?;
            let end = parse_form_date(&raw.end).ok_or_else(|| {
                AppError::BadRequest(format!("intervals[{index}].end is not a valid date"))
            })?;
            Ok(Interval::checked(start, end)?)
        })
        .collect::<AppResult<Vec<_>>>()?;

    let years = compute_coverage_years(&intervals);

    Ok(Json(DataResponse {
        data: CoverageResponse {
            years,
            breakdown: CoverageBreakdown::from_years(years),
            merged_intervals: merge_intervals(&intervals),
        },
    }))
}
