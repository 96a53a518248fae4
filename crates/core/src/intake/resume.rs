//! Resume-step resolution for returning candidates.
//!
//! Replays step validation over a persisted form record and lands the
//! candidate on the first reachable step that still needs attention, or on
//! Review when everything before it is complete.

use chrono::Utc;
use serde::Serialize;

use crate::checks::{CheckConfig, EnabledChecks};
use crate::form::FormRecord;
use crate::intake::step::{reachable_steps, IntakeStep};
use crate::intake::validator::validate_step_at;
use crate::types::Timestamp;

/// Marker reason used when a step validates cleanly but holds no data.
pub const REASON_NO_DATA: &str = "no_data";

/// Where a returning candidate should continue, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePoint {
    pub step: u8,
    pub label: &'static str,
    /// Error keys (or [`REASON_NO_DATA`]) that made the step incomplete.
    /// Empty when resuming on Review.
    pub reasons: Vec<String>,
}

impl ResumePoint {
    fn new(step: IntakeStep, reasons: Vec<String>) -> Self {
        Self {
            step: step.to_number(),
            label: step.label(),
            reasons,
        }
    }
}

/// Whether the step's section holds any data at all.
///
/// Guards against a step passing vacuously because there was nothing to
/// check.
pub fn has_step_data(step: IntakeStep, form: &FormRecord) -> bool {
    match step {
        IntakeStep::Basic => !form.basic.first_name.trim().is_empty(),
        IntakeStep::Address => !form.basic.addresses.is_empty(),
        IntakeStep::Identity => form.id_verification.has_any_upload(),
        IntakeStep::Education => !form.education.is_empty(),
        IntakeStep::Employment => form.employment.is_fresher || !form.employment.entries.is_empty(),
        IntakeStep::References => !form.references.is_empty(),
        IntakeStep::Review => true,
    }
}

/// Resolve the resume step as of the current instant.
pub fn resolve_resume_step(
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
) -> IntakeStep {
    resolve_resume_step_at(form, config, enabled, Utc::now())
}

/// Resolve the resume step, treating open-ended entries as running until
/// `now`.
pub fn resolve_resume_step_at(
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
    now: Timestamp,
) -> IntakeStep {
    find_resume_step(form, config, enabled, now).0
}

/// Resolve the resume step at `now`, with the reasons it was chosen.
pub fn resolve_resume_point_at(
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
    now: Timestamp,
) -> ResumePoint {
    let (step, reasons) = find_resume_step(form, config, enabled, now);
    ResumePoint::new(step, reasons)
}

fn find_resume_step(
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
    now: Timestamp,
) -> (IntakeStep, Vec<String>) {
    for step in reachable_steps(enabled) {
        if step == IntakeStep::Review {
            break;
        }

        let errors = validate_step_at(step, form, config, enabled, now);
        if !errors.is_empty() {
            return (step, errors.keys().map(str::to_string).collect());
        }
        // Guard only: every section validator already rejects an empty
        // section, so this fires only if one stops doing so.
        if !has_step_data(step, form) {
            return (step, vec![REASON_NO_DATA.to_string()]);
        }
    }

    (IntakeStep::Review, Vec::new())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
