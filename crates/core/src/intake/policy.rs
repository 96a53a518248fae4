//! Aggregate policy resolution.
//!
//! Decides whether the entries of a section satisfy the configured policy
//! for its check type: required history coverage for ADDRESS/EMPLOYMENT,
//! required levels for EDUCATION and mandatory documents for IDENTITY.
//! A missing policy is "no aggregate constraint".

use serde::Serialize;

use crate::checks::{
    CheckConfig, CheckType, EducationPolicy, HistoryPolicy, HistoryRequirement, IdentityPolicy,
    LEVEL_DIPLOMA, LEVEL_HSC, LEVEL_SSLC, LEVEL_UNDER_GRADUATE,
};
use crate::coverage::{compute_coverage_years, CoverageBreakdown, Interval};
use crate::form::{
    AddressEntry, EducationEntry, EmploymentEntry, FormRecord, IdVerification, IdentityDocument,
    TemporalEntry,
};
use crate::intake::error_map::ViolationKind;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

pub const LABEL_SSLC: &str = "10th (SSLC)";
pub const LABEL_HSC_OR_DIPLOMA: &str = "12th (HSC) or Diploma";
pub const LABEL_UNDER_GRADUATE: &str = "Under Graduate (UG)";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of resolving one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyOutcome {
    pub satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ViolationKind>,
}

impl PolicyOutcome {
    pub fn satisfied() -> Self {
        Self {
            satisfied: true,
            message: None,
            kind: None,
        }
    }

    pub fn unsatisfied(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            message: Some(message.into()),
            kind: Some(kind),
        }
    }
}

// ---------------------------------------------------------------------------
// History entries
// ---------------------------------------------------------------------------

/// A temporal entry that can be judged against a history policy.
pub trait HistoryEntry: TemporalEntry {
    /// Counts towards a `permanent` requirement.
    fn is_permanent(&self) -> bool;
    /// Counts towards a `current` requirement.
    fn is_current(&self) -> bool;
}

impl HistoryEntry for AddressEntry {
    fn is_permanent(&self) -> bool {
        AddressEntry::is_permanent(self)
    }
    fn is_current(&self) -> bool {
        AddressEntry::is_current(self)
    }
}

// Employment has no address type: a "permanent" position is the ongoing one.
impl HistoryEntry for EmploymentEntry {
    fn is_permanent(&self) -> bool {
        self.is_current
    }
    fn is_current(&self) -> bool {
        self.is_current
    }
}

fn history_noun(check: CheckType) -> &'static str {
    match check {
        CheckType::Employment => "Employment",
        _ => "Residency",
    }
}

/// Intervals of every entry with a usable span.
pub fn effective_intervals<E: TemporalEntry>(entries: &[E], now: Timestamp) -> Vec<Interval> {
    entries
        .iter()
        .filter_map(|e| e.effective_interval(now))
        .collect()
}

/// Resolve an ADDRESS or EMPLOYMENT history policy.
pub fn resolve_history_policy<E: HistoryEntry>(
    check: CheckType,
    policy: &HistoryPolicy,
    entries: &[E],
    now: Timestamp,
) -> PolicyOutcome {
    match policy.requirement() {
        HistoryRequirement::Unconstrained => PolicyOutcome::satisfied(),
        HistoryRequirement::Permanent => {
            if entries.iter().any(HistoryEntry::is_permanent) {
                PolicyOutcome::satisfied()
            } else {
                let message = match check {
                    CheckType::Employment => "Details of your current employment are mandatory.",
                    _ => "A permanent address is mandatory.",
                };
                PolicyOutcome::unsatisfied(ViolationKind::SetIncomplete, message)
            }
        }
        HistoryRequirement::Current => {
            if entries.iter().any(HistoryEntry::is_current) {
                PolicyOutcome::satisfied()
            } else {
                let message = match check {
                    CheckType::Employment => "Details of your current employment are mandatory.",
                    _ => "A current address is mandatory.",
                };
                PolicyOutcome::unsatisfied(ViolationKind::SetIncomplete, message)
            }
        }
        HistoryRequirement::Years(required) => {
            let years = compute_coverage_years(&effective_intervals(entries, now));
            if years >= f64::from(required) {
                PolicyOutcome::satisfied()
            } else {
                let provided = CoverageBreakdown::from_years(years);
                PolicyOutcome::unsatisfied(
                    ViolationKind::CoverageInsufficient,
                    format!(
                        "{} history of {required} years is mandatory. You have provided {provided}.",
                        history_noun(check)
                    ),
                )
            }
        }
    }
}

/// Resolve an EDUCATION levels policy against the entered levels.
///
/// HSC and DIPLOMA are interchangeable: requiring either (or both) is a
/// single "one of them" check.
pub fn resolve_education_policy(
    policy: &EducationPolicy,
    entries: &[EducationEntry],
) -> PolicyOutcome {
    let entered = |level: &str| {
        entries
            .iter()
            .any(|e| e.level.trim().eq_ignore_ascii_case(level))
    };

    let mut missing: Vec<&str> = Vec::new();
    if policy.requires(LEVEL_SSLC) && !entered(LEVEL_SSLC) {
        missing.push(LABEL_SSLC);
    }
    if (policy.requires(LEVEL_HSC) || policy.requires(LEVEL_DIPLOMA))
        && !entered(LEVEL_HSC)
        && !entered(LEVEL_DIPLOMA)
    {
        missing.push(LABEL_HSC_OR_DIPLOMA);
    }
    if policy.requires(LEVEL_UNDER_GRADUATE) && !entered(LEVEL_UNDER_GRADUATE) {
        missing.push(LABEL_UNDER_GRADUATE);
    }

    if missing.is_empty() {
        PolicyOutcome::satisfied()
    } else {
        PolicyOutcome::unsatisfied(
            ViolationKind::SetIncomplete,
            format!("Please add education details for: {}", missing.join(", ")),
        )
    }
}

/// Resolve an IDENTITY mandatory-documents policy.
///
/// All missing document types are reported together in one message.
/// Labels that name no known document type are ignored.
pub fn resolve_identity_policy(policy: &IdentityPolicy, ids: &IdVerification) -> PolicyOutcome {
    let mut missing: Vec<&str> = Vec::new();
    for label in &policy.mandatory {
        let Some(document) = IdentityDocument::from_label(label) else {
            continue;
        };
        if !ids.slot(document).has_upload() && !missing.contains(&document.label()) {
            missing.push(document.label());
        }
    }

    if missing.is_empty() {
        PolicyOutcome::satisfied()
    } else {
        PolicyOutcome::unsatisfied(
            ViolationKind::SetIncomplete,
            format!(
                "Please upload the mandatory identity document(s): {}",
                missing.join(", ")
            ),
        )
    }
}

/// Resolve the configured policy for `check` against the relevant section
/// of `form`.
pub fn resolve_policy(
    check: CheckType,
    config: &CheckConfig,
    form: &FormRecord,
    now: Timestamp,
) -> PolicyOutcome {
    match check {
        CheckType::Address => config
            .address
            .as_ref()
            .map_or_else(PolicyOutcome::satisfied, |p| {
                resolve_history_policy(check, p, &form.basic.addresses, now)
            }),
        CheckType::Employment => config
            .employment
            .as_ref()
            .map_or_else(PolicyOutcome::satisfied, |p| {
                resolve_history_policy(check, p, &form.employment.entries, now)
            }),
        CheckType::Education => config
            .education
            .as_ref()
            .map_or_else(PolicyOutcome::satisfied, |p| {
                resolve_education_policy(p, &form.education)
            }),
        CheckType::Identity => config
            .identity
            .as_ref()
            .map_or_else(PolicyOutcome::satisfied, |p| {
                resolve_identity_policy(p, &form.id_verification)
            }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{DocumentRef, IdentitySlot};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn history(value: serde_json::Value) -> HistoryPolicy {
        serde_json::from_value(value).unwrap()
    }

    fn address(id: &str, from: &str, to: &str, address_type: &str) -> AddressEntry {
        AddressEntry {
            id: id.into(),
            staying_from: from.into(),
            staying_to: to.into(),
            address_type: address_type.into(),
            ..Default::default()
        }
    }

    fn education(level: &str) -> EducationEntry {
        EducationEntry {
            id: level.to_lowercase(),
            level: level.into(),
            ..Default::default()
        }
    }

    fn uploaded() -> IdentitySlot {
        IdentitySlot {
            files: vec![DocumentRef {
                file_name: "doc.pdf".into(),
                url: None,
            }],
            id_number: String::new(),
        }
    }

    #[test]
    fn permanent_address_required() {
        let policy = history(json!({ "history": "permanent" }));
        let entries = vec![address("a1", "2020-01-01", "2021-01-01", "CURRENT")];
        let outcome = resolve_history_policy(CheckType::Address, &policy, &entries, now());
        assert!(!outcome.satisfied);
        assert_eq!(outcome.kind, Some(ViolationKind::SetIncomplete));

        let entries = vec![address("a1", "2020-01-01", "2021-01-01", "PERMANENT")];
        assert!(resolve_history_policy(CheckType::Address, &policy, &entries, now()).satisfied);
    }

    #[test]
    fn current_address_by_flag() {
        let policy = history(json!({ "history": "current" }));
        let mut entry = address("a1", "2020-01-01", "", "PERMANENT");
        assert!(!resolve_history_policy(CheckType::Address, &policy, &[entry.clone()], now()).satisfied);
        entry.is_current_address = true;
        assert!(resolve_history_policy(CheckType::Address, &policy, &[entry], now()).satisfied);
    }

    #[test]
    fn insufficient_residency_reports_years_and_months() {
        let policy = history(json!({ "history": "past", "customHistory": 5 }));
        // 2019-07-02 .. 2024-01-01 is 1644 days, ~4.5 years.
        let entries = vec![
            address("a1", "2019-07-02", "2021-01-01", "PAST"),
            address("a2", "2021-01-01", "2024-01-01", "PERMANENT"),
        ];
        let outcome = resolve_history_policy(CheckType::Address, &policy, &entries, now());
        assert!(!outcome.satisfied);
        assert_eq!(outcome.kind, Some(ViolationKind::CoverageInsufficient));
        let message = outcome.message.unwrap();
        assert!(message.contains("5 years"), "{message}");
        assert!(message.contains("4 year(s) 6 month(s)"), "{message}");
        assert!(message.starts_with("Residency history"));
    }

    #[test]
    fn sufficient_coverage_with_open_ended_entry() {
        let policy = history(json!({ "history": 3 }));
        let mut current = address("a1", "2020-06-01", "", "CURRENT");
        current.is_current_address = true;
        let outcome = resolve_history_policy(CheckType::Address, &policy, &[current], now());
        assert!(outcome.satisfied);
    }

    #[test]
    fn entries_without_valid_start_are_excluded() {
        let policy = history(json!({ "history": "past", "customHistory": "1" }));
        let entries = vec![address("a1", "garbage", "2023-12-31", "PAST")];
        assert!(!resolve_history_policy(CheckType::Address, &policy, &entries, now()).satisfied);
    }

    #[test]
    fn employment_years_use_merged_coverage() {
        let policy = history(json!({ "history": 2 }));
        let entries = vec![
            EmploymentEntry {
                id: "e1".into(),
                joined_date: "2019-01-01".into(),
                relieved_date: "2020-01-01".into(),
                ..Default::default()
            },
            EmploymentEntry {
                id: "e2".into(),
                joined_date: "2019-06-01".into(),
                relieved_date: "2020-06-01".into(),
                ..Default::default()
            },
        ];
        // Naive sum would be ~2 years; merged is ~1.4.
        let outcome = resolve_history_policy(CheckType::Employment, &policy, &entries, now());
        assert!(!outcome.satisfied);
        let message = outcome.message.unwrap();
        assert!(message.starts_with("Employment history of 2 years"), "{message}");
        assert!(message.contains("1 year(s) 5 month(s)"), "{message}");
    }

    #[test]
    fn zero_required_years_is_always_satisfied() {
        let policy = history(json!({ "history": "past" }));
        let entries: Vec<AddressEntry> = Vec::new();
        assert!(resolve_history_policy(CheckType::Address, &policy, &entries, now()).satisfied);
    }

    #[test]
    fn education_levels_collect_missing_labels() {
        let policy = EducationPolicy {
            levels: vec![
                "SSLC".into(),
                "HSC".into(),
                "DIPLOMA".into(),
                "UNDER_GRADUATE".into(),
            ],
        };
        let outcome = resolve_education_policy(&policy, &[education("UNDER_GRADUATE")]);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Please add education details for: 10th (SSLC), 12th (HSC) or Diploma")
        );

        let outcome = resolve_education_policy(
            &policy,
            &[education("SSLC"), education("DIPLOMA"), education("UNDER_GRADUATE")],
        );
        assert!(outcome.satisfied);
    }

    #[test]
    fn education_without_requirements_is_satisfied() {
        let policy = EducationPolicy::default();
        assert!(resolve_education_policy(&policy, &[]).satisfied);
    }

    #[test]
    fn identity_missing_documents_are_concatenated() {
        let policy = IdentityPolicy {
            mandatory: vec!["PAN".into(), "Aadhar".into(), "Passport".into(), "Voter".into()],
        };
        let ids = IdVerification {
            aadhar: uploaded(),
            ..Default::default()
        };
        let outcome = resolve_identity_policy(&policy, &ids);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Please upload the mandatory identity document(s): PAN, Passport")
        );
    }

    #[test]
    fn missing_policy_means_no_constraint() {
        let config = CheckConfig::default();
        let form = FormRecord::default();
        for check in [
            CheckType::Address,
            CheckType::Employment,
            CheckType::Education,
            CheckType::Identity,
        ] {
            assert!(resolve_policy(check, &config, &form, now()).satisfied);
        }
    }
}
