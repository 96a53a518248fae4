//! Per-step validation of the intake form.
//!
//! Each call builds a fresh [`ErrorMap`] for one step: field rules for every
//! entry first, then the section's aggregate policy. An empty map means the
//! step may be advanced. Validation never fails and never has side effects;
//! "now" is an explicit input so results are reproducible.

use chrono::Utc;
use serde::Serialize;

use crate::checks::{CheckConfig, CheckType, EnabledChecks};
use crate::dates::{display_date, DateValue};
use crate::field_rules::{is_whole_number, FieldRules};
use crate::form::{
    AddressEntry, BasicSection, EducationEntry, EmploymentEntry, FormRecord, IdVerification,
    IdentityDocument, ReferenceEntry, TemporalEntry,
};
use crate::intake::error_map::{
    general_key, ErrorMap, ViolationKind, CONSENT_KEY, SECTION_ADDRESS, SECTION_EDUCATION,
    SECTION_EMPLOYMENT, SECTION_IDENTITY, SECTION_REFERENCES,
};
use crate::intake::policy::resolve_policy;
use crate::intake::step::IntakeStep;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate `step` as of the current instant.
pub fn validate_step(
    step: IntakeStep,
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
) -> ErrorMap {
    validate_step_at(step, form, config, enabled, Utc::now())
}

/// Validate `step`, treating open-ended entries as running until `now`.
///
/// A step whose check type is not enabled has nothing to validate and
/// yields an empty map.
pub fn validate_step_at(
    step: IntakeStep,
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
    now: Timestamp,
) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if !step.is_reachable(enabled) {
        return errors;
    }

    match step {
        IntakeStep::Basic => validate_basic(&mut errors, &form.basic, enabled, now),
        IntakeStep::Address => validate_addresses(&mut errors, &form.basic.addresses),
        IntakeStep::Identity => validate_identity(&mut errors, &form.id_verification),
        IntakeStep::Education => validate_education(&mut errors, &form.education),
        IntakeStep::Employment => {
            if form.employment.is_fresher {
                return errors;
            }
            validate_employment(&mut errors, &form.employment.entries, now);
        }
        IntakeStep::References => validate_references(&mut errors, &form.references),
        IntakeStep::Review => {
            FieldRules::bare(&mut errors).required_flag(
                CONSENT_KEY,
                form.consent,
                "Please accept the declaration to submit your details",
            );
        }
    }

    if let Some(check) = step.check_type() {
        apply_policy(&mut errors, check, config, form, now);
    }

    errors
}

/// Whether `step` has no blocking errors.
pub fn can_advance(
    step: IntakeStep,
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
) -> bool {
    validate_step(step, form, config, enabled).is_empty()
}

/// Validation outcome with the hints the UI needs to focus or scroll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidationReport {
    pub step: u8,
    pub label: &'static str,
    pub valid: bool,
    pub errors: ErrorMap,
    /// Section-level keys (banner messages) among `errors`.
    pub aggregate_keys: Vec<String>,
    /// Key of the first error, for focus.
    pub first_error_key: Option<String>,
}

impl StepValidationReport {
    pub fn new(step: IntakeStep, errors: ErrorMap) -> Self {
        Self {
            step: step.to_number(),
            label: step.label(),
            valid: errors.is_empty(),
            aggregate_keys: errors.aggregate_keys(),
            first_error_key: errors.first_key().map(str::to_string),
            errors,
        }
    }
}

/// Validate `step` at `now` and wrap the result in a report.
pub fn step_report_at(
    step: IntakeStep,
    form: &FormRecord,
    config: &CheckConfig,
    enabled: &EnabledChecks,
    now: Timestamp,
) -> StepValidationReport {
    StepValidationReport::new(step, validate_step_at(step, form, config, enabled, now))
}

// ---------------------------------------------------------------------------
// Aggregate policy
// ---------------------------------------------------------------------------

fn section_for(check: CheckType) -> &'static str {
    match check {
        CheckType::Address => SECTION_ADDRESS,
        CheckType::Employment => SECTION_EMPLOYMENT,
        CheckType::Education => SECTION_EDUCATION,
        CheckType::Identity => SECTION_IDENTITY,
    }
}

/// A policy failure replaces whatever section-level error was set.
fn apply_policy(
    errors: &mut ErrorMap,
    check: CheckType,
    config: &CheckConfig,
    form: &FormRecord,
    now: Timestamp,
) {
    let outcome = resolve_policy(check, config, form, now);
    if outcome.satisfied {
        return;
    }
    if let (Some(kind), Some(message)) = (outcome.kind, outcome.message) {
        errors.insert_aggregate(general_key(section_for(check)), kind, message);
    }
}

fn require_entries(errors: &mut ErrorMap, section: &str, empty: bool, message: &str) {
    if empty {
        errors.insert_aggregate(general_key(section), ViolationKind::FieldRequired, message);
    }
}

// ---------------------------------------------------------------------------
// Basic details
// ---------------------------------------------------------------------------

fn validate_basic(
    errors: &mut ErrorMap,
    basic: &BasicSection,
    enabled: &EnabledChecks,
    now: Timestamp,
) {
    let mut rules = FieldRules::bare(errors);
    rules.required("firstName", &basic.first_name, "First name");
    rules.required("lastName", &basic.last_name, "Last name");
    rules.required("fatherName", &basic.father_name, "Father's name");
    if basic.gender.trim().is_empty() {
        rules.fail("gender", ViolationKind::FieldRequired, "Please select a gender");
    }
    rules.email("email", &basic.email, "Email");
    rules.phone("phone", &basic.phone, "Mobile number");

    // Identity extraction supplies the date of birth when IDENTITY is on.
    let dob_required = !enabled.contains(CheckType::Identity);
    if let DateValue::Valid(dob) = rules.date("dob", &basic.dob, "Date of birth", dob_required) {
        if dob > now {
            rules.fail(
                "dob",
                ViolationKind::FieldFormatInvalid,
                "Date of birth cannot be in the future",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

fn validate_addresses(errors: &mut ErrorMap, addresses: &[AddressEntry]) {
    require_entries(
        errors,
        SECTION_ADDRESS,
        addresses.is_empty(),
        "Please add at least one address",
    );

    for addr in addresses {
        let mut rules = FieldRules::entry(errors, SECTION_ADDRESS, &addr.id);
        rules.required("addressLine1", &addr.address_line1, "Address line 1");
        rules.required("city", &addr.city, "City");
        rules.required("state", &addr.state, "State");
        rules.required("country", &addr.country, "Country");
        rules.required("addressType", &addr.address_type, "Address type");
        rules.pincode("pincode", &addr.pincode);

        if addr.delegates_contact() {
            rules.phone("siteContactMobile", &addr.site_contact_mobile, "Site contact mobile");
        }

        let from = rules.date("stayingFrom", &addr.staying_from, "Staying from", true);
        if !addr.is_current_address {
            let to = rules.date("stayingTo", &addr.staying_to, "Staying to", true);
            if let (DateValue::Valid(from), DateValue::Valid(to)) = (from, to) {
                if to < from {
                    rules.fail(
                        "stayingTo",
                        ViolationKind::DateOrderInvalid,
                        "Staying to date cannot be before staying from date",
                    );
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

fn validate_identity(errors: &mut ErrorMap, ids: &IdVerification) {
    if !ids.has_any_upload() {
        errors.insert_aggregate(
            general_key(SECTION_IDENTITY),
            ViolationKind::FieldRequired,
            "Please upload at least one identity document (PAN, Aadhar or Passport)",
        );
    }

    for document in IdentityDocument::ALL {
        let slot = ids.slot(document);
        if document.requires_id_number() && slot.has_upload() {
            let label = format!("{} number", document.label());
            FieldRules::entry(errors, SECTION_IDENTITY, document.label()).required(
                "idNumber",
                &slot.id_number,
                &label,
            );
        }
    }

    if !ids.consent {
        errors.insert_field(
            format!("{SECTION_IDENTITY}_consent"),
            ViolationKind::FieldRequired,
            "Please consent to the verification of your identity documents",
        );
    }
}

// ---------------------------------------------------------------------------
// Education
// ---------------------------------------------------------------------------

fn validate_education(errors: &mut ErrorMap, entries: &[EducationEntry]) {
    require_entries(
        errors,
        SECTION_EDUCATION,
        entries.is_empty(),
        "Please add at least one education record",
    );

    for edu in entries {
        let mut rules = FieldRules::entry(errors, SECTION_EDUCATION, &edu.id);
        rules.required("level", &edu.level, "Education level");
        rules.required("degree", &edu.degree, "Degree");
        rules.required("college", &edu.college, "College / School");
        rules.year("yearOfPassing", &edu.year_of_passing, "Year of passing");
        rules.gpa("gpa", &edu.gpa);
        rules.required("rollNumber", &edu.roll_number, "Roll number");
        if edu.documents.is_empty() && !edu.provide_later {
            rules.fail(
                "documents",
                ViolationKind::FieldRequired,
                "Please upload at least one document or choose to provide it later",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Employment
// ---------------------------------------------------------------------------

fn validate_employment(errors: &mut ErrorMap, entries: &[EmploymentEntry], now: Timestamp) {
    require_entries(
        errors,
        SECTION_EMPLOYMENT,
        entries.is_empty(),
        "Please add at least one employment record",
    );

    for emp in entries {
        let mut rules = FieldRules::entry(errors, SECTION_EMPLOYMENT, &emp.id);
        rules.required("companyName", &emp.company_name, "Company name");
        rules.required("designation", &emp.designation, "Designation");
        rules.required("employeeId", &emp.employee_id, "Employee ID");
        let joined = rules.date("joinedDate", &emp.joined_date, "Joining date", true);

        if !emp.is_current {
            let relieved = rules.date("relievedDate", &emp.relieved_date, "Relieved date", true);
            rules.required("reasonForLeaving", &emp.reason_for_leaving, "Reason for leaving");
            if let (DateValue::Valid(joined), DateValue::Valid(relieved)) = (joined, relieved) {
                if relieved <= joined {
                    rules.fail(
                        "relievedDate",
                        ViolationKind::DateOrderInvalid,
                        "Relieved date must be after joining date",
                    );
                }
            }
        }

        rules.required("hrName", &emp.hr_name, "HR name");
        rules.email("hrEmail", &emp.hr_email, "HR email");
        rules.phone("hrPhone", &emp.hr_phone, "HR phone");

        if emp.documents.is_empty() && !emp.provide_later {
            rules.fail(
                "documents",
                ViolationKind::FieldRequired,
                "Please upload at least one document or choose to provide it later",
            );
        }
    }

    flag_overlaps(errors, entries, now);
}

/// Flag every entry that starts on or before the end of an earlier one.
///
/// Entries are ordered by start; each is compared with the earlier entry
/// whose effective end reaches furthest, which is named in the message.
fn flag_overlaps(errors: &mut ErrorMap, entries: &[EmploymentEntry], now: Timestamp) {
    let mut spans: Vec<(&EmploymentEntry, Timestamp, Timestamp)> = entries
        .iter()
        .filter_map(|e| e.effective_interval(now).map(|i| (e, i.start, i.end)))
        .collect();
    spans.sort_by_key(|(_, start, _)| *start);

    let mut reach: Option<(&EmploymentEntry, Timestamp)> = None;
    for (emp, start, end) in spans {
        if let Some((prior, prior_end)) = reach {
            if start <= prior_end {
                let ended = if prior.is_current {
                    "present".to_string()
                } else {
                    display_date(prior_end)
                };
                let company = if prior.company_name.trim().is_empty() {
                    "a previous employer"
                } else {
                    prior.company_name.trim()
                };
                FieldRules::entry(errors, SECTION_EMPLOYMENT, emp.entry_id()).fail(
                    "joinedDate",
                    ViolationKind::OverlapInvalid,
                    format!("Employment dates overlap with {company} (until {ended})"),
                );
            }
        }
        if reach.map_or(true, |(_, prior_end)| end > prior_end) {
            reach = Some((emp, end));
        }
    }
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

fn validate_references(errors: &mut ErrorMap, references: &[ReferenceEntry]) {
    require_entries(
        errors,
        SECTION_REFERENCES,
        references.is_empty(),
        "Please add at least one reference",
    );

    for reference in references {
        let mut rules = FieldRules::entry(errors, SECTION_REFERENCES, &reference.id);
        rules.required("name", &reference.name, "Name");
        rules.required("designation", &reference.designation, "Designation");
        rules.required("company", &reference.company, "Company");
        rules.required("relationship", &reference.relationship, "Relationship");
        if rules.required("yearsKnown", &reference.years_known, "Years known") {
            rules.optional_format(
                "yearsKnown",
                &reference.years_known,
                is_whole_number,
                "Years known must be a whole number",
            );
        }
        rules.email("email", &reference.email, "Email");
        rules.phone("phone", &reference.phone, "Phone");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
