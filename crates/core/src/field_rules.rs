//! Field-level required and format rules.
//!
//! [`FieldRules`] writes violations for one scope (the bare basic-details
//! form, or one entry of a repeatable section) into an [`ErrorMap`], deriving
//! each key from the scope and the field name.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::dates::{classify_date, DateValue};
use crate::intake::error_map::{entry_key, ErrorMap, ViolationKind};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Indian mobile number: ten digits starting 6-9.
pub const PHONE_PATTERN: &str = r"^[6-9]\d{9}$";

/// Postal index number: exactly six digits.
pub const PINCODE_PATTERN: &str = r"^\d{6}$";

/// GPA / percentage: integer or decimal.
pub const GPA_PATTERN: &str = r"^\d+(\.\d+)?$";

/// Four-digit calendar year.
pub const YEAR_PATTERN: &str = r"^\d{4}$";

/// Non-negative whole number.
pub const WHOLE_NUMBER_PATTERN: &str = r"^\d+$";

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));
static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PINCODE_PATTERN).expect("valid regex"));
static GPA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(GPA_PATTERN).expect("valid regex"));
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(YEAR_PATTERN).expect("valid regex"));
static WHOLE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(WHOLE_NUMBER_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// RFC-style address check plus a dotted domain (`user@host` alone is
/// rejected).
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if !value.to_string().validate_email() {
        return false;
    }
    value
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.') && !domain.ends_with('.'))
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value.trim())
}

pub fn is_valid_pincode(value: &str) -> bool {
    PINCODE_RE.is_match(value.trim())
}

pub fn is_valid_gpa(value: &str) -> bool {
    GPA_RE.is_match(value.trim())
}

pub fn is_valid_year(value: &str) -> bool {
    YEAR_RE.is_match(value.trim())
}

pub fn is_whole_number(value: &str) -> bool {
    WHOLE_NUMBER_RE.is_match(value.trim())
}

// ---------------------------------------------------------------------------
// FieldRules
// ---------------------------------------------------------------------------

enum KeyScope<'k> {
    /// Keys are the bare field names.
    Bare,
    /// Keys are `<section>_<entryId>_<field>`.
    Entry { section: &'k str, entry_id: &'k str },
}

/// Rule checker bound to one key scope.
pub struct FieldRules<'e, 'k> {
    errors: &'e mut ErrorMap,
    scope: KeyScope<'k>,
}

impl<'e, 'k> FieldRules<'e, 'k> {
    /// Rules whose keys are the plain field names (basic details).
    pub fn bare(errors: &'e mut ErrorMap) -> Self {
        Self {
            errors,
            scope: KeyScope::Bare,
        }
    }

    /// Rules for one entry of a repeatable section.
    pub fn entry(errors: &'e mut ErrorMap, section: &'k str, entry_id: &'k str) -> Self {
        Self {
            errors,
            scope: KeyScope::Entry { section, entry_id },
        }
    }

    /// Error key for `field` in this scope.
    pub fn key(&self, field: &str) -> String {
        match self.scope {
            KeyScope::Bare => field.to_string(),
            KeyScope::Entry { section, entry_id } => entry_key(section, entry_id, field),
        }
    }

    /// Record an arbitrary violation on `field`.
    pub fn fail(&mut self, field: &str, kind: ViolationKind, message: impl Into<String>) {
        let key = self.key(field);
        self.errors.insert_field(key, kind, message);
    }

    /// Non-blank text. Returns whether the value was present.
    pub fn required(&mut self, field: &str, value: &str, label: &str) -> bool {
        if is_blank(value) {
            self.fail(field, ViolationKind::FieldRequired, format!("{label} is required"));
            return false;
        }
        true
    }

    /// A boolean that must be set (checkbox, consent).
    pub fn required_flag(&mut self, field: &str, value: bool, message: &str) -> bool {
        if !value {
            self.fail(field, ViolationKind::FieldRequired, message);
        }
        value
    }

    /// Required value that must also satisfy `is_valid`.
    fn required_format(
        &mut self,
        field: &str,
        value: &str,
        label: &str,
        is_valid: fn(&str) -> bool,
        format_message: &str,
    ) -> bool {
        if !self.required(field, value, label) {
            return false;
        }
        if !is_valid(value) {
            self.fail(field, ViolationKind::FieldFormatInvalid, format_message);
            return false;
        }
        true
    }

    /// Optional value that, when present, must satisfy `is_valid`.
    pub fn optional_format(
        &mut self,
        field: &str,
        value: &str,
        is_valid: fn(&str) -> bool,
        format_message: &str,
    ) -> bool {
        if is_blank(value) || is_valid(value) {
            return true;
        }
        self.fail(field, ViolationKind::FieldFormatInvalid, format_message);
        false
    }

    pub fn email(&mut self, field: &str, value: &str, label: &str) -> bool {
        self.required_format(field, value, label, is_valid_email, "Enter a valid email address")
    }

    pub fn phone(&mut self, field: &str, value: &str, label: &str) -> bool {
        self.required_format(
            field,
            value,
            label,
            is_valid_phone,
            "Enter a valid 10-digit mobile number",
        )
    }

    pub fn pincode(&mut self, field: &str, value: &str) -> bool {
        self.required_format(
            field,
            value,
            "Pincode",
            is_valid_pincode,
            "Pincode must be exactly 6 digits",
        )
    }

    pub fn gpa(&mut self, field: &str, value: &str) -> bool {
        self.required_format(
            field,
            value,
            "GPA / Percentage",
            is_valid_gpa,
            "GPA / Percentage must be a number",
        )
    }

    pub fn year(&mut self, field: &str, value: &str, label: &str) -> bool {
        self.required_format(field, value, label, is_valid_year, "Enter a valid 4-digit year")
    }

    /// A date field. Blank is a `FieldRequired` violation only when
    /// `required`; unparseable input is always a format violation.
    pub fn date(&mut self, field: &str, raw: &str, label: &str, required: bool) -> DateValue {
        let value = classify_date(Some(raw));
        match value {
            DateValue::Absent if required => {
                self.fail(field, ViolationKind::FieldRequired, format!("{label} is required"));
            }
            DateValue::Invalid => {
                self.fail(field, ViolationKind::FieldFormatInvalid, "Enter a valid date");
            }
            _ => {}
        }
        value
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
