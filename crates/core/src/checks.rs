//! Check types, enabled-check sets and per-check policy configuration.
//!
//! The configuration is resolved server-side from the candidate's package
//! and handed to the engine read-only. Missing policies mean "no aggregate
//! constraint", never an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CHECK_ADDRESS: &str = "ADDRESS";
pub const CHECK_EMPLOYMENT: &str = "EMPLOYMENT";
pub const CHECK_EDUCATION: &str = "EDUCATION";
pub const CHECK_IDENTITY: &str = "IDENTITY";

/// All valid check-type codes.
pub const VALID_CHECK_CODES: &[&str] =
    &[CHECK_ADDRESS, CHECK_EMPLOYMENT, CHECK_EDUCATION, CHECK_IDENTITY];

/// History keywords accepted in ADDRESS / EMPLOYMENT policies.
pub const HISTORY_PERMANENT: &str = "permanent";
pub const HISTORY_CURRENT: &str = "current";
pub const HISTORY_PAST: &str = "past";

/// Education level codes.
pub const LEVEL_SSLC: &str = "SSLC";
pub const LEVEL_HSC: &str = "HSC";
pub const LEVEL_DIPLOMA: &str = "DIPLOMA";
pub const LEVEL_UNDER_GRADUATE: &str = "UNDER_GRADUATE";

// ---------------------------------------------------------------------------
// CheckType
// ---------------------------------------------------------------------------

/// A category of background-verification work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckType {
    Address,
    Employment,
    Education,
    Identity,
}

impl CheckType {
    /// Parse a check code (case-insensitive).
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        match code.trim().to_ascii_uppercase().as_str() {
            CHECK_ADDRESS => Ok(Self::Address),
            CHECK_EMPLOYMENT => Ok(Self::Employment),
            CHECK_EDUCATION => Ok(Self::Education),
            CHECK_IDENTITY => Ok(Self::Identity),
            _ => Err(CoreError::UnknownCheckType(code.to_string())),
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Address => CHECK_ADDRESS,
            Self::Employment => CHECK_EMPLOYMENT,
            Self::Education => CHECK_EDUCATION,
            Self::Identity => CHECK_IDENTITY,
        }
    }
}

// ---------------------------------------------------------------------------
// EnabledChecks
// ---------------------------------------------------------------------------

/// The set of check types active for a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledChecks(BTreeSet<CheckType>);

impl EnabledChecks {
    pub fn new(checks: impl IntoIterator<Item = CheckType>) -> Self {
        Self(checks.into_iter().collect())
    }

    /// Every known check type.
    pub fn all() -> Self {
        Self::new([
            CheckType::Address,
            CheckType::Employment,
            CheckType::Education,
            CheckType::Identity,
        ])
    }

    /// Build from raw codes, rejecting unknown ones.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Result<Self, CoreError> {
        codes
            .iter()
            .map(|c| CheckType::from_code(c.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Parse a comma-separated list of codes (`"ADDRESS,EDUCATION"`).
    pub fn parse_csv(csv: &str) -> Result<Self, CoreError> {
        let codes: Vec<&str> = csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        Self::from_codes(&codes)
    }

    pub fn contains(&self, check: CheckType) -> bool {
        self.0.contains(&check)
    }

    pub fn iter(&self) -> impl Iterator<Item = CheckType> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// A policy value that may arrive as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyValue {
    Number(f64),
    Text(String),
}

impl PolicyValue {
    /// Integer interpretation: numbers truncate, strings use their leading
    /// integer prefix (`"5 years"` is 5). Unparseable values are `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Self::Number(_) => None,
            Self::Text(s) => parse_leading_int(s),
        }
    }

    fn as_keyword(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.trim().to_ascii_lowercase()),
            Self::Number(_) => None,
        }
    }
}

/// Parse the leading integer of a string the way a lenient form would:
/// skip leading whitespace, accept an optional sign, then consume digits.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// ADDRESS / EMPLOYMENT policy: `{ history, customHistory? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPolicy {
    #[serde(default)]
    pub history: Option<PolicyValue>,
    #[serde(default)]
    pub custom_history: Option<PolicyValue>,
}

/// What a [`HistoryPolicy`] actually demands of the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRequirement {
    /// Nothing to enforce.
    Unconstrained,
    /// At least one permanent entry.
    Permanent,
    /// At least one current / ongoing entry.
    Current,
    /// Merged coverage of at least this many years.
    Years(u32),
}

impl HistoryPolicy {
    /// Resolve the policy into a concrete requirement.
    ///
    /// `past` takes its years from `customHistory` (falling back to
    /// `history`); a bare numeric `history` is a years requirement in its
    /// own right. Unparseable or negative years resolve to zero.
    pub fn requirement(&self) -> HistoryRequirement {
        let keyword = self.history.as_ref().and_then(PolicyValue::as_keyword);
        match keyword.as_deref() {
            Some(HISTORY_PERMANENT) => HistoryRequirement::Permanent,
            Some(HISTORY_CURRENT) => HistoryRequirement::Current,
            Some(HISTORY_PAST) => HistoryRequirement::Years(self.required_years()),
            _ => match self.history.as_ref().and_then(PolicyValue::as_int) {
                Some(_) => HistoryRequirement::Years(self.required_years()),
                None if self.custom_history.is_some() => {
                    HistoryRequirement::Years(self.required_years())
                }
                None => HistoryRequirement::Unconstrained,
            },
        }
    }

    /// Reject policies whose shape cannot be meant seriously: an unknown
    /// history keyword, or a negative number of years.
    ///
    /// [`requirement`](Self::requirement) stays lenient regardless; this is
    /// for configuration entering the system.
    pub fn validate(&self, check: CheckType) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidPolicy {
            check: check.as_code(),
            reason,
        };

        if let Some(PolicyValue::Text(raw)) = &self.history {
            let keyword = raw.trim().to_ascii_lowercase();
            let known =
                [HISTORY_PERMANENT, HISTORY_CURRENT, HISTORY_PAST].contains(&keyword.as_str());
            if !known && parse_leading_int(raw).is_none() {
                return Err(invalid(format!(
                    "unknown history '{raw}'. \
                     Must be one of: permanent, current, past, or a number of years"
                )));
            }
        }

        let years = [
            ("history", &self.history),
            ("customHistory", &self.custom_history),
        ];
        for (field, value) in years {
            if value.as_ref().and_then(PolicyValue::as_int).is_some_and(|y| y < 0) {
                return Err(invalid(format!("{field} must not be negative")));
            }
        }

        Ok(())
    }

    fn required_years(&self) -> u32 {
        self.custom_history
            .as_ref()
            .or(self.history.as_ref())
            .and_then(PolicyValue::as_int)
            .map_or(0, |y| y.clamp(0, i64::from(u32::MAX)) as u32)
    }
}

/// EDUCATION policy: `{ levels: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationPolicy {
    #[serde(default)]
    pub levels: Vec<String>,
}

impl EducationPolicy {
    pub fn requires(&self, level: &str) -> bool {
        self.levels.iter().any(|l| l.eq_ignore_ascii_case(level))
    }
}

/// IDENTITY policy: `{ mandatory: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPolicy {
    #[serde(default)]
    pub mandatory: Vec<String>,
}

// ---------------------------------------------------------------------------
// CheckConfig
// ---------------------------------------------------------------------------

/// Per-check-type policy map.
///
/// Keys are check codes; unknown keys from the server (other check types
/// this engine does not gate on) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CheckConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<HistoryPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment: Option<HistoryPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<EducationPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityPolicy>,
}

impl CheckConfig {
    /// Parse a configuration document.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("Invalid check configuration: {e}")))?;
        Self::from_value(value)
    }

    /// Build from an already-decoded JSON value, one check at a time so a
    /// badly typed policy is reported against its check code.
    ///
    /// `null` policies count as absent; keys for other check types are
    /// ignored.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(CoreError::Validation(
                "Invalid check configuration: expected a JSON object".into(),
            ));
        };

        Ok(Self {
            address: take_policy(&mut map, CheckType::Address)?,
            employment: take_policy(&mut map, CheckType::Employment)?,
            education: take_policy(&mut map, CheckType::Education)?,
            identity: take_policy(&mut map, CheckType::Identity)?,
        })
    }

    /// Check the shape of every history policy present.
    pub fn validate(&self) -> Result<(), CoreError> {
        for check in [CheckType::Address, CheckType::Employment] {
            if let Some(policy) = self.history_policy(check) {
                policy.validate(check)?;
            }
        }
        Ok(())
    }

    /// History policy for ADDRESS or EMPLOYMENT; `None` for the other checks.
    pub fn history_policy(&self, check: CheckType) -> Option<&HistoryPolicy> {
        match check {
            CheckType::Address => self.address.as_ref(),
            CheckType::Employment => self.employment.as_ref(),
            CheckType::Education | CheckType::Identity => None,
        }
    }
}

fn take_policy<P: serde::de::DeserializeOwned>(
    map: &mut serde_json::Map<String, serde_json::Value>,
    check: CheckType,
) -> Result<Option<P>, CoreError> {
    match map.remove(check.as_code()) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| CoreError::InvalidPolicy {
                check: check.as_code(),
                reason: e.to_string(),
            }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
