//! Keyed validation errors for a single intake step.
//!
//! Keys are a contract with the UI: it locates the input (or banner) to
//! focus by the same string. Entry-scoped keys always use the entry's stable
//! id, never its position in the list, so they survive reordering and
//! removal of earlier rows.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Key prefixes
// ---------------------------------------------------------------------------

pub const SECTION_ADDRESS: &str = "addr";
pub const SECTION_IDENTITY: &str = "id";
pub const SECTION_EDUCATION: &str = "edu";
pub const SECTION_EMPLOYMENT: &str = "emp";
pub const SECTION_REFERENCES: &str = "ref";

/// Suffix of section-scoped (aggregate) keys.
pub const GENERAL_SUFFIX: &str = "general";

/// Key of the review-step declaration.
pub const CONSENT_KEY: &str = "consent";

/// `<section>_<entryId>_<field>`
pub fn entry_key(section: &str, entry_id: &str, field: &str) -> String {
    format!("{section}_{entry_id}_{field}")
}

/// `<section>_general`
pub fn general_key(section: &str) -> String {
    format!("{section}_{GENERAL_SUFFIX}")
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// What kind of rule a violation broke. All of them are user-correctable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A mandatory field is empty.
    FieldRequired,
    /// Email, phone, pincode, GPA, date or similar pattern mismatch.
    FieldFormatInvalid,
    /// An end date precedes its start date.
    DateOrderInvalid,
    /// Two entries' effective intervals overlap.
    OverlapInvalid,
    /// Merged history is shorter than the configured minimum.
    CoverageInsufficient,
    /// A configured set of required categories is not covered.
    SetIncomplete,
}

/// Whether a key addresses one input or a whole section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope {
    Field,
    Aggregate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub kind: ViolationKind,
    pub scope: ErrorScope,
}

// ---------------------------------------------------------------------------
// ErrorMap
// ---------------------------------------------------------------------------

/// Insertion-ordered map from error key to error.
///
/// Created fresh by every validation call. Re-inserting an existing key
/// replaces the message but keeps the key's original position, so the
/// "first error" the UI focuses stays stable.
///
/// Serializes as a flat `{ key: message }` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: IndexMap<String, FieldError>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field-level violation.
    pub fn insert_field(
        &mut self,
        key: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) {
        self.insert(key.into(), kind, ErrorScope::Field, message.into());
    }

    /// Record a section-level (aggregate) violation.
    pub fn insert_aggregate(
        &mut self,
        key: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) {
        self.insert(key.into(), kind, ErrorScope::Aggregate, message.into());
    }

    fn insert(&mut self, key: String, kind: ViolationKind, scope: ErrorScope, message: String) {
        self.entries.insert(
            key,
            FieldError {
                message,
                kind,
                scope,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.entries.get(key)
    }

    /// Message stored under `key`.
    pub fn message(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.message.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Key the UI should focus first.
    pub fn first_key(&self) -> Option<&str> {
        self.entries.keys().next().map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys of section-level errors, in insertion order.
    pub fn aggregate_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| e.scope == ErrorScope::Aggregate)
            .map(|(k, _)| k.clone())
            .collect()
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, error) in &self.entries {
            map.serialize_entry(key, &error.message)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
