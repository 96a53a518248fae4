//! Candidate intake form state.
//!
//! These types mirror the JSON the intake UI keeps in memory and persists
//! between sessions. Every field defaults so that partially filled records
//! (a candidate who abandoned the form half way) still deserialize. Free-text
//! and numeric inputs are kept as strings exactly as typed; interpretation
//! happens in the field rules.

use serde::{Deserialize, Deserializer, Serialize};

use crate::coverage::Interval;
use crate::dates::{classify_date, DateValue};
use crate::types::{EntryId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const ADDRESS_TYPE_PERMANENT: &str = "PERMANENT";
pub const ADDRESS_TYPE_CURRENT: &str = "CURRENT";

/// Contact delegate value meaning the candidate is their own site contact.
pub const CONTACT_DELEGATE_SELF: &str = "self";

fn default_contact_delegate() -> String {
    CONTACT_DELEGATE_SELF.to_string()
}

/// Accept a JSON string, number, bool or null and keep it as a string.
///
/// Inputs like GPA, year of passing or years-known arrive as either numbers
/// or strings depending on which widget produced them.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Temporal entries
// ---------------------------------------------------------------------------

/// Shape shared by entries that occupy a span of time.
///
/// When [`is_open_ended`](Self::is_open_ended) is true the end field is
/// ignored and the span runs until the evaluation instant.
pub trait TemporalEntry {
    fn entry_id(&self) -> &str;
    fn start_raw(&self) -> &str;
    fn end_raw(&self) -> &str;
    fn is_open_ended(&self) -> bool;

    fn start(&self) -> DateValue {
        classify_date(Some(self.start_raw()))
    }

    fn end(&self) -> DateValue {
        classify_date(Some(self.end_raw()))
    }

    /// Effective end: `now` when open-ended, otherwise the parsed end date.
    fn effective_end(&self, now: Timestamp) -> Option<Timestamp> {
        if self.is_open_ended() {
            Some(now)
        } else {
            self.end().timestamp()
        }
    }

    /// The entry's span, if both ends are usable.
    fn effective_interval(&self, now: Timestamp) -> Option<Interval> {
        let start = self.start().timestamp()?;
        let end = self.effective_end(now)?;
        Some(Interval::new(start, end))
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Reference to an already-uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    #[serde(default)]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Basic section
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressEntry {
    pub id: EntryId,
    pub address_line1: String,
    pub address_line2: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: String,
    pub address_type: String,
    #[serde(default = "default_contact_delegate")]
    pub contact_delegate: String,
    pub site_contact_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub site_contact_mobile: String,
    pub staying_from: String,
    pub staying_to: String,
    pub is_current_address: bool,
}

impl AddressEntry {
    pub fn is_permanent(&self) -> bool {
        self.address_type.eq_ignore_ascii_case(ADDRESS_TYPE_PERMANENT)
    }

    /// Current either by flag or by declared address type.
    pub fn is_current(&self) -> bool {
        self.is_current_address || self.address_type.eq_ignore_ascii_case(ADDRESS_TYPE_CURRENT)
    }

    pub fn delegates_contact(&self) -> bool {
        !self.contact_delegate.trim().eq_ignore_ascii_case(CONTACT_DELEGATE_SELF)
    }
}

impl TemporalEntry for AddressEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }
    fn start_raw(&self) -> &str {
        &self.staying_from
    }
    fn end_raw(&self) -> &str {
        &self.staying_to
    }
    fn is_open_ended(&self) -> bool {
        self.is_current_address
    }
}

/// Identity fields plus the address history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicSection {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub father_name: String,
    pub gender: String,
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    pub dob: String,
    pub addresses: Vec<AddressEntry>,
}

// ---------------------------------------------------------------------------
// Identity section
// ---------------------------------------------------------------------------

/// Identity document types a candidate may upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityDocument {
    Pan,
    Aadhar,
    Passport,
}

impl IdentityDocument {
    pub const ALL: [IdentityDocument; 3] = [Self::Pan, Self::Aadhar, Self::Passport];

    /// Label used in configuration, error keys and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pan => "PAN",
            Self::Aadhar => "Aadhar",
            Self::Passport => "Passport",
        }
    }

    /// Parse a configuration label (case-insensitive, `Aadhaar` accepted).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pan" => Some(Self::Pan),
            "aadhar" | "aadhaar" => Some(Self::Aadhar),
            "passport" => Some(Self::Passport),
            _ => None,
        }
    }

    /// Whether an extracted id number must accompany the upload.
    pub fn requires_id_number(self) -> bool {
        matches!(self, Self::Pan | Self::Aadhar)
    }
}

/// Upload slot for one identity document type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentitySlot {
    pub files: Vec<DocumentRef>,
    /// Number extracted from the document (OCR), possibly edited by the user.
    #[serde(deserialize_with = "lenient_string")]
    pub id_number: String,
}

impl IdentitySlot {
    pub fn has_upload(&self) -> bool {
        !self.files.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdVerification {
    pub pan: IdentitySlot,
    pub aadhar: IdentitySlot,
    pub passport: IdentitySlot,
    /// Consent to verify the uploaded identity documents.
    pub consent: bool,
}

impl IdVerification {
    pub fn slot(&self, document: IdentityDocument) -> &IdentitySlot {
        match document {
            IdentityDocument::Pan => &self.pan,
            IdentityDocument::Aadhar => &self.aadhar,
            IdentityDocument::Passport => &self.passport,
        }
    }

    pub fn has_any_upload(&self) -> bool {
        IdentityDocument::ALL.iter().any(|d| self.slot(*d).has_upload())
    }
}

// ---------------------------------------------------------------------------
// Education section
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: EntryId,
    pub level: String,
    pub degree: String,
    pub college: String,
    pub university: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year_of_passing: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: String,
    #[serde(deserialize_with = "lenient_string")]
    pub roll_number: String,
    pub documents: Vec<DocumentRef>,
    /// Candidate will upload documents at a later stage.
    pub provide_later: bool,
}

// ---------------------------------------------------------------------------
// Employment section
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmploymentEntry {
    pub id: EntryId,
    pub company_name: String,
    pub designation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub employee_id: String,
    pub joined_date: String,
    pub relieved_date: String,
    pub is_current: bool,
    pub reason_for_leaving: String,
    pub hr_name: String,
    pub hr_email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hr_phone: String,
    pub documents: Vec<DocumentRef>,
    pub provide_later: bool,
}

impl TemporalEntry for EmploymentEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }
    fn start_raw(&self) -> &str {
        &self.joined_date
    }
    fn end_raw(&self) -> &str {
        &self.relieved_date
    }
    fn is_open_ended(&self) -> bool {
        self.is_current
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmploymentSection {
    pub is_fresher: bool,
    pub entries: Vec<EmploymentEntry>,
}

// ---------------------------------------------------------------------------
// References section
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceEntry {
    pub id: EntryId,
    pub name: String,
    pub designation: String,
    pub company: String,
    pub relationship: String,
    #[serde(deserialize_with = "lenient_string")]
    pub years_known: String,
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
}

// ---------------------------------------------------------------------------
// FormRecord
// ---------------------------------------------------------------------------

/// The whole intake form. Owned by the UI layer; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormRecord {
    pub basic: BasicSection,
    pub id_verification: IdVerification,
    pub education: Vec<EducationEntry>,
    pub employment: EmploymentSection,
    pub references: Vec<ReferenceEntry>,
    /// Final declaration on the review step.
    pub consent: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
