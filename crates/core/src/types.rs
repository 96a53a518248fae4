/// Stable identifier of a repeatable form entry (address, employment, ...).
///
/// Generated once by the UI layer when the row is added and never reused.
pub type EntryId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh entry identifier.
///
/// The engine itself never creates entries; this exists for callers and
/// fixtures that need ids in the same shape the UI produces.
pub fn new_entry_id() -> EntryId {
    uuid::Uuid::new_v4().to_string()
}
