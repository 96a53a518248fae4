//! Background-verification intake validation engine.
//!
//! Pure logic only: every operation takes the already-parsed form state and
//! the already-resolved check configuration by reference and returns a fresh
//! result. Nothing here performs I/O or keeps state between calls.

pub mod checks;
pub mod coverage;
pub mod dates;
pub mod error;
pub mod field_rules;
pub mod form;
pub mod intake;
pub mod types;
