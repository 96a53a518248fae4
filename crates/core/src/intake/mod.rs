//! Stepwise intake validation.
//!
//! Error maps, aggregate policy resolution, step navigation, per-step
//! validation and resume-step resolution. Everything here is pure and
//! side-effect free.

pub mod error_map;
pub mod policy;
pub mod resume;
pub mod step;
pub mod validator;
