//! Intake wizard steps and navigation.
//!
//! Steps are numbered 1..=7. A step tied to a check type is only reachable
//! when that check is enabled for the candidate; Basic, References and
//! Review are always reachable.

use serde::{Deserialize, Serialize};

use crate::checks::{CheckType, EnabledChecks};
use crate::error::CoreError;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 7;

/// The seven steps of the candidate intake wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    Basic,
    Address,
    Identity,
    Education,
    Employment,
    References,
    Review,
}

impl IntakeStep {
    /// All steps in wizard order.
    pub const ALL: [IntakeStep; 7] = [
        Self::Basic,
        Self::Address,
        Self::Identity,
        Self::Education,
        Self::Employment,
        Self::References,
        Self::Review,
    ];

    /// Convert a 1-based step number to an `IntakeStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Address),
            3 => Ok(Self::Identity),
            4 => Ok(Self::Education),
            5 => Ok(Self::Employment),
            6 => Ok(Self::References),
            7 => Ok(Self::Review),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Parse a step number as it appears in a URL segment.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let n: u8 = raw.trim().parse().map_err(|_| {
            CoreError::Validation(format!(
                "Invalid step number {raw}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))
        })?;
        Self::from_number(n)
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Basic => 1,
            Self::Address => 2,
            Self::Identity => 3,
            Self::Education => 4,
            Self::Employment => 5,
            Self::References => 6,
            Self::Review => 7,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic Details",
            Self::Address => "Address",
            Self::Identity => "Identity Verification",
            Self::Education => "Education",
            Self::Employment => "Employment",
            Self::References => "References",
            Self::Review => "Review & Submit",
        }
    }

    /// The check type that gates this step, if any.
    pub fn check_type(self) -> Option<CheckType> {
        match self {
            Self::Address => Some(CheckType::Address),
            Self::Identity => Some(CheckType::Identity),
            Self::Education => Some(CheckType::Education),
            Self::Employment => Some(CheckType::Employment),
            Self::Basic | Self::References | Self::Review => None,
        }
    }

    pub fn is_reachable(self, enabled: &EnabledChecks) -> bool {
        self.check_type().map_or(true, |check| enabled.contains(check))
    }
}

/// Reachable steps in wizard order.
pub fn reachable_steps(enabled: &EnabledChecks) -> Vec<IntakeStep> {
    IntakeStep::ALL
        .into_iter()
        .filter(|s| s.is_reachable(enabled))
        .collect()
}

/// The reachable step after `current`, or `None` on Review.
pub fn next_step(current: IntakeStep, enabled: &EnabledChecks) -> Option<IntakeStep> {
    IntakeStep::ALL
        .into_iter()
        .filter(|s| *s > current)
        .find(|s| s.is_reachable(enabled))
}

/// The reachable step before `current`, or `None` on Basic.
pub fn previous_step(current: IntakeStep, enabled: &EnabledChecks) -> Option<IntakeStep> {
    IntakeStep::ALL
        .into_iter()
        .rev()
        .filter(|s| *s < current)
        .find(|s| s.is_reachable(enabled))
}

/// Validate a step transition.
///
/// Both steps must be reachable and `next` must be the adjacent reachable
/// step in either direction.
pub fn validate_step_transition(
    current: IntakeStep,
    next: IntakeStep,
    enabled: &EnabledChecks,
) -> Result<(), CoreError> {
    for step in [current, next] {
        if !step.is_reachable(enabled) {
            return Err(CoreError::Validation(format!(
                "Step {} ({}) is not enabled for this candidate",
                step.to_number(),
                step.label()
            )));
        }
    }

    if next_step(current, enabled) == Some(next) || previous_step(current, enabled) == Some(next) {
        return Ok(());
    }

    Err(CoreError::Validation(format!(
        "Cannot transition from step {} to step {}. \
         Must advance or go back exactly one step.",
        current.to_number(),
        next.to_number()
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
