//! Interval coverage computation.
//!
//! Merges a set of time intervals into the minimal set of disjoint spans and
//! reports the total covered duration in fractional years. Touching
//! intervals (`a.end == b.start`) merge into one span, so a candidate who
//! moved house on the same day they left the previous one has no gap.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Milliseconds in an average Gregorian year (365.25 days).
pub const MS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0 * 1000.0;

/// Months per year, used when decomposing fractional years.
const MONTHS_PER_YEAR: f64 = 12.0;

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// A closed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Build an interval, rejecting one whose end precedes its start.
    pub fn checked(start: Timestamp, end: Timestamp) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::Validation(format!(
                "Interval end {end} precedes its start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Duration in milliseconds. An inverted interval counts as zero.
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds().max(0)
    }

    /// Duration in fractional years.
    pub fn duration_years(&self) -> f64 {
        self.duration_ms() as f64 / MS_PER_YEAR
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge intervals into sorted, disjoint spans.
///
/// Accepts unsorted, duplicate and zero-length input. Inverted intervals are
/// collapsed to their start instant so they can never shrink a span.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals
        .iter()
        .map(|i| Interval::new(i.start, i.end.max(i.start)))
        .collect();
    sorted.sort_by_key(|i| i.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };

    for next in iter {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

/// Total covered duration of `intervals` in fractional years.
///
/// Overlapping and touching intervals are merged before summing, so shared
/// time is only counted once. Empty input yields `0.0`.
pub fn compute_coverage_years(intervals: &[Interval]) -> f64 {
    let total_ms: i64 = merge_intervals(intervals)
        .iter()
        .map(Interval::duration_ms)
        .sum();
    total_ms as f64 / MS_PER_YEAR
}

// ---------------------------------------------------------------------------
// Breakdown
// ---------------------------------------------------------------------------

/// Fractional years decomposed into whole years and rounded leftover months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageBreakdown {
    pub years: u32,
    pub months: u32,
}

impl CoverageBreakdown {
    /// `floor(years)` plus `round(fraction * 12)` months.
    ///
    /// The month component can round up to 12 (e.g. 4.99 years is
    /// "4 year(s) 12 month(s)"); callers display it as-is.
    pub fn from_years(years: f64) -> Self {
        let years = years.max(0.0);
        let whole = years.floor();
        let months = ((years - whole) * MONTHS_PER_YEAR).round();
        Self {
            years: whole as u32,
            months: months as u32,
        }
    }
}

impl std::fmt::Display for CoverageBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} year(s) {} month(s)", self.years, self.months)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
