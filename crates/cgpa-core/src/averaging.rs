//! Credit-weighted averaging.
//!
//! GPA = Σ(credits × grade points) / Σ credits, rounded to 3 decimals.
//! A list with zero total credits has no average; that is reported as
//! `None`, never as `0.0`.

use serde::{Deserialize, Serialize};

use crate::grade::grade_points;

/// One subject's contribution to an average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeItem {
    pub credits: f64,
    /// Raw grade token; unknown tokens count as 0 points.
    pub grade: String,
}

impl GradeItem {
    pub fn new(credits: f64, grade: impl Into<String>) -> Self {
        Self {
            credits,
            grade: grade.into(),
        }
    }
}

/// Result of an averaging pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageReport {
    /// Rounded average, or `None` when no credits contributed.
    pub average: Option<f64>,
    /// Σ credits × points, rounded to 3 decimals.
    pub numerator: f64,
    /// Σ credits, rounded to 3 decimals.
    pub total_credits: f64,
}

impl AverageReport {
    /// The "nothing to average" report.
    pub const UNDEFINED: AverageReport = AverageReport {
        average: None,
        numerator: 0.0,
        total_credits: 0.0,
    };

    pub fn is_defined(&self) -> bool {
        self.average.is_some()
    }
}

/// Round to 3 decimal places, ties to even.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

/// Compute the credit-weighted average of a list of items.
pub fn compute_average(items: &[GradeItem]) -> AverageReport {
    let (numerator, total_credits) = items.iter().fold((0.0, 0.0), |(num, cred), item| {
        (num + item.credits * grade_points(&item.grade), cred + item.credits)
    });
    average_of_totals(numerator, total_credits)
}

/// Finish an average from already-summed totals.
///
/// The average is taken from the unrounded inputs and then rounded; the
/// reported totals are rounded independently.
pub fn average_of_totals(numerator: f64, total_credits: f64) -> AverageReport {
    if total_credits == 0.0 {
        return AverageReport::UNDEFINED;
    }
    AverageReport {
        average: Some(round3(numerator / total_credits)),
        numerator: round3(numerator),
        total_credits: round3(total_credits),
    }
}
