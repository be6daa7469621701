//! Core data model types for cgpa.
//!
//! Subjects come from the catalog; totals and arrear records are what the
//! reconciliation store keeps per session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::averaging::{round3, GradeItem};
use crate::error::SessionError;
use crate::grade::grade_points;

/// Number of semester slots in the curriculum.
pub const NUM_SEMESTERS: u32 = 5;

/// A semester slot, `1..=NUM_SEMESTERS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Semester(u32);

impl Semester {
    /// Semester number, starting at 1.
    pub fn number(self) -> u32 {
        self.0
    }

    /// Catalog key for this semester (`"sem3"`).
    pub fn key(self) -> String {
        format!("sem{}", self.0)
    }

    /// Parse a catalog key such as `"sem3"`. Only the canonical spelling is
    /// accepted, so `"sem03"` or `"sem+3"` are not aliases.
    pub fn from_key(key: &str) -> Option<Self> {
        key.strip_prefix("sem")
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(|n| Semester::try_from(n).ok())
            .filter(|s| s.key() == key)
    }

    /// Every semester slot in order.
    pub fn all() -> impl Iterator<Item = Semester> {
        (1..=NUM_SEMESTERS).map(Semester)
    }
}

impl TryFrom<u32> for Semester {
    type Error = SessionError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        if (1..=NUM_SEMESTERS).contains(&n) {
            Ok(Semester(n))
        } else {
            Err(SessionError::SemesterOutOfRange(n))
        }
    }
}

impl From<Semester> for u32 {
    fn from(s: Semester) -> u32 {
        s.0
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Semester {}", self.0)
    }
}

/// A subject in the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub credits: f64,
}

/// A grade entered for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeAssignment {
    pub subject_code: String,
    pub credits: f64,
    pub grade: String,
}

impl GradeAssignment {
    pub fn to_item(&self) -> GradeItem {
        GradeItem::new(self.credits, self.grade.clone())
    }
}

/// Numerator and credit sums for a semester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SemesterTotals {
    /// Σ credits × grade points.
    pub numerator: f64,
    /// Σ credits.
    pub credits: f64,
}

impl SemesterTotals {
    pub fn new(numerator: f64, credits: f64) -> Self {
        Self { numerator, credits }
    }

    pub fn add(self, other: SemesterTotals) -> SemesterTotals {
        SemesterTotals {
            numerator: self.numerator + other.numerator,
            credits: self.credits + other.credits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.credits == 0.0
    }
}

/// A cleared arrear counted back into its original semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrearRecord {
    pub subject_code: String,
    pub original_semester: Semester,
    pub numerator: f64,
    pub credits: f64,
    pub grade: String,
}

impl ArrearRecord {
    /// Build a record, pricing the grade with the lenient scale.
    pub fn new(
        subject_code: impl Into<String>,
        original_semester: Semester,
        credits: f64,
        grade: impl Into<String>,
    ) -> Self {
        let grade = grade.into();
        Self {
            subject_code: subject_code.into(),
            original_semester,
            numerator: round3(credits * grade_points(&grade)),
            credits: round3(credits),
            grade,
        }
    }

    pub fn totals(&self) -> SemesterTotals {
        SemesterTotals::new(self.numerator, self.credits)
    }
}
