//! A user session: one catalog snapshot plus one reconciliation store.
//!
//! Turns data-entry input (grades keyed by subject code, arrears marked as
//! cleared) into store updates and produces the summary shown to the user.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::averaging::{compute_average, round3, AverageReport};
use crate::catalog::Catalog;
use crate::error::SessionError;
use crate::model::{ArrearRecord, GradeAssignment, Semester, SemesterTotals};
use crate::store::ArrearStore;

/// Grade used for a catalog subject the user left blank.
const MISSING_GRADE: &str = "F";

/// Outcome of calculating one semester's native subjects.
#[derive(Debug, Clone)]
pub struct SemesterCalculation {
    pub semester: Semester,
    pub report: AverageReport,
    pub assignments: Vec<GradeAssignment>,
    /// Catalog subjects with no entered grade (counted as `F`).
    pub defaulted: Vec<String>,
    /// Entered codes that are not part of the semester.
    pub ignored: Vec<String>,
}

/// Per-semester line of a [`SessionSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterSummary {
    pub semester: Semester,
    pub native: SemesterTotals,
    pub effective: SemesterTotals,
    pub average: Option<f64>,
}

/// Everything the presentation layer shows for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub semesters: Vec<SemesterSummary>,
    pub cumulative: AverageReport,
    pub arrears: Vec<ArrearRecord>,
}

/// One user's working state.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    catalog: Arc<Catalog>,
    store: ArrearStore,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(%id, "session started");
        Self {
            id,
            catalog,
            store: ArrearStore::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &ArrearStore {
        &self.store
    }

    /// Grade a semester's own subjects and record the native totals.
    pub fn calculate_semester(
        &mut self,
        semester: Semester,
        grades: &BTreeMap<String, String>,
    ) -> SemesterCalculation {
        let subjects = self.catalog.subjects(semester);
        if subjects.is_empty() {
            tracing::warn!(%semester, "no subjects defined, semester stays empty");
        }

        let mut defaulted = Vec::new();
        let assignments: Vec<GradeAssignment> = subjects
            .iter()
            .map(|subject| {
                let grade = match grades.get(&subject.code) {
                    Some(g) => g.clone(),
                    None => {
                        defaulted.push(subject.code.clone());
                        MISSING_GRADE.to_string()
                    }
                };
                GradeAssignment {
                    subject_code: subject.code.clone(),
                    credits: subject.credits,
                    grade,
                }
            })
            .collect();

        let ignored: Vec<String> = grades
            .keys()
            .filter(|code| self.catalog.subject(semester, code).is_none())
            .cloned()
            .collect();
        if !ignored.is_empty() {
            tracing::warn!(%semester, codes = ?ignored, "ignoring grades for unknown subjects");
        }

        let items: Vec<_> = assignments.iter().map(GradeAssignment::to_item).collect();
        let report = compute_average(&items);
        self.store
            .record_native_totals(semester, report.numerator, report.total_credits);

        SemesterCalculation {
            semester,
            report,
            assignments,
            defaulted,
            ignored,
        }
    }

    /// Count a cleared subject back into `original_semester`.
    ///
    /// Credits come from the subject's entry in that semester, or from the
    /// first semester listing the code when the subject is carried over from
    /// elsewhere in the curriculum. Returns the record this one replaced.
    pub fn mark_arrear(
        &mut self,
        original_semester: Semester,
        code: &str,
        grade: &str,
    ) -> Result<Option<ArrearRecord>, SessionError> {
        let credits = match self.catalog.subject(original_semester, code) {
            Some(subject) => subject.credits,
            None => self
                .catalog
                .find_subject(code)
                .map(|(_, subject)| subject.credits)
                .ok_or_else(|| SessionError::UnknownSubject {
                    semester: original_semester.to_string(),
                    code: code.to_string(),
                })?,
        };

        Ok(self
            .store
            .upsert_arrear(code, original_semester, credits, grade))
    }

    /// Unmark an arrear.
    pub fn clear_arrear(&mut self, code: &str) -> Option<ArrearRecord> {
        self.store.remove_arrear(code)
    }

    /// Forget every grade and arrear entered in this session.
    pub fn reset(&mut self) {
        self.store.reset();
    }

    pub fn summary(&self) -> SessionSummary {
        let semesters = Semester::all()
            .map(|semester| {
                let native = self.store.native_totals(semester);
                let effective = self.store.effective_totals(semester);
                SemesterSummary {
                    semester,
                    native: SemesterTotals::new(round3(native.numerator), round3(native.credits)),
                    effective: SemesterTotals::new(
                        round3(effective.numerator),
                        round3(effective.credits),
                    ),
                    average: self.store.semester_average(semester).average,
                }
            })
            .collect();

        SessionSummary {
            session_id: self.id,
            generated_at: Utc::now(),
            semesters,
            cumulative: self.store.cumulative(),
            arrears: self.store.arrears().cloned().collect(),
        }
    }
}
