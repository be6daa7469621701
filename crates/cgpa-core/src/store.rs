//! Arrear reconciliation store.
//!
//! Holds the two authoritative maps of a session: native totals per semester
//! and arrear records per subject code. Every average is derived from those
//! maps on request; nothing derived is cached.

use std::collections::BTreeMap;

use crate::averaging::{average_of_totals, AverageReport};
use crate::model::{ArrearRecord, Semester, SemesterTotals};

/// Per-session state for semester totals and cleared arrears.
#[derive(Debug, Clone, Default)]
pub struct ArrearStore {
    native: BTreeMap<Semester, SemesterTotals>,
    arrears: BTreeMap<String, ArrearRecord>,
}

impl ArrearStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the native totals of one semester.
    pub fn record_native_totals(&mut self, semester: Semester, numerator: f64, credits: f64) {
        debug_assert!(credits >= 0.0, "credits must be non-negative");
        tracing::debug!(%semester, numerator, credits, "recording native totals");
        self.native
            .insert(semester, SemesterTotals::new(numerator, credits));
    }

    /// Store the arrear for `subject_code`, replacing any earlier record.
    ///
    /// Returns the record that was replaced, if any.
    pub fn upsert_arrear(
        &mut self,
        subject_code: &str,
        original_semester: Semester,
        credits: f64,
        grade: &str,
    ) -> Option<ArrearRecord> {
        debug_assert!(credits >= 0.0, "credits must be non-negative");
        let record = ArrearRecord::new(subject_code, original_semester, credits, grade);
        let previous = self.arrears.insert(subject_code.to_string(), record);
        match &previous {
            Some(old) if old.original_semester != original_semester => tracing::debug!(
                code = subject_code,
                from = %old.original_semester,
                to = %original_semester,
                "arrear moved to a different semester"
            ),
            Some(_) => tracing::debug!(code = subject_code, grade, "arrear updated"),
            None => tracing::debug!(code = subject_code, grade, %original_semester, "arrear added"),
        }
        previous
    }

    /// Stop counting an arrear. Returns the removed record, if any.
    pub fn remove_arrear(&mut self, subject_code: &str) -> Option<ArrearRecord> {
        let removed = self.arrears.remove(subject_code);
        if removed.is_some() {
            tracing::debug!(code = subject_code, "arrear removed");
        }
        removed
    }

    /// Native totals recorded for a semester (zero if never recorded).
    pub fn native_totals(&self, semester: Semester) -> SemesterTotals {
        self.native.get(&semester).copied().unwrap_or_default()
    }

    /// Native totals plus every arrear whose original semester is `semester`.
    pub fn effective_totals(&self, semester: Semester) -> SemesterTotals {
        self.arrears
            .values()
            .filter(|a| a.original_semester == semester)
            .fold(self.native_totals(semester), |acc, a| acc.add(a.totals()))
    }

    /// Average of one semester's effective totals.
    pub fn semester_average(&self, semester: Semester) -> AverageReport {
        let totals = self.effective_totals(semester);
        average_of_totals(totals.numerator, totals.credits)
    }

    /// Average of every semester's effective totals.
    pub fn all_semester_averages(&self) -> BTreeMap<Semester, Option<f64>> {
        Semester::all()
            .map(|s| (s, self.semester_average(s).average))
            .collect()
    }

    /// Cumulative report across all semesters.
    pub fn cumulative(&self) -> AverageReport {
        let total = Semester::all()
            .map(|s| self.effective_totals(s))
            .fold(SemesterTotals::default(), SemesterTotals::add);
        average_of_totals(total.numerator, total.credits)
    }

    /// Cumulative average, `None` while no credits have been recorded.
    pub fn cumulative_average(&self) -> Option<f64> {
        self.cumulative().average
    }

    /// Active arrear records ordered by subject code.
    pub fn arrears(&self) -> impl Iterator<Item = &ArrearRecord> {
        self.arrears.values()
    }

    pub fn arrear(&self, subject_code: &str) -> Option<&ArrearRecord> {
        self.arrears.get(subject_code)
    }

    /// `true` if nothing has been recorded since creation or the last reset.
    pub fn is_pristine(&self) -> bool {
        self.native.is_empty() && self.arrears.is_empty()
    }

    /// Drop all native totals and arrears.
    pub fn reset(&mut self) {
        tracing::debug!(
            semesters = self.native.len(),
            arrears = self.arrears.len(),
            "resetting store"
        );
        self.native.clear();
        self.arrears.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::averaging::{compute_average, GradeItem};

    fn sem(n: u32) -> Semester {
        Semester::try_from(n).unwrap()
    }

    /// Semester 1 with credits 4 (A) and 3 (S).
    fn seeded() -> ArrearStore {
        let mut store = ArrearStore::new();
        let report = compute_average(&[GradeItem::new(4.0, "A"), GradeItem::new(3.0, "S")]);
        store.record_native_totals(sem(1), report.numerator, report.total_credits);
        store
    }

    #[test]
    fn fresh_store_is_undefined_everywhere() {
        let store = ArrearStore::new();
        assert!(store.is_pristine());
        assert!(store.all_semester_averages().values().all(Option::is_none));
        assert_eq!(store.cumulative_average(), None);
    }

    #[test]
    fn native_totals_overwrite() {
        let mut store = seeded();
        store.record_native_totals(sem(1), 30.0, 3.0);
        assert_eq!(store.native_totals(sem(1)), SemesterTotals::new(30.0, 3.0));
        assert_eq!(store.semester_average(sem(1)).average, Some(10.0));
    }

    #[test]
    fn native_totals_leave_other_semesters_alone() {
        let mut store = seeded();
        store.record_native_totals(sem(2), 16.0, 2.0);
        assert_eq!(store.native_totals(sem(1)), SemesterTotals::new(66.0, 7.0));
        assert_eq!(store.native_totals(sem(2)), SemesterTotals::new(16.0, 2.0));
    }

    #[test]
    fn arrear_counts_into_original_semester() {
        let mut store = seeded();
        store.upsert_arrear("CS204", sem(1), 3.0, "B");

        assert_eq!(store.effective_totals(sem(1)), SemesterTotals::new(90.0, 10.0));
        assert_eq!(store.semester_average(sem(1)).average, Some(9.0));
        assert_eq!(store.cumulative_average(), Some(9.0));
        assert_eq!(store.native_totals(sem(1)), SemesterTotals::new(66.0, 7.0));
    }

    #[test]
    fn repeated_upsert_counts_once() {
        let mut store = seeded();
        store.upsert_arrear("CS204", sem(1), 3.0, "B");
        store.upsert_arrear("CS204", sem(1), 3.0, "B");
        assert_eq!(store.effective_totals(sem(1)), SemesterTotals::new(90.0, 10.0));

        let replaced = store.upsert_arrear("CS204", sem(1), 3.0, "S");
        assert_eq!(replaced.map(|r| r.grade), Some("B".to_string()));
        assert_eq!(store.effective_totals(sem(1)), SemesterTotals::new(96.0, 10.0));
        assert_eq!(store.arrears().count(), 1);
    }

    #[test]
    fn moving_arrear_keeps_cumulative() {
        let mut store = seeded();
        store.record_native_totals(sem(2), 40.0, 5.0);
        store.upsert_arrear("CS204", sem(1), 3.0, "B");
        let before = store.cumulative();

        store.upsert_arrear("CS204", sem(2), 3.0, "B");
        assert_eq!(store.effective_totals(sem(1)), SemesterTotals::new(66.0, 7.0));
        assert_eq!(store.effective_totals(sem(2)), SemesterTotals::new(64.0, 8.0));
        assert_eq!(store.cumulative(), before);
    }

    #[test]
    fn removed_arrear_stops_counting() {
        let mut store = seeded();
        store.upsert_arrear("CS204", sem(1), 3.0, "B");
        let removed = store.remove_arrear("CS204");
        assert!(removed.is_some());
        assert!(store.remove_arrear("CS204").is_none());
        assert_eq!(store.effective_totals(sem(1)), SemesterTotals::new(66.0, 7.0));
        assert_eq!(store.semester_average(sem(1)).average, Some(9.429));
    }

    #[test]
    fn arrear_alone_defines_semester() {
        let mut store = ArrearStore::new();
        store.upsert_arrear("MA202", sem(2), 4.0, "C");
        assert_eq!(store.semester_average(sem(2)).average, Some(7.0));
        assert_eq!(store.semester_average(sem(1)).average, None);
        assert_eq!(store.cumulative_average(), Some(7.0));
    }

    #[test]
    fn cumulative_is_sum_of_effective_totals() {
        let mut store = seeded();
        store.record_native_totals(sem(3), 55.5, 7.5);
        store.upsert_arrear("PH201", sem(2), 4.0, "D");
        store.upsert_arrear("CS204", sem(1), 3.0, "B");

        let (num, cred) = Semester::all()
            .map(|s| store.effective_totals(s))
            .fold((0.0, 0.0), |(n, c), t| (n + t.numerator, c + t.credits));
        assert_eq!(store.cumulative(), average_of_totals(num, cred));
        // 66 + 24 + 24 + 55.5 = 169.5 over 7 + 3 + 4 + 7.5 = 21.5
        assert_eq!(store.cumulative_average(), Some(7.884));
    }

    #[test]
    fn reset_returns_to_init() {
        let mut store = seeded();
        store.upsert_arrear("CS204", sem(1), 3.0, "B");
        store.reset();
        assert!(store.is_pristine());
        assert_eq!(store.cumulative_average(), None);

        store.record_native_totals(sem(1), 66.0, 7.0);
        assert!(store.arrear("CS204").is_none());
        assert_eq!(store.effective_totals(sem(1)), SemesterTotals::new(66.0, 7.0));
    }

    #[test]
    fn zero_credit_native_with_zero_arrears_stays_undefined() {
        let mut store = ArrearStore::new();
        store.record_native_totals(sem(4), 0.0, 0.0);
        assert_eq!(store.semester_average(sem(4)).average, None);
        assert_eq!(store.cumulative_average(), None);
    }
}
