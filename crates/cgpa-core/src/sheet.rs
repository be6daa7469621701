//! TOML grade sheets for batch entry.
//!
//! A sheet lists the grades entered for each semester and the arrears marked
//! as cleared, and is replayed against a fresh [`Session`].

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::Semester;
use crate::session::{SemesterCalculation, Session};

/// Grades entered for one semester.
#[derive(Debug, Clone, Deserialize)]
pub struct SemesterEntry {
    pub semester: Semester,
    #[serde(default)]
    pub grades: BTreeMap<String, String>,
}

/// A subject marked as a cleared arrear.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrearEntry {
    /// Semester the arrear counts toward.
    pub semester: Semester,
    pub code: String,
    pub grade: String,
}

/// A parsed grade sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeSheet {
    #[serde(default)]
    pub semesters: Vec<SemesterEntry>,
    #[serde(default)]
    pub arrears: Vec<ArrearEntry>,
}

impl GradeSheet {
    /// Replay the sheet: semesters in file order, then arrears.
    pub fn apply(&self, session: &mut Session) -> Result<Vec<SemesterCalculation>> {
        let calculations = self
            .semesters
            .iter()
            .map(|entry| session.calculate_semester(entry.semester, &entry.grades))
            .collect();

        for arrear in &self.arrears {
            session
                .mark_arrear(arrear.semester, &arrear.code, &arrear.grade)
                .with_context(|| format!("invalid arrear entry for {}", arrear.code))?;
        }

        Ok(calculations)
    }
}

/// Parse a grade sheet file.
pub fn parse_grade_sheet(path: &Path) -> Result<GradeSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grade sheet: {}", path.display()))?;
    parse_grade_sheet_str(&content, path)
}

/// Parse grade sheet TOML (useful for testing).
pub fn parse_grade_sheet_str(content: &str, source_path: &Path) -> Result<GradeSheet> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
}
