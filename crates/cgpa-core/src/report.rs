//! Session summary rendering and JSON persistence.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::session::SessionSummary;

/// Render an average, `-` when undefined.
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{value:.3}"),
        None => "-".to_string(),
    }
}

impl SessionSummary {
    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Render the summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# GPA Summary\n");
        let _ = writeln!(md, "| Semester | Native credits | Effective credits | Numerator | GPA |");
        let _ = writeln!(md, "|----------|---------------:|------------------:|----------:|----:|");
        for s in &self.semesters {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} | {} |",
                s.semester.number(),
                s.native.credits,
                s.effective.credits,
                s.effective.numerator,
                format_average(s.average)
            );
        }

        let _ = writeln!(md);
        match self.cumulative.average {
            Some(cgpa) => {
                let _ = writeln!(
                    md,
                    "**CGPA:** {cgpa:.3} ({} / {} credits)",
                    self.cumulative.numerator, self.cumulative.total_credits
                );
            }
            None => {
                let _ = writeln!(md, "**CGPA:** not yet available");
            }
        }

        if !self.arrears.is_empty() {
            let _ = writeln!(md, "\n## Cleared Arrears\n");
            for a in &self.arrears {
                let _ = writeln!(
                    md,
                    "- {} (counts toward semester {}): grade {}, {} credits, +{}",
                    a.subject_code,
                    a.original_semester.number(),
                    a.grade,
                    a.credits,
                    a.numerator
                );
            }
        }

        md
    }
}
