//! Subcommand implementations and shared rendering.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use cgpa_core::catalog::JsonFileCatalog;
use cgpa_core::config::{load_config_from, CgpaConfig};
use cgpa_core::model::Subject;
use cgpa_core::report::format_average;
use cgpa_core::session::SessionSummary;

pub mod catalog;
pub mod compute;
pub mod init;
pub mod session;
pub mod validate;

/// Options shared by every subcommand.
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the config, applying the `--catalog` override.
    pub fn load_config(&self) -> Result<CgpaConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(path) = &self.catalog {
            config.catalog_path = path.clone();
        }
        tracing::debug!(catalog = %config.catalog_path.display(), "resolved config");
        Ok(config)
    }

    pub fn catalog_store(&self) -> Result<JsonFileCatalog> {
        Ok(JsonFileCatalog::new(self.load_config()?.catalog_path))
    }
}

/// Per-semester averages, CGPA and arrears as a text table.
pub fn summary_table(summary: &SessionSummary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Semester", "Credits", "Numerator", "GPA"]);
    for s in &summary.semesters {
        table.add_row(vec![
            Cell::new(s.semester.number()),
            Cell::new(s.effective.credits),
            Cell::new(s.effective.numerator),
            Cell::new(format_average(s.average)),
        ]);
    }
    table.add_row(vec![
        Cell::new("CGPA"),
        Cell::new(summary.cumulative.total_credits),
        Cell::new(summary.cumulative.numerator),
        Cell::new(format_average(summary.cumulative.average)),
    ]);

    let mut out = table.to_string();
    if !summary.arrears.is_empty() {
        let mut arrears = Table::new();
        arrears.set_header(vec!["Arrear", "Counts toward", "Grade", "Credits", "Numerator"]);
        for a in &summary.arrears {
            arrears.add_row(vec![
                Cell::new(&a.subject_code),
                Cell::new(a.original_semester.number()),
                Cell::new(&a.grade),
                Cell::new(a.credits),
                Cell::new(a.numerator),
            ]);
        }
        out.push('\n');
        out.push_str(&arrears.to_string());
    }
    out
}

/// Subjects of one semester as a text table.
pub fn subject_table(subjects: &[Subject]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Code", "Name", "Credits"]);
    for s in subjects {
        table.add_row(vec![
            Cell::new(&s.code),
            Cell::new(&s.name),
            Cell::new(s.credits),
        ]);
    }
    table.to_string()
}
