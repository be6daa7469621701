//! The `cgpa compute` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use cgpa_core::catalog::{CatalogStore, JsonFileCatalog};
use cgpa_core::report::format_average;
use cgpa_core::session::Session;
use cgpa_core::sheet::parse_grade_sheet;

use super::{summary_table, GlobalArgs};

pub fn execute(
    ctx: &GlobalArgs,
    sheet_path: PathBuf,
    format: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = ctx.load_config()?;
    let store = JsonFileCatalog::new(config.catalog_path.clone());
    let catalog = store.load()?;
    let sheet = parse_grade_sheet(&sheet_path)?;

    let mut session = Session::new(Arc::new(catalog));
    let calculations = sheet.apply(&mut session)?;

    for calc in &calculations {
        eprintln!(
            "{}: GPA {} ({} / {} credits)",
            calc.semester,
            format_average(calc.report.average),
            calc.report.numerator,
            calc.report.total_credits
        );
        if !calc.defaulted.is_empty() {
            eprintln!("  no grade entered, counted as F: {}", calc.defaulted.join(", "));
        }
        if !calc.ignored.is_empty() {
            eprintln!("  not in this semester, ignored: {}", calc.ignored.join(", "));
        }
    }

    let summary = session.summary();
    match format.as_deref().unwrap_or(config.format.as_str()) {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "markdown" | "md" => println!("{}", summary.to_markdown()),
        _ => {
            println!("{}", summary_table(&summary));
            match summary.cumulative.average {
                Some(cgpa) => println!("CGPA: {cgpa:.3}"),
                None => println!("CGPA: not yet available"),
            }
        }
    }

    if let Some(path) = output {
        summary.save_json(&path)?;
        eprintln!("Summary written to {}.", path.display());
    }

    Ok(())
}
