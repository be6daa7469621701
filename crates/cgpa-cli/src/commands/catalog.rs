//! The `cgpa catalog` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use cgpa_core::catalog::{Catalog, CatalogStore, SharedCatalog};
use cgpa_core::model::Semester;

use super::{subject_table, GlobalArgs};

pub fn show(ctx: &GlobalArgs, semester: Option<u32>, format: String) -> Result<()> {
    let store = ctx.catalog_store()?;
    let catalog = store.load()?;

    let semesters: Vec<Semester> = match semester {
        Some(n) => vec![Semester::try_from(n)?],
        None => Semester::all().collect(),
    };

    match format.as_str() {
        "json" => match semester {
            Some(_) => {
                let subjects = catalog.subjects(semesters[0]);
                println!("{}", serde_json::to_string_pretty(subjects)?);
            }
            None => println!("{}", catalog.to_json_pretty()?),
        },
        _ => {
            for s in semesters {
                let subjects = catalog.subjects(s);
                let credits: f64 = subjects.iter().map(|x| x.credits).sum();
                println!("{s} ({} subjects, {credits} credits)", subjects.len());
                if subjects.is_empty() {
                    println!("  no subjects defined\n");
                } else {
                    println!("{}\n", subject_table(subjects));
                }
            }
        }
    }

    Ok(())
}

pub fn edit(ctx: &GlobalArgs, from: PathBuf) -> Result<()> {
    let store = ctx.catalog_store()?;
    let content = std::fs::read_to_string(&from)
        .with_context(|| format!("failed to read {}", from.display()))?;

    // An unreadable current catalog must not block its replacement.
    let current = store.load().unwrap_or_else(|e| {
        tracing::warn!(error = %format!("{e:#}"), "current catalog unreadable, replacing it");
        Catalog::default()
    });
    let shared = SharedCatalog::new(current);

    match shared.replace_from_str(&store, &content) {
        Ok(catalog) => {
            println!(
                "Saved {} ({} subjects).",
                store.path().display(),
                catalog.subject_count()
            );
            Ok(())
        }
        Err(e) => {
            println!("Catalog unchanged: {}", store.path().display());
            Err(e)
        }
    }
}
