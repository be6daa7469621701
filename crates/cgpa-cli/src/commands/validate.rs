//! The `cgpa validate` command.

use anyhow::Result;

use cgpa_core::catalog::{validate_catalog, CatalogStore};

use super::GlobalArgs;

pub fn execute(ctx: &GlobalArgs) -> Result<()> {
    let store = ctx.catalog_store()?;
    let catalog = store.load()?;

    println!(
        "Catalog: {} ({} subjects)",
        store.path().display(),
        catalog.subject_count()
    );

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .semester
            .map(|s| format!("  [{}]", s.key()))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
