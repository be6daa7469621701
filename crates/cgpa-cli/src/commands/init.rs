//! The `cgpa init` command.

use anyhow::Result;

use super::GlobalArgs;

pub fn execute(ctx: &GlobalArgs) -> Result<()> {
    // Create cgpa.toml
    if std::path::Path::new("cgpa.toml").exists() {
        println!("cgpa.toml already exists, skipping.");
    } else {
        std::fs::write("cgpa.toml", SAMPLE_CONFIG)?;
        println!("Created cgpa.toml");
    }

    // Create the default catalog
    let store = ctx.catalog_store()?;
    if store.ensure_exists()? {
        println!("Created {}", store.path().display());
    } else {
        println!("{} already exists, skipping.", store.path().display());
    }

    println!("\nNext steps:");
    println!("  1. Review the subjects: cgpa catalog show");
    println!("  2. Enter grades interactively: cgpa session");
    println!("  3. Or write a grade sheet and run: cgpa compute --sheet grades.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# cgpa configuration

catalog_path = "subjects.json"
format = "text"
"#;
