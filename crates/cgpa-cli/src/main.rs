//! cgpa CLI - the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cgpa",
    version,
    about = "Credit-weighted GPA/CGPA calculator with arrear tracking"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subject catalog JSON (overrides the config file)
    #[arg(long = "catalog", global = true)]
    catalog_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and the default subject catalog
    Init,

    /// Inspect or replace the subject catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Check the subject catalog for problems
    Validate,

    /// Compute GPAs and CGPA from a grade sheet
    Compute {
        /// Path to a .toml grade sheet
        #[arg(long)]
        sheet: PathBuf,

        /// Output format: text, json, markdown (default from config)
        #[arg(long)]
        format: Option<String>,

        /// Also write the summary as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Enter grades and arrears interactively
    Session,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Print subjects
    Show {
        /// Only this semester
        #[arg(long)]
        semester: Option<u32>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Replace the catalog with the contents of a JSON file
    Edit {
        /// New catalog JSON
        #[arg(long)]
        from: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cgpa_core=warn")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = commands::GlobalArgs {
        config: cli.config,
        catalog: cli.catalog_path,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(&ctx),
        Commands::Catalog { action } => match action {
            CatalogAction::Show { semester, format } => {
                commands::catalog::show(&ctx, semester, format)
            }
            CatalogAction::Edit { from } => commands::catalog::edit(&ctx, from),
        },
        Commands::Validate => commands::validate::execute(&ctx),
        Commands::Compute {
            sheet,
            format,
            output,
        } => commands::compute::execute(&ctx, sheet, format, output),
        Commands::Session => commands::session::execute(&ctx),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
