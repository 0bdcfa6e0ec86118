//! Command-line tool to load scenario calculator definitions into the database.
//!
//! The CSV file should have the following columns:
//! - `scenario_code`: catalog code (surgery_cancellation, workers_comp, pt_dropout)
//! - `scenario_name`: display name for the scenario
//! - `dimension_a_field`, `dimension_a_label`: first volume factor and its prompt
//! - `dimension_b_field`, `dimension_b_label`: second volume factor and its prompt
//! - `affected_rate_field`, `affected_rate_label`: percentage rate and its prompt
//! - `value_per_event_field`, `value_per_event_label`: dollar value and its prompt
//! - `preventable_fraction`: per-scenario override, empty to use the engine default

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use savings_data::ScenarioParamsLoader;
use savings_db_sqlite::SqliteRepository;

#[derive(Parser, Debug)]
#[command(name = "savings-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing scenario calculator definitions
    #[arg(short, long)]
    file: PathBuf,

    /// Database URL (the file is created if it does not exist)
    #[arg(short, long, default_value = "sqlite:savings.db")]
    database: String,

    /// Apply schema migrations before loading
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Apply seed SQL from this directory once migrations finish
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to open database: {}", args.database))?;

    if args.migrate {
        println!("Applying migrations...");
        repo.run_migrations().await.context("Migration run failed")?;
        println!("Migrations applied.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Applying seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Seed run failed for: {}", seeds_dir.display()))?;
        println!("Seeds applied.");
    }

    println!("Loading scenario calculators from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open CSV file: {}", args.file.display()))?;

    let records = ScenarioParamsLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV records from: {}", args.file.display()))?;

    println!("Parsed {} scenario records", records.len());

    let loaded = ScenarioParamsLoader::load(&repo, &records)
        .await
        .context("Failed to load scenario calculators into database")?;

    println!("Successfully loaded {} scenarios into the database.", loaded);

    Ok(())
}
