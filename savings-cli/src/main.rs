mod config;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use savings_core::calculations::{
    EstimationBreakdown, EstimationEngine, EstimationInput, EstimationRule,
    PREVENTABLE_FRACTION_DEFAULT,
};
use savings_core::db::RepositoryRegistry;
use savings_core::{NewSavedEstimate, RepositoryError, SavingsRepository, ScenarioCode};
use savings_db_sqlite::SqliteRepositoryFactory;

use crate::config::AppConfig;
use crate::render::{format_currency, format_number, format_timestamp};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Savings estimator for the outcome calculators on the marketing site.
///
/// Connects to the configured database, runs the estimation engine over
/// captured field values, and manages saved estimates.
#[derive(Debug, Parser)]
#[command(name = "savings-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults to `savings.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `savings.db`) or `:memory:`.
    /// Defaults to `SAVINGS_DB` when that is set.
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the scenario calculators in the catalog.
    Scenarios,

    /// Run a savings estimate for one scenario.
    Estimate {
        /// Scenario code (e.g. `surgery_cancellation`).
        #[arg(long)]
        scenario: String,

        /// Calculator field as `FIELD=VALUE`, repeatable. Values are taken
        /// verbatim; fields left out or not numeric read as zero.
        #[arg(long, value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Override the scenario's preventable fraction (between 0 and 1).
        #[arg(long)]
        fraction: Option<Decimal>,

        /// Save the estimate after printing it.
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Label stored with the saved estimate.
        #[arg(long, requires = "save")]
        label: Option<String>,
    },

    /// List saved estimates, newest first.
    List {
        /// Only estimates for this scenario code.
        #[arg(long)]
        scenario: Option<String>,
    },

    /// Show one saved estimate with its breakdown.
    Show {
        /// Saved estimate id.
        id: i64,
    },

    /// Delete a saved estimate.
    Delete {
        /// Saved estimate id.
        id: i64,
    },
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let app_config = AppConfig::load(cli.config.as_deref())?;
    let db = cli.db.or_else(|| std::env::var("SAVINGS_DB").ok());
    let db_config = app_config.db_config(cli.backend, db);

    debug!("connecting to {} backend", db_config.backend);
    let registry = build_registry(&app_config);
    let repo = registry.create(&db_config).await?;

    match cli.command {
        Command::Scenarios => cmd_scenarios(&*repo).await,
        Command::Estimate {
            scenario,
            set,
            fraction,
            save,
            label,
        } => cmd_estimate(&*repo, &scenario, &set, fraction, save, label).await,
        Command::List { scenario } => cmd_list(&*repo, scenario.as_deref()).await,
        Command::Show { id } => cmd_show(&*repo, id).await,
        Command::Delete { id } => cmd_delete(&*repo, id).await,
    }
}

/// Registry with every backend this build knows about. The config file can
/// pin the seeds directory; otherwise the factory resolves it at runtime.
fn build_registry(config: &AppConfig) -> RepositoryRegistry {
    let factory = match &config.seeds_dir {
        Some(dir) => SqliteRepositoryFactory::with_seeds_dir(dir),
        None => SqliteRepositoryFactory::new(),
    };

    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(factory));
    registry
}

// ─── commands ────────────────────────────────────────────────────────────────

async fn cmd_scenarios(repo: &dyn SavingsRepository) -> Result<()> {
    let scenarios = repo.get_scenarios().await?;

    if scenarios.is_empty() {
        println!("No scenarios in the catalog. Load seeds or run the data loader first.");
        return Ok(());
    }

    for scenario in &scenarios {
        println!("{}  ({})", scenario.name, scenario.code.as_str());
        match repo.get_params_for_scenario(scenario.code).await {
            Ok(params) => {
                let fields = [
                    (&params.dimension_a_field, &params.dimension_a_label),
                    (&params.dimension_b_field, &params.dimension_b_label),
                    (&params.affected_rate_field, &params.affected_rate_label),
                    (&params.value_per_event_field, &params.value_per_event_label),
                ];
                for (field, label) in fields {
                    println!("  {:<24} {}", field, label);
                }
                let fraction = params
                    .preventable_fraction
                    .unwrap_or(PREVENTABLE_FRACTION_DEFAULT);
                println!("  preventable fraction: {}", format_number(fraction));
            }
            Err(RepositoryError::NotFound) => {
                println!("  (no calculator fields configured)");
            }
            Err(e) => return Err(e.into()),
        }
        println!();
    }

    Ok(())
}

async fn cmd_estimate(
    repo: &dyn SavingsRepository,
    scenario: &str,
    set: &[String],
    fraction: Option<Decimal>,
    save: bool,
    label: Option<String>,
) -> Result<()> {
    let code = parse_scenario_code(scenario)?;
    let scenario_row = repo.get_scenario_by_code(code).await?;
    let params = repo
        .get_params_for_scenario(code)
        .await
        .with_context(|| format!("no calculator fields configured for '{}'", code.as_str()))?;

    let mut rule = EstimationRule::from_scenario_params(&params);
    if let Some(fraction) = fraction {
        rule.preventable_fraction = fraction;
    }
    rule.validate()?;

    let input = build_input(set)?;
    let breakdown = EstimationEngine::new(&rule).estimate(&input);

    println!("{}  ({})", scenario_row.name, code.as_str());
    let inputs = [
        (&params.dimension_a_label, input.value(&params.dimension_a_field)),
        (&params.dimension_b_label, input.value(&params.dimension_b_field)),
        (&params.affected_rate_label, input.value(&params.affected_rate_field)),
        (&params.value_per_event_label, input.value(&params.value_per_event_field)),
    ];
    print_factors(&inputs, rule.preventable_fraction);
    println!();
    print_totals(&breakdown);

    if save {
        let saved = repo
            .create_saved_estimate(NewSavedEstimate {
                scenario_code: code,
                label,
                dimension_a: input.value(&rule.dimension_a_field),
                dimension_b: input.value(&rule.dimension_b_field),
                affected_rate_percent: input.value(&rule.affected_rate_field),
                value_per_event: input.value(&rule.value_per_event_field),
                preventable_fraction: rule.preventable_fraction,
                savings: Some(breakdown.savings),
            })
            .await?;
        println!();
        println!("Saved as estimate {}.", saved.id);
    }

    Ok(())
}

async fn cmd_list(repo: &dyn SavingsRepository, scenario: Option<&str>) -> Result<()> {
    let code = scenario.map(parse_scenario_code).transpose()?;
    let estimates = repo.list_saved_estimates(code).await?;

    if estimates.is_empty() {
        println!("No saved estimates.");
        return Ok(());
    }

    for estimate in &estimates {
        let savings = estimate
            .savings
            .map(format_currency)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4}  {}  {:<22} {:>12}  {}",
            estimate.id,
            format_timestamp(&estimate.updated_at),
            estimate.scenario_code.as_str(),
            savings,
            estimate.label.as_deref().unwrap_or(""),
        );
    }

    Ok(())
}

async fn cmd_show(repo: &dyn SavingsRepository, id: i64) -> Result<()> {
    let estimate = repo
        .get_saved_estimate(id)
        .await
        .with_context(|| format!("no saved estimate with id {}", id))?;

    // Saved rows are self-contained; the breakdown recomputes from the
    // stored figures even when the catalog has changed since.
    let rule = EstimationRule {
        preventable_fraction: estimate.preventable_fraction,
        ..EstimationRule::default()
    };
    let mut input = EstimationInput::new();
    input.insert(rule.dimension_a_field.as_str(), estimate.dimension_a);
    input.insert(rule.dimension_b_field.as_str(), estimate.dimension_b);
    input.insert(rule.affected_rate_field.as_str(), estimate.affected_rate_percent);
    input.insert(rule.value_per_event_field.as_str(), estimate.value_per_event);
    let breakdown = EstimationEngine::new(&rule).estimate(&input);

    if let Some(stored) = estimate.savings {
        if stored != breakdown.savings {
            debug!(%stored, recomputed = %breakdown.savings, "stored savings differs");
        }
    }

    println!("Estimate {}  ({})", estimate.id, estimate.scenario_code.as_str());
    if let Some(label) = &estimate.label {
        println!("  Label:  {}", label);
    }
    println!("  Saved:  {}", format_timestamp(&estimate.created_at));
    println!();

    let labels = factor_labels(repo, estimate.scenario_code).await?;
    let values = [
        estimate.dimension_a,
        estimate.dimension_b,
        estimate.affected_rate_percent,
        estimate.value_per_event,
    ];
    let factors: Vec<_> = labels.iter().zip(values).collect();
    print_factors(&factors, estimate.preventable_fraction);
    println!();
    print_totals(&breakdown);

    Ok(())
}

async fn cmd_delete(repo: &dyn SavingsRepository, id: i64) -> Result<()> {
    repo.delete_saved_estimate(id)
        .await
        .with_context(|| format!("no saved estimate with id {}", id))?;
    println!("Deleted estimate {}.", id);
    Ok(())
}

// ─── rendering helpers ───────────────────────────────────────────────────────

fn print_factors(factors: &[(&String, Decimal)], fraction: Decimal) {
    for (label, value) in factors {
        println!("  {:<34} {}", label, format_number(*value));
    }
    println!("  {:<34} {}", "Preventable fraction", format_number(fraction));
}

fn print_totals(breakdown: &EstimationBreakdown) {
    println!("  Total events:      {}", format_number(breakdown.total_events));
    println!("  Affected events:   {}", format_number(breakdown.affected_events));
    println!("  Actionable events: {}", format_number(breakdown.actionable_events));
    println!("  Estimated savings: {}", format_currency(breakdown.savings));
}

/// Prompt labels for the four factors, falling back to generic names when
/// the scenario no longer has configured params.
async fn factor_labels(repo: &dyn SavingsRepository, code: ScenarioCode) -> Result<[String; 4]> {
    match repo.get_params_for_scenario(code).await {
        Ok(params) => Ok([
            params.dimension_a_label,
            params.dimension_b_label,
            params.affected_rate_label,
            params.value_per_event_label,
        ]),
        Err(RepositoryError::NotFound) => Ok([
            "Dimension A".to_string(),
            "Dimension B".to_string(),
            "Affected rate (%)".to_string(),
            "Value per event ($)".to_string(),
        ]),
        Err(e) => Err(e.into()),
    }
}

// ─── argument parsing ────────────────────────────────────────────────────────

/// Shape every `--set` field name must have.
const FIELD_NAME_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

fn parse_scenario_code(raw: &str) -> Result<ScenarioCode> {
    ScenarioCode::parse(raw).ok_or_else(|| {
        let known = ScenarioCode::all()
            .iter()
            .map(|code| code.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("unknown scenario '{}'; expected one of: {}", raw, known)
    })
}

/// Splits one `--set` pair. The field name is argument syntax and is
/// checked strictly; the value side is calculator input and is passed
/// through verbatim, blanks included.
fn parse_set_pair(pair: &str, field_name: &Regex) -> Result<(String, String)> {
    let Some((name, value)) = pair.split_once('=') else {
        bail!("invalid --set '{}': expected FIELD=VALUE", pair);
    };
    if !field_name.is_match(name) {
        bail!(
            "invalid --set field name '{}': use letters, digits and underscores, \
             not starting with a digit",
            name
        );
    }
    Ok((name.to_string(), value.to_string()))
}

fn build_input(set: &[String]) -> Result<EstimationInput> {
    let field_name = Regex::new(FIELD_NAME_PATTERN)?;

    let mut input = EstimationInput::new();
    for pair in set {
        let (name, value) = parse_set_pair(pair, &field_name)?;
        input.insert(name, value);
    }
    Ok(input)
}
