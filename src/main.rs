//! Beedash CLI
//!
//! Trend dashboard for Beeminder-style tracked goals.

use anyhow::{Context, Result};
use beedash::{
    as_of_date, as_of_instant, parse_user_data, render_line, AlertSet, Config, Engine,
    RunOutcome, LEGEND, VERSION,
};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beedash")]
#[command(version = VERSION)]
#[command(about = "Trend dashboard for tracked goals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the dashboard from a user data document
    Report {
        /// Path to the user document (users/me.json shape)
        input: PathBuf,

        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Sample period length in weeks
        #[arg(long)]
        weeks: Option<u32>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Extra goal slugs to tag as "warn"
        #[arg(long, value_delimiter = ',')]
        warn: Vec<String>,

        /// Exit non-zero if any goal fails to parse
        #[arg(long)]
        strict: bool,
    },

    /// Show which goals started or stopped alerting
    Alerts {
        /// Path to the user document (users/me.json shape)
        input: PathBuf,

        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Goal slugs that were alerting on the previous run
        #[arg(long, value_delimiter = ',')]
        previous: Vec<String>,

        /// Extra goal slugs to tag as "warn"
        #[arg(long, value_delimiter = ',')]
        warn: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show configuration
    Config,

    /// Explain the dashboard columns and symbols
    Legend,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            input,
            as_of,
            weeks,
            format,
            warn,
            strict,
        } => cmd_report(&input, as_of, weeks, &format, warn, strict),
        Commands::Alerts {
            input,
            as_of,
            previous,
            warn,
            format,
        } => cmd_alerts(&input, as_of, previous, warn, &format),
        Commands::Config => cmd_config(),
        Commands::Legend => {
            println!("{LEGEND}");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `beedash=info`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beedash=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load configuration, using defaults");
        Config::default()
    })
}

/// Parse the input document and evaluate every goal in it.
fn run_dashboard(
    config: &Config,
    input: &Path,
    as_of: Option<NaiveDate>,
    warn_goals: Vec<String>,
) -> Result<RunOutcome> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let data = parse_user_data(&json).context("parsing user document")?;

    let timezone = data
        .timezone
        .as_deref()
        .unwrap_or(&config.default_timezone);
    // A pinned date also pins the deadline clock to the end of that day.
    let (as_of, now) = match as_of {
        Some(date) => (date, as_of_instant(timezone, date)?),
        None => {
            let now = Utc::now();
            (as_of_date(timezone, now)?, now)
        }
    };

    let engine = Engine::from_config(config, as_of);
    let overlay = config.overlay(warn_goals);
    Ok(engine.run(&data.goals, &overlay, now))
}

fn cmd_report(
    input: &Path,
    as_of: Option<NaiveDate>,
    weeks: Option<u32>,
    format: &str,
    warn_goals: Vec<String>,
    strict: bool,
) -> Result<()> {
    let mut config = load_config();
    if let Some(weeks) = weeks {
        config.weeks_per_sample = weeks;
    }

    let outcome = run_dashboard(&config, input, as_of, warn_goals)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Beedash for {}", outcome.as_of);
        println!();
        let mut first_idle = true;
        for report in &outcome.reports {
            // Goals with nothing logged today go in a second block.
            if report.idle && first_idle {
                println!();
                first_idle = false;
            }
            println!("{}", render_line(report));
        }
        println!();
        println!("Updated: {}", Utc::now());
    }

    for failure in &outcome.failures {
        eprintln!("Skipped {}: {}", failure.goal, failure.error);
    }

    if strict && !outcome.failures.is_empty() {
        anyhow::bail!("{} goal(s) failed to parse", outcome.failures.len());
    }
    Ok(())
}

fn cmd_alerts(
    input: &Path,
    as_of: Option<NaiveDate>,
    previous: Vec<String>,
    warn_goals: Vec<String>,
    format: &str,
) -> Result<()> {
    let config = load_config();
    let outcome = run_dashboard(&config, input, as_of, warn_goals)?;

    let previous: AlertSet = previous.into_iter().collect();
    let diff = outcome.alerts.diff(&previous);

    if format == "json" {
        let body = serde_json::json!({
            "current": outcome.alerts,
            "raised": diff.raised,
            "cleared": diff.cleared,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        let current: Vec<&str> = outcome.alerts.iter().collect();
        println!("Alerting: {}", current.join(","));
        match diff.message() {
            Some(message) => println!("{message}"),
            None => println!("No change since the previous run."),
        }
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
