//! Econosim CLI
//!
//! Runs a scenario and writes the monthly records as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use econosim_core_rs::{credit::MetricsSnapshot, Economy, EconomyConfig, MonthRecord};

#[derive(Parser)]
#[command(name = "econosim")]
#[command(about = "Agent-based macro economy with a money-creating bank")]
#[command(version)]
struct Cli {
    /// Path to a JSON scenario file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation
    Run {
        /// Number of months (overrides simulation.months)
        #[arg(short, long)]
        months: Option<u32>,

        /// RNG seed (overrides simulation.seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write records to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the final bank checkpoint
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },

    /// Validate the configuration file
    ValidateConfig,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    config: &'a EconomyConfig,
    records: &'a [MonthRecord],
    metrics_history: &'a [MetricsSnapshot],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => EconomyConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => EconomyConfig::default(),
    };

    match cli.command {
        Commands::Run {
            months,
            seed,
            output,
            checkpoint,
        } => run(config, months, seed, output, checkpoint),
        Commands::ValidateConfig => {
            println!("Configuration is valid.");
            println!(
                "  Agents: {} households, {} firms",
                config.agents.households, config.agents.firms
            );
            println!(
                "  Horizon: {} months, seed {}",
                config.simulation.months, config.simulation.seed
            );
            println!(
                "  Minimum capital ratio: {}",
                config.banking.capital_ratio_min
            );
            Ok(())
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn run(
    mut config: EconomyConfig,
    months: Option<u32>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    checkpoint: Option<PathBuf>,
) -> Result<()> {
    if let Some(months) = months {
        config.simulation.months = months;
    }
    if let Some(seed) = seed {
        config.simulation.seed = seed;
    }

    let mut economy = Economy::new(config.clone()).context("Failed to build economy")?;
    tracing::info!("Running {} months", config.simulation.months);
    economy.run();

    let bank = economy.bank();
    tracing::info!(
        "Finished month {}: money supply {:.2}, loans {:.2}, capital ratio {:.4}, defaulted {:.2}",
        economy.month(),
        bank.money_supply(),
        bank.total_loans(),
        bank.capital_ratio(),
        bank.total_defaulted()
    );
    if !bank.aggregates_consistent() {
        tracing::warn!(
            "Loan aggregate drifted: cached {:.6}, recomputed {:.6}",
            bank.total_loans(),
            bank.recomputed_total_loans()
        );
    }

    let out = RunOutput {
        config: &config,
        records: economy.records(),
        metrics_history: bank.loan_metrics_history(),
    };
    let json = serde_json::to_string_pretty(&out)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Records written to {:?}", path);
        }
        None => println!("{}", json),
    }

    if let Some(path) = checkpoint {
        let snapshot = bank.snapshot()?.to_json()?;
        std::fs::write(&path, snapshot).with_context(|| format!("Failed to write {:?}", path))?;
        tracing::info!("Bank checkpoint written to {:?}", path);
    }

    Ok(())
}
