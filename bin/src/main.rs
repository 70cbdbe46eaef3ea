//! Cadiz CLI binary.
//!
//! Provides command-line interface for the cadiz portfolio construction engine.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, process};

#[derive(Parser)]
#[command(name = "cadiz")]
#[command(about = "Factor-driven portfolio construction", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available factors
    Factors {
        /// Show a single factor by name or alias
        name: Option<String>,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show per-factor ranks and composite alpha for a snapshot
    Score {
        #[command(flatten)]
        input: InputArgs,

        /// Number of top-ranked securities to show
        #[arg(short, long, default_value = "25")]
        top: usize,
    },

    /// Compute target weights for a snapshot
    Rebalance {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write the full rebalance report as JSON to this file
        #[arg(long)]
        audit: Option<PathBuf>,
    },

    /// Print the default strategy configuration as JSON
    Config,
}

/// Where the cycle snapshot and strategy configuration come from.
#[derive(Args, Debug, Clone)]
pub(crate) struct InputArgs {
    /// JSON cycle snapshot ({"as_of": ..., "securities": [...]})
    #[arg(short, long, conflicts_with_all = ["fundamentals", "prices"])]
    pub(crate) snapshot: Option<PathBuf>,

    /// Fundamentals CSV (symbol, date, exchange, sector, market_cap, ...)
    #[arg(long, requires_all = ["prices", "as_of"])]
    pub(crate) fundamentals: Option<PathBuf>,

    /// Prices CSV (symbol, date, close)
    #[arg(long, requires = "fundamentals")]
    pub(crate) prices: Option<PathBuf>,

    /// Decision date for CSV inputs (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) as_of: Option<String>,

    /// Strategy config JSON (defaults to $CADIZ_CONFIG, then built-in defaults)
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Factors {
            name,
            category,
            verbose,
        } => match name {
            Some(name) => cmd::factors::show_factor(&name)?,
            None => cmd::factors::list_factors(category.as_deref(), verbose),
        },
        Commands::Score { input, top } => {
            cmd::score::show_scores(&input, top)?;
        }
        Commands::Rebalance {
            input,
            format,
            audit,
        } => {
            cmd::rebalance::rebalance(&input, format, audit.as_deref())?;
        }
        Commands::Config => {
            cmd::config::print_default()?;
        }
    }

    Ok(())
}
