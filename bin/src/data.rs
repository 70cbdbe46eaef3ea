//! Snapshot and configuration loading for the cadiz CLI.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use cadiz::{CadizError, CycleContext, StrategyConfig};
use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;

use crate::InputArgs;

/// Environment variable naming a default strategy config file.
pub(crate) const CONFIG_ENV: &str = "CADIZ_CONFIG";

/// Load the strategy config from `--config`, `$CADIZ_CONFIG`, or defaults.
pub(crate) fn load_config(input: &InputArgs) -> Result<StrategyConfig> {
    let path = input
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(Into::into));

    match path {
        Some(path) => {
            info!("Loading strategy config from {}", path.display());
            Ok(StrategyConfig::load(&path)?)
        }
        None => {
            debug!("Using default strategy config");
            Ok(StrategyConfig::default())
        }
    }
}

/// Load the cycle snapshot named by the input arguments.
///
/// CSV inputs keep the last `window` closes per symbol.
pub(crate) fn load_context(input: &InputArgs, window: usize) -> Result<CycleContext> {
    if let Some(path) = &input.snapshot {
        return load_snapshot(path);
    }

    let (Some(fundamentals), Some(prices), Some(as_of)) =
        (&input.fundamentals, &input.prices, &input.as_of)
    else {
        bail!("provide --snapshot, or --fundamentals with --prices and --as-of");
    };

    let as_of = parse_date(as_of)?;
    let fundamentals = read_csv(fundamentals)?;
    let prices = read_csv(prices)?;
    info!(
        "Loaded {} fundamentals rows and {} price rows",
        fundamentals.height(),
        prices.height()
    );

    Ok(CycleContext::from_frames(as_of, &fundamentals, &prices, window)?)
}

/// Load a JSON cycle snapshot.
pub(crate) fn load_snapshot(path: &Path) -> Result<CycleContext> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("cannot read snapshot {}", path.display()))?;
    let ctx: CycleContext = serde_json::from_str(&json)
        .with_context(|| format!("cannot parse snapshot {}", path.display()))?;
    ctx.validate()?;
    info!("Loaded snapshot for {} with {} securities", ctx.as_of, ctx.len());
    Ok(ctx)
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(df)
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, CadizError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| CadizError::InvalidDate(format!("Invalid date format: {e}")))
}
