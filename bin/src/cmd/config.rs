//! Config command implementation.

use anyhow::Result;
use cadiz::StrategyConfig;

/// Print the default strategy configuration as JSON.
pub(crate) fn print_default() -> Result<()> {
    println!("{}", StrategyConfig::default().to_json()?);
    Ok(())
}
