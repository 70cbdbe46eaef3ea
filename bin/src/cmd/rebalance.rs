//! Rebalance command implementation.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cadiz::{RebalanceReport, Rebalancer};
use log::info;

use crate::{InputArgs, OutputFormat, data};

/// Run one rebalance cycle and print the resulting target weights.
pub(crate) fn rebalance(
    input: &InputArgs,
    format: OutputFormat,
    audit: Option<&Path>,
) -> Result<()> {
    let config = data::load_config(input)?;
    let ctx = data::load_context(input, config.momentum.window_length)?;
    let rebalancer = Rebalancer::new(config)?;
    let report = rebalancer.run(&ctx)?;

    if let Some(path) = audit {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("cannot write audit report {}", path.display()))?;
        info!("Wrote audit report to {}", path.display());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &RebalanceReport) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Target Weights                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let mut held: Vec<(&String, f64)> = report
        .weights
        .iter()
        .filter(|(_, w)| **w != 0.0)
        .map(|(id, w)| (id, *w))
        .collect();
    held.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    if held.is_empty() {
        println!("No positions.\n");
    } else {
        println!("{:10} {:>10} {:>10}", "Symbol", "Weight", "Alpha");
        println!("{}", "-".repeat(32));
        for (id, weight) in &held {
            let alpha = report.scores.alpha.get(*id).copied().unwrap_or(f64::NAN);
            println!("{id:10} {:>9.4}% {alpha:>10.0}", weight * 100.0);
        }
        println!();
    }

    println!("Summary:");
    println!("{}", "-".repeat(40));
    println!("  As of:            {}", report.as_of);
    println!("  Universe:         {}", report.scores.universe.len());
    println!("  Scored:           {}", report.scores.alpha.len());
    println!("  Positions:        {}", held.len());
    println!("  Gross leverage:   {:.4}", report.weights.gross());
    println!("  Net exposure:     {:.4}", report.weights.net());
    println!("  Objective:        {:.4}", report.objective);
    println!("  Iterations:       {}", report.iterations);
    println!("  Combiner:         {}", report.combiner);
    println!("  Solver:           {}", report.solver);
    println!();
}
