//! Score command implementation.

use anyhow::Result;
use cadiz::{CycleScores, Rebalancer};

use crate::{InputArgs, data};

/// Compute ranks and composite alpha, and print the top `top` securities.
pub(crate) fn show_scores(input: &InputArgs, top: usize) -> Result<()> {
    let config = data::load_config(input)?;
    let ctx = data::load_context(input, config.momentum.window_length)?;
    let rebalancer = Rebalancer::new(config)?;
    let scores = rebalancer.score(&ctx)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Composite Scores                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("As of:            {}", ctx.as_of);
    println!("Snapshot:         {} securities", ctx.len());
    println!("Universe:         {} securities", scores.universe.len());
    println!("Scored:           {} securities", scores.alpha.len());
    for raw in &scores.raw {
        println!(
            "  {:24} {} missing",
            format!("{}:", raw.name()),
            raw.missing_count()
        );
    }
    println!();

    print_table(&scores, top);
    Ok(())
}

fn print_table(scores: &CycleScores, top: usize) {
    if scores.alpha.is_empty() {
        println!("No security has every factor available.\n");
        return;
    }

    let mut ranked: Vec<(&String, f64)> = scores.alpha.iter().map(|(id, a)| (id, *a)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    print!("{:10}", "Symbol");
    for rank in &scores.ranks {
        print!(" {:>24}", rank.name());
    }
    println!(" {:>10}", "Alpha");
    println!("{}", "-".repeat(10 + 25 * scores.ranks.len() + 11));

    for (id, alpha) in ranked.into_iter().take(top) {
        print!("{id:10}");
        for rank in &scores.ranks {
            match rank.get(id) {
                Some(r) => print!(" {r:>24.0}"),
                None => print!(" {:>24}", "-"),
            }
        }
        println!(" {alpha:>10.0}");
    }
    println!();
}
