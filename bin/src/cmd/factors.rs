//! Factor listing command implementation.

use anyhow::{Result, anyhow};
use cadiz::factors::{
    FactorCategory, FactorInfo, FactorKind,
    registry::{factors_by_category, get_factor_info},
};

/// List available factors, optionally filtered by category.
pub(crate) fn list_factors(category: Option<&str>, verbose: bool) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Factors                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let categories = [
        (FactorCategory::Momentum, "Momentum"),
        (FactorCategory::Value, "Value"),
        (FactorCategory::Quality, "Quality"),
    ];

    for (cat, cat_name) in categories {
        if let Some(filter) = category
            && !cat_name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        let cat_factors = factors_by_category(&cat);
        if cat_factors.is_empty() {
            continue;
        }

        println!("{cat_name}:");
        if verbose {
            println!("  {}", cat.description());
        }
        println!("{}", "-".repeat(60));

        for factor in cat_factors {
            if verbose {
                println!(
                    "  {:25} - {} (lookback: {} days)",
                    factor.name, factor.description, factor.typical_lookback
                );
            } else {
                println!("  {}", factor.name);
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for detailed factor descriptions.\n");
    }

    println!("Factor aliases:");
    for kind in FactorKind::ALL {
        println!("  {:28} -> {}", kind.aliases().join(", "), kind.name());
    }
    println!();
}

/// Show a single factor looked up by name or alias.
pub(crate) fn show_factor(name: &str) -> Result<()> {
    let info = get_factor_info(name).ok_or_else(|| {
        anyhow!("Unknown factor: '{name}'. Use 'cadiz factors' to list available factors.")
    })?;
    print_info(&info);
    Ok(())
}

fn print_info(info: &FactorInfo) {
    println!("\n{}", info.name);
    println!("{}", "-".repeat(60));
    println!("  Category:         {:?}", info.category);
    println!("  Description:      {}", info.description);
    println!("  Lookback:         {} days", info.typical_lookback);
    println!(
        "  Fundamentals:     {}",
        if info.requires_fundamentals { "required" } else { "not required" }
    );
    println!("  Aliases:          {}", info.kind.aliases().join(", "));
    println!();
}
