#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cadiz/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # cadiz
//!
//! Factor-driven portfolio construction for cross-sectional equity strategies.
//!
//! cadiz is an umbrella crate that re-exports all cadiz sub-crates and adds
//! the per-cycle pipeline on top of them. Each rebalance:
//!
//! 1. selects the tradable universe ([`UniverseFilter`]),
//! 2. computes raw factors ([`FactorEngine`]),
//! 3. ranks them cross-sectionally ([`CrossSectionalRanker`]),
//! 4. sums the ranks into an alpha ([`RankSumCombiner`]),
//! 5. solves for the alpha-maximizing weights under the configured
//!    constraints ([`Allocator`]).
//!
//! ## Quick Start
//!
//! ```
//! use cadiz::{CycleContext, Date, Rebalancer, StrategyConfig};
//!
//! # fn main() -> cadiz::Result<()> {
//! let rebalancer = Rebalancer::new(StrategyConfig::default())?;
//!
//! let ctx = CycleContext::new(Date::from_ymd_opt(2024, 6, 28).unwrap(), vec![])?;
//! let report = rebalancer.run(&ctx)?;
//! assert!(report.weights.is_empty());
//! # Ok(())
//! # }
//! ```

/// Version information for the cadiz crate.
///
/// This constant contains the current version of cadiz as specified in Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod pipeline;

pub use config::StrategyConfig;
pub use pipeline::{CycleScores, RebalanceReport, Rebalancer};

// ============================================================================
// Core Types
// ============================================================================

/// Core types and trait definitions.
///
/// This module re-exports the shared vocabulary of a rebalance cycle:
///
/// - [`Factor`] - Per-security raw score
/// - [`CycleContext`] - Explicit input of one cycle
/// - [`FactorScore`], [`AlphaScore`], [`TargetWeights`] - Stage outputs
pub mod traits {
    pub use cadiz_traits::*;
}

// Re-export core traits at top level for convenience
pub use cadiz_combine::Combiner;
pub use cadiz_optimize::LinearSolver;
pub use cadiz_traits::Factor;

// Re-export error types
pub use cadiz_traits::{CadizError, Result};

// Re-export common types
pub use cadiz_traits::{
    AlphaScore, CycleContext, Date, FactorScore, SectorCode, SectorMap, Security, SecurityId,
    TargetWeights, Universe,
};

// ============================================================================
// Factors and Universe
// ============================================================================

/// Factor implementations and universe selection.
///
/// ## Available Factors
///
/// - **Momentum**: 11-month return skipping the most recent month
/// - **Value**: Book-to-market
/// - **Quality**: Operating profitability
///
/// # Example
///
/// ```
/// use cadiz::factors::{FactorEngine, FactorKind, momentum::MomentumConfig};
///
/// let engine = FactorEngine::from_kinds(&FactorKind::ALL, &MomentumConfig::default()).unwrap();
/// assert_eq!(engine.factor_names(), vec!["book_to_market", "operating_profitability", "momentum"]);
/// ```
pub mod factors {
    pub use cadiz_factors::*;
}

pub use cadiz_factors::{FactorEngine, UniverseConfig, UniverseFilter};

// ============================================================================
// Ranking and Combination
// ============================================================================

/// Cross-sectional ranking and composite scoring.
///
/// ## Available Combiners
///
/// - **RankSumCombiner**: Sum of ranks, defined only where every factor is present
pub mod combine {
    pub use cadiz_combine::*;
}

pub use cadiz_combine::{CrossSectionalRanker, RankSumCombiner};

// ============================================================================
// Allocation
// ============================================================================

/// Constrained weight allocation.
///
/// ## Constraints
///
/// - **GrossLeverageBound**: `Σ|w| ≤ L`
/// - **PositionBox**: `-s_max ≤ w ≤ l_max`
/// - **SectorExposureBound**: net sector exposure inside a band
/// - **DollarNeutral**: `Σw = 0`
///
/// The allocation is a linear program solved by [`optimize::DenseSimplex`]
/// unless another [`LinearSolver`] is supplied.
pub mod optimize {
    pub use cadiz_optimize::*;
}

pub use cadiz_optimize::{AllocationConfig, Allocator, Constraint};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```
/// use cadiz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::traits::*;
    pub use crate::{
        AllocationConfig, Allocator, CadizError, Combiner, Constraint, CrossSectionalRanker,
        Factor, FactorEngine, LinearSolver, RankSumCombiner, RebalanceReport, Rebalancer,
        Result, StrategyConfig, UniverseConfig, UniverseFilter,
    };
}

// ============================================================================
// Tests
// ============================================================================
