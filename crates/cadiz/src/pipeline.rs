//! One rebalance cycle, from snapshot to target weights.

use cadiz_combine::{Combiner, CrossSectionalRanker, RankSumCombiner};
use cadiz_factors::{FactorEngine, UniverseFilter};
use cadiz_optimize::{Allocator, Constraint, DenseSimplex, LinearSolver};
use cadiz_traits::{AlphaScore, CycleContext, Date, FactorScore, Result, TargetWeights, Universe};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;

/// Scores computed for one cycle before allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleScores {
    /// Eligible securities
    pub universe: Universe,
    /// Raw factor values, in configured order
    pub raw: Vec<FactorScore>,
    /// Rank versions of `raw`
    pub ranks: Vec<FactorScore>,
    /// Composite alpha over securities ranked by every factor
    pub alpha: AlphaScore,
}

/// Audit record of one rebalance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceReport {
    /// Decision date
    pub as_of: Date,
    /// Universe, factor, rank and alpha scores
    #[serde(flatten)]
    pub scores: CycleScores,
    /// Target weights; empty when no security could be scored
    pub weights: TargetWeights,
    /// Total weighted alpha of `weights`
    pub objective: f64,
    /// Simplex pivots performed
    pub iterations: usize,
    /// Combination strategy
    pub combiner: String,
    /// Solver used for the allocation
    pub solver: String,
}

/// Runs the strategy for one cycle.
///
/// The rebalancer holds no state between cycles: every call to
/// [`run`](Self::run) derives its result from the supplied
/// [`CycleContext`] and the configuration alone.
#[derive(Debug)]
pub struct Rebalancer<S: LinearSolver = DenseSimplex> {
    config: StrategyConfig,
    filter: UniverseFilter,
    engine: FactorEngine,
    ranker: CrossSectionalRanker,
    combiner: RankSumCombiner,
    allocator: Allocator<S>,
    constraints: Vec<Constraint>,
}

impl Rebalancer<DenseSimplex> {
    /// Builds a rebalancer backed by the dense simplex solver.
    pub fn new(config: StrategyConfig) -> Result<Self> {
        Self::with_solver(config, DenseSimplex::default())
    }
}

impl<S: LinearSolver> Rebalancer<S> {
    /// Builds a rebalancer backed by `solver`, validating `config`.
    pub fn with_solver(config: StrategyConfig, solver: S) -> Result<Self> {
        config.validate()?;
        let filter = UniverseFilter::new(config.universe.clone(), config.momentum)?;
        let engine = FactorEngine::from_kinds(&config.factors, &config.momentum)?;
        let ranker = CrossSectionalRanker::new(config.ranking);
        let allocator = Allocator::with_solver(solver, Some(config.allocation.time_limit()));
        let constraints = config.allocation.constraints();

        Ok(Self {
            config,
            filter,
            engine,
            ranker,
            combiner: RankSumCombiner,
            allocator,
            constraints,
        })
    }

    /// The strategy configuration.
    pub const fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Selects the universe and computes factor, rank and alpha scores.
    pub fn score(&self, ctx: &CycleContext) -> Result<CycleScores> {
        ctx.validate()?;

        let universe = self.filter.filter(ctx);
        let raw = self.engine.compute(ctx, &universe);
        let ranks = self.ranker.rank_all(&raw, &universe);
        let alpha = self.combiner.combine(&ranks)?;
        debug!(
            "{}: universe {}, alpha {} via {}",
            ctx.as_of,
            universe.len(),
            alpha.len(),
            self.combiner.name()
        );

        Ok(CycleScores {
            universe,
            raw,
            ranks,
            alpha,
        })
    }

    /// Runs the full cycle and returns its audit record.
    ///
    /// An empty universe or alpha yields empty weights rather than an error.
    /// Allocation failures abort the cycle; no partial weights are returned.
    pub fn run(&self, ctx: &CycleContext) -> Result<RebalanceReport> {
        let scores = self.score(ctx)?;

        if scores.alpha.is_empty() {
            warn!(
                "{}: no security could be scored ({} in universe), targeting no positions",
                ctx.as_of,
                scores.universe.len()
            );
            return Ok(RebalanceReport {
                as_of: ctx.as_of,
                scores,
                weights: TargetWeights::new(),
                objective: 0.0,
                iterations: 0,
                combiner: self.combiner.name().to_string(),
                solver: self.allocator.solver().name().to_string(),
            });
        }

        let sectors = ctx.sector_map(scores.alpha.keys());
        let allocation = self
            .allocator
            .solve(&scores.alpha, &sectors, &self.constraints)?;

        let held = allocation.weights.values().filter(|w| **w != 0.0).count();
        info!(
            "{}: {} positions from {} scored securities, objective {:.6}",
            ctx.as_of,
            held,
            scores.alpha.len(),
            allocation.objective
        );

        Ok(RebalanceReport {
            as_of: ctx.as_of,
            scores,
            weights: allocation.weights,
            objective: allocation.objective,
            iterations: allocation.iterations,
            combiner: self.combiner.name().to_string(),
            solver: allocation.solver,
        })
    }
}
