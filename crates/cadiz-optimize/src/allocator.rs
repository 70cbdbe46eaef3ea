//! Alpha-maximizing weight allocation under portfolio constraints.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use cadiz_traits::{AlphaScore, CadizError, Result, SectorCode, SectorMap, TargetWeights};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    constraint::{Constraint, ExposureBand},
    problem::{LinearProgram, LinearSolver, Relation},
    simplex::DenseSimplex,
};

/// Weights smaller than this in magnitude are reported as exactly zero.
pub const ZERO_SNAP: f64 = 1e-12;

/// Relative tolerance used when verifying solved weights.
pub const VERIFY_TOLERANCE: f64 = 1e-7;

/// Constraint limits and solver budget for one rebalance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Largest gross exposure `Σ|w|` (default: 1.0)
    pub max_gross_leverage: f64,

    /// Largest short position as a positive fraction (default: 0.0, long only)
    pub max_short: f64,

    /// Largest long position (default: 0.01)
    pub max_long: f64,

    /// Net exposure band for every sector (default: [-0.10, 0.10])
    pub sector_band: ExposureBand,

    /// Per-sector overrides of `sector_band`
    pub sector_overrides: BTreeMap<SectorCode, ExposureBand>,

    /// Require `Σ w = 0` (default: false)
    pub dollar_neutral: bool,

    /// Wall-clock budget for the solve in milliseconds (default: 30,000)
    pub timeout_ms: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_gross_leverage: 1.0,
            max_short: 0.0,
            max_long: 0.01,
            sector_band: ExposureBand::symmetric(0.10),
            sector_overrides: BTreeMap::new(),
            dollar_neutral: false,
            timeout_ms: 30_000,
        }
    }
}

impl AllocationConfig {
    /// The constraint set these limits describe.
    #[must_use]
    pub fn constraints(&self) -> Vec<Constraint> {
        let mut constraints = vec![
            Constraint::GrossLeverageBound {
                max: self.max_gross_leverage,
            },
            Constraint::PositionBox {
                max_short: self.max_short,
                max_long: self.max_long,
            },
            Constraint::SectorExposureBound {
                default: self.sector_band,
                overrides: self.sector_overrides.clone(),
            },
        ];
        if self.dollar_neutral {
            constraints.push(Constraint::DollarNeutral);
        }
        constraints
    }

    /// Solver time budget.
    #[must_use]
    pub const fn time_limit(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates every derived constraint.
    pub fn validate(&self) -> Result<()> {
        self.constraints().iter().try_for_each(Constraint::validate)
    }
}

/// Solved weights together with solver statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Target weight per security
    pub weights: TargetWeights,
    /// Total weighted alpha `Σ alpha_i · w_i`
    pub objective: f64,
    /// Simplex pivots performed
    pub iterations: usize,
    /// Name of the solver used
    pub solver: String,
}

/// Converts alpha scores into target weights.
///
/// Each weight is split as `w = p - q` with `p, q ≥ 0` so that gross
/// leverage becomes the linear row `Σ(p + q) ≤ L`. When every position box
/// forbids shorts the `q` variables are omitted.
///
/// Position boxes are explicit rows. For `n` securities in `k` banded sectors
/// a long-only problem has `n` variables and about `n + 2k + 1` rows; a
/// long-short one has `2n` variables and about `2n + 2k + 2` rows. The
/// default [`DenseSimplex`] tableau adds a slack or artificial column per
/// row, so a long-short allocation over `n` names holds roughly
/// `(2n + 2k) × 4n` entries, about 6 GB of `f64` at `n = 10_000`.
/// Universes beyond a few thousand names should supply a sparse
/// [`LinearSolver`] through [`Allocator::with_solver`].
#[derive(Debug, Clone)]
pub struct Allocator<S: LinearSolver = DenseSimplex> {
    solver: S,
    time_limit: Option<Duration>,
}

impl Allocator<DenseSimplex> {
    /// Allocator backed by the default dense simplex.
    #[must_use]
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self::with_solver(DenseSimplex::default(), time_limit)
    }
}

impl Default for Allocator<DenseSimplex> {
    fn default() -> Self {
        Self::new(Some(AllocationConfig::default().time_limit()))
    }
}

impl<S: LinearSolver> Allocator<S> {
    /// Allocator backed by `solver`.
    pub const fn with_solver(solver: S, time_limit: Option<Duration>) -> Self {
        Self { solver, time_limit }
    }

    /// The underlying solver.
    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// Maximizes `Σ alpha_i · w_i` subject to `constraints`.
    ///
    /// # Errors
    ///
    /// - [`CadizError::InvalidConfig`] for invalid constraint values
    /// - [`CadizError::InvalidData`] when a sector constraint is present and a
    ///   security has no sector label
    /// - [`CadizError::InfeasibleConstraints`], [`CadizError::UnboundedProblem`],
    ///   [`CadizError::SolverTimeout`] or [`CadizError::Solver`] from the solve
    pub fn allocate(
        &self,
        alpha: &AlphaScore,
        sectors: &SectorMap,
        constraints: &[Constraint],
    ) -> Result<TargetWeights> {
        self.solve(alpha, sectors, constraints).map(|a| a.weights)
    }

    /// Like [`allocate`](Self::allocate), also returning solver statistics.
    pub fn solve(
        &self,
        alpha: &AlphaScore,
        sectors: &SectorMap,
        constraints: &[Constraint],
    ) -> Result<Allocation> {
        constraints.iter().try_for_each(Constraint::validate)?;

        if alpha.is_empty() {
            return Ok(Allocation {
                weights: TargetWeights::new(),
                objective: 0.0,
                iterations: 0,
                solver: self.solver.name().to_string(),
            });
        }

        let ids: Vec<&String> = alpha.keys().collect();
        let has_sector_bound = constraints
            .iter()
            .any(|c| matches!(c, Constraint::SectorExposureBound { .. }));
        let unlabelled = has_sector_bound
            .then(|| ids.iter().find(|id| !sectors.contains_key(id.as_str())))
            .flatten();
        if let Some(id) = unlabelled {
            return Err(CadizError::InvalidData(format!(
                "security '{id}' has no sector label"
            )));
        }

        let layout = Layout::new(ids.len(), constraints);
        let lp = layout.program(alpha, sectors, constraints)?;
        debug!(
            "allocator: {} securities in {} sectors, {} variables, {} rows",
            ids.len(),
            sectors_present(alpha, sectors).len(),
            lp.num_variables(),
            lp.num_constraints()
        );

        let solution = self.solver.solve(&lp, self.time_limit)?;

        let weights: TargetWeights = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let w = layout.weight(&solution.x, i);
                ((*id).clone(), if w.abs() < ZERO_SNAP { 0.0 } else { w })
            })
            .collect();

        for constraint in constraints {
            if let Some(problem) = constraint.violation(&weights, sectors, VERIFY_TOLERANCE) {
                return Err(CadizError::Solver(format!(
                    "solution violates {}: {problem}",
                    constraint.name()
                )));
            }
        }

        let objective = weights.weighted_alpha(alpha);
        info!(
            "allocator: objective {objective:.6}, gross {:.4}, net {:.4}, {} pivots",
            weights.gross(),
            weights.net(),
            solution.iterations
        );

        Ok(Allocation {
            weights,
            objective,
            iterations: solution.iterations,
            solver: self.solver.name().to_string(),
        })
    }
}

/// Variable indexing: longs occupy `0..n`, shorts (when present) `n..2n`.
#[derive(Debug, Clone, Copy)]
struct Layout {
    n: usize,
    shorts: bool,
}

impl Layout {
    fn new(n: usize, constraints: &[Constraint]) -> Self {
        let shorts = !constraints
            .iter()
            .any(|c| matches!(c, Constraint::PositionBox { max_short, .. } if *max_short == 0.0));
        Self { n, shorts }
    }

    const fn variables(&self) -> usize {
        if self.shorts { 2 * self.n } else { self.n }
    }

    /// Coefficients of `Σ_{i ∈ members} w_i`.
    fn net_row(&self, members: impl IntoIterator<Item = usize>) -> Vec<(usize, f64)> {
        let mut row = Vec::new();
        for i in members {
            row.push((i, 1.0));
            if self.shorts {
                row.push((self.n + i, -1.0));
            }
        }
        row
    }

    fn weight(&self, x: &[f64], i: usize) -> f64 {
        let long = x.get(i).copied().unwrap_or(0.0);
        let short = if self.shorts {
            x.get(self.n + i).copied().unwrap_or(0.0)
        } else {
            0.0
        };
        long - short
    }

    fn program(
        &self,
        alpha: &AlphaScore,
        sectors: &SectorMap,
        constraints: &[Constraint],
    ) -> Result<LinearProgram> {
        let mut objective = vec![0.0; self.variables()];
        for (i, a) in alpha.values().enumerate() {
            objective[i] = *a;
            if self.shorts {
                objective[self.n + i] = -*a;
            }
        }
        let mut lp = LinearProgram::new(objective)?;

        for constraint in constraints {
            match constraint {
                Constraint::GrossLeverageBound { max } => {
                    let row = (0..self.variables()).map(|j| (j, 1.0));
                    lp.add_constraint(row, Relation::Le, *max)?;
                }
                Constraint::PositionBox {
                    max_short,
                    max_long,
                } => {
                    for i in 0..self.n {
                        lp.add_constraint([(i, 1.0)], Relation::Le, *max_long)?;
                        if self.shorts {
                            lp.add_constraint([(self.n + i, 1.0)], Relation::Le, *max_short)?;
                        }
                    }
                }
                Constraint::SectorExposureBound { .. } => {
                    let mut groups: BTreeMap<SectorCode, Vec<usize>> = BTreeMap::new();
                    for (i, id) in alpha.keys().enumerate() {
                        if let Some(sector) = sectors.get(id) {
                            groups.entry(*sector).or_default().push(i);
                        }
                    }
                    for (sector, members) in groups {
                        let Some(band) = constraint.sector_band(sector) else {
                            continue;
                        };
                        let row = self.net_row(members);
                        if band.min == band.max {
                            lp.add_constraint(row, Relation::Eq, band.min)?;
                        } else {
                            lp.add_constraint(row.clone(), Relation::Ge, band.min)?;
                            lp.add_constraint(row, Relation::Le, band.max)?;
                        }
                    }
                }
                Constraint::DollarNeutral => {
                    lp.add_constraint(self.net_row(0..self.n), Relation::Eq, 0.0)?;
                }
            }
        }
        Ok(lp)
    }
}

/// Sectors present among the alpha's securities.
#[must_use]
pub fn sectors_present(alpha: &AlphaScore, sectors: &SectorMap) -> BTreeSet<SectorCode> {
    alpha.keys().filter_map(|id| sectors.get(id).copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use crate::problem::LpSolution;

    fn alpha(entries: &[(&str, f64)]) -> AlphaScore {
        entries.iter().map(|(id, a)| (*id, *a)).collect()
    }

    fn sector_map(entries: &[(&str, SectorCode)]) -> SectorMap {
        entries.iter().map(|(id, s)| ((*id).to_string(), *s)).collect()
    }

    fn sector_bound(default: ExposureBand, overrides: &[(SectorCode, ExposureBand)]) -> Constraint {
        Constraint::SectorExposureBound {
            default,
            overrides: overrides.iter().copied().collect(),
        }
    }

    fn allocator() -> Allocator {
        Allocator::new(None)
    }

    #[test]
    fn test_default_config() {
        let config = AllocationConfig::default();
        assert_relative_eq!(config.max_gross_leverage, 1.0);
        assert_relative_eq!(config.max_short, 0.0);
        assert_relative_eq!(config.max_long, 0.01);
        assert_eq!(config.sector_band, ExposureBand::new(-0.1, 0.1));
        assert!(!config.dollar_neutral);
        assert_eq!(config.time_limit(), Duration::from_secs(30));
        assert_eq!(config.constraints().len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_end_to_end_example() {
        let alpha = alpha(&[("A", 2.0), ("B", 1.0), ("C", 0.0)]);
        let sectors = sector_map(&[("A", 1), ("B", 1), ("C", 2)]);
        let constraints = vec![
            Constraint::GrossLeverageBound { max: 1.0 },
            Constraint::PositionBox {
                max_short: 0.0,
                max_long: 0.5,
            },
            sector_bound(
                ExposureBand::symmetric(0.3),
                &[(2, ExposureBand::new(0.0, 1.0))],
            ),
        ];

        let allocation = allocator().solve(&alpha, &sectors, &constraints).unwrap();
        let w = &allocation.weights;
        assert_relative_eq!(w["A"], 0.3, epsilon = 1e-9);
        assert_relative_eq!(w["B"], 0.0, epsilon = 1e-9);
        assert!(w["C"] >= 0.0 && w["C"] <= 0.5);
        assert_relative_eq!(allocation.objective, 0.6, epsilon = 1e-9);
        assert!(w.gross() <= 1.0 + 1e-9);
        for constraint in &constraints {
            assert!(constraint.violation(w, &sectors, 1e-7).is_none());
        }
    }

    #[test]
    fn test_infeasible_sector_floor() {
        let alpha = alpha(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let sectors = sector_map(&[("A", 1), ("B", 1), ("C", 1)]);
        let constraints = vec![
            Constraint::GrossLeverageBound { max: 1.0 },
            Constraint::PositionBox {
                max_short: 0.0,
                max_long: 0.1,
            },
            sector_bound(ExposureBand::new(0.35, 0.5), &[]),
        ];
        assert!(matches!(
            allocator().allocate(&alpha, &sectors, &constraints),
            Err(CadizError::InfeasibleConstraints(_))
        ));
    }

    #[test]
    fn test_zero_timeout() {
        let alpha = alpha(&[("A", 1.0), ("B", 2.0)]);
        let sectors = sector_map(&[("A", 1), ("B", 2)]);
        let allocator = Allocator::new(Some(Duration::ZERO));
        let result =
            allocator.allocate(&alpha, &sectors, &AllocationConfig::default().constraints());
        assert!(matches!(result, Err(CadizError::SolverTimeout { .. })));
    }

    #[test]
    fn test_unbounded_without_limits() {
        let alpha = alpha(&[("A", 1.0), ("B", -1.0)]);
        let result = allocator().allocate(&alpha, &SectorMap::new(), &[]);
        assert!(matches!(result, Err(CadizError::UnboundedProblem(_))));
    }

    #[test]
    fn test_empty_alpha() {
        let weights = allocator()
            .allocate(
                &AlphaScore::new(),
                &SectorMap::new(),
                &AllocationConfig::default().constraints(),
            )
            .unwrap();
        assert!(weights.is_empty());
    }

    #[test]
    fn test_missing_sector_label() {
        let alpha = alpha(&[("A", 1.0), ("B", 2.0)]);
        let sectors = sector_map(&[("A", 1)]);
        let result =
            allocator().allocate(&alpha, &sectors, &AllocationConfig::default().constraints());
        assert!(matches!(result, Err(CadizError::InvalidData(_))));
    }

    #[test]
    fn test_invalid_constraint() {
        let alpha = alpha(&[("A", 1.0)]);
        let constraints = vec![Constraint::GrossLeverageBound { max: -0.5 }];
        assert!(matches!(
            allocator().allocate(&alpha, &SectorMap::new(), &constraints),
            Err(CadizError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_long_short_dollar_neutral() {
        let alpha = alpha(&[("A", 4.0), ("B", 3.0), ("C", 2.0), ("D", 1.0)]);
        let sectors = sector_map(&[("A", 1), ("B", 2), ("C", 1), ("D", 2)]);
        let constraints = vec![
            Constraint::GrossLeverageBound { max: 1.0 },
            Constraint::PositionBox {
                max_short: 0.25,
                max_long: 0.25,
            },
            sector_bound(ExposureBand::symmetric(0.1), &[]),
            Constraint::DollarNeutral,
        ];

        let allocation = allocator().solve(&alpha, &sectors, &constraints).unwrap();
        let w = &allocation.weights;
        // both sectors net to zero with the box binding on every name
        assert_relative_eq!(w["A"], 0.25, epsilon = 1e-9);
        assert_relative_eq!(w["B"], 0.25, epsilon = 1e-9);
        assert_relative_eq!(w["C"], -0.25, epsilon = 1e-9);
        assert_relative_eq!(w["D"], -0.25, epsilon = 1e-9);
        assert_relative_eq!(w.net(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(allocation.objective, 1.0, epsilon = 1e-9);
        for constraint in &constraints {
            assert!(constraint.violation(w, &sectors, 1e-7).is_none());
        }
    }

    #[test]
    fn test_negative_alpha_not_bought_long_only() {
        let alpha = alpha(&[("A", -1.0), ("B", 1.0)]);
        let sectors = sector_map(&[("A", 1), ("B", 1)]);
        let weights = allocator()
            .allocate(&alpha, &sectors, &AllocationConfig::default().constraints())
            .unwrap();
        assert_eq!(weights["A"], 0.0);
        assert_relative_eq!(weights["B"], 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let alpha: AlphaScore = (0..30_i32)
            .map(|i| (format!("S{i:02}"), f64::from((i * 7) % 11)))
            .collect();
        let sectors: SectorMap = (0..30_i32).map(|i| (format!("S{i:02}"), i % 4)).collect();
        let constraints = AllocationConfig {
            max_long: 0.08,
            ..AllocationConfig::default()
        }
        .constraints();

        let first = allocator().allocate(&alpha, &sectors, &constraints).unwrap();
        let second = allocator().allocate(&alpha, &sectors, &constraints).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.values().zip(second.values()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_program_dimensions() {
        let ids: Vec<String> = (0..6).map(|i| format!("S{i}")).collect();
        let alpha: AlphaScore = ids.iter().map(|id| (id.clone(), 1.0)).collect();
        let sectors: SectorMap = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), (i % 2) as SectorCode))
            .collect();

        let long_only = AllocationConfig::default().constraints();
        let layout = Layout::new(6, &long_only);
        let lp = layout.program(&alpha, &sectors, &long_only).unwrap();
        // leverage + 6 boxes + 2 sectors × (floor, cap)
        assert_eq!(lp.num_variables(), 6);
        assert_eq!(lp.num_constraints(), 1 + 6 + 4);

        let long_short = AllocationConfig {
            max_short: 0.05,
            dollar_neutral: true,
            ..AllocationConfig::default()
        }
        .constraints();
        let layout = Layout::new(6, &long_short);
        let lp = layout.program(&alpha, &sectors, &long_short).unwrap();
        // leverage + 12 boxes + 4 sector rows + dollar neutral
        assert_eq!(lp.num_variables(), 12);
        assert_eq!(lp.num_constraints(), 1 + 12 + 4 + 1);
    }

    #[test]
    fn test_sectors_present() {
        let alpha = alpha(&[("A", 1.0), ("B", 1.0)]);
        let sectors = sector_map(&[("A", 3), ("B", 3), ("Z", 9)]);
        assert_eq!(sectors_present(&alpha, &sectors), BTreeSet::from([3]));
    }

    #[derive(Debug)]
    struct AllZero;

    impl LinearSolver for AllZero {
        fn name(&self) -> &str {
            "all_zero"
        }

        fn solve(&self, lp: &LinearProgram, _: Option<Duration>) -> Result<LpSolution> {
            Ok(LpSolution {
                x: vec![0.0; lp.num_variables()],
                objective: 0.0,
                iterations: 0,
            })
        }
    }

    #[test]
    fn test_solution_is_verified() {
        let alpha = alpha(&[("A", 1.0)]);
        let sectors = sector_map(&[("A", 1)]);
        let constraints = vec![sector_bound(ExposureBand::new(0.2, 0.3), &[])];
        let allocator = Allocator::with_solver(AllZero, None);
        assert_eq!(allocator.solver().name(), "all_zero");
        assert!(matches!(
            allocator.allocate(&alpha, &sectors, &constraints),
            Err(CadizError::Solver(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_feasible_and_no_worse_than_cash(
            alphas in proptest::collection::vec(-5.0f64..5.0, 1..12),
            max_long in 0.01f64..0.5,
            leverage in 0.1f64..2.0,
            sector_width in 0.0f64..0.5,
        ) {
            let alpha: AlphaScore = alphas
                .iter()
                .enumerate()
                .map(|(i, a)| (format!("S{i:02}"), *a))
                .collect();
            let sectors: SectorMap = (0..alphas.len())
                .map(|i| (format!("S{i:02}"), i32::try_from(i % 3).unwrap()))
                .collect();
            let constraints = vec![
                Constraint::GrossLeverageBound { max: leverage },
                Constraint::PositionBox { max_short: max_long / 2.0, max_long },
                sector_bound(ExposureBand::symmetric(sector_width), &[]),
            ];

            let allocation = allocator().solve(&alpha, &sectors, &constraints).unwrap();
            prop_assert!(allocation.objective >= -1e-12);
            for constraint in &constraints {
                prop_assert!(constraint.violation(&allocation.weights, &sectors, 1e-7).is_none());
            }
        }

        #[test]
        fn prop_long_only_matches_greedy(
            alphas in proptest::collection::vec(-5.0f64..5.0, 1..15),
            max_long in 0.01f64..0.5,
            leverage in 0.1f64..2.0,
        ) {
            let alpha: AlphaScore = alphas
                .iter()
                .enumerate()
                .map(|(i, a)| (format!("S{i:02}"), *a))
                .collect();
            let constraints = vec![
                Constraint::GrossLeverageBound { max: leverage },
                Constraint::PositionBox { max_short: 0.0, max_long },
            ];

            // Fill the best positive alphas up to the box until leverage runs out.
            let mut sorted: Vec<f64> = alphas.iter().copied().filter(|a| *a > 0.0).collect();
            sorted.sort_by(|a, b| b.total_cmp(a));
            let mut budget = leverage;
            let mut expected = 0.0;
            for a in sorted {
                let w = max_long.min(budget);
                expected += a * w;
                budget -= w;
            }

            let allocation = allocator().solve(&alpha, &SectorMap::new(), &constraints).unwrap();
            prop_assert!((allocation.objective - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }
}
