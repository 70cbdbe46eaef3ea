//! Dense two-phase tableau simplex.

use std::time::{Duration, Instant};

use cadiz_traits::{CadizError, Result};
use log::{debug, trace};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::problem::{LinearProgram, LinearSolver, LpSolution, Relation};

/// Ratios closer than this are treated as tied in the ratio test.
const RATIO_TIE: f64 = 1e-12;

/// Configuration for [`DenseSimplex`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexConfig {
    /// Pivot cap across both phases (default: 100,000)
    pub max_iterations: usize,

    /// Consecutive degenerate pivots before switching to Bland's rule (default: 50)
    pub degenerate_limit: usize,

    /// Smallest magnitude accepted as a pivot element (default: 1e-9)
    pub pivot_tolerance: f64,

    /// Reduced-cost threshold for optimality (default: 1e-9)
    pub optimality_tolerance: f64,

    /// Phase-one residual accepted as feasible, relative to the largest
    /// right-hand side (default: 1e-7)
    pub feasibility_tolerance: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            degenerate_limit: 50,
            pivot_tolerance: 1e-9,
            optimality_tolerance: 1e-9,
            feasibility_tolerance: 1e-7,
        }
    }
}

/// Two-phase simplex over a dense `ndarray` tableau.
///
/// Entering columns use Dantzig's rule (most negative reduced cost, lowest
/// index on ties). After `degenerate_limit` consecutive degenerate pivots
/// the solver prices with Bland's rule until the objective moves again,
/// which rules out cycling. The ratio test breaks ties by the smallest
/// basic variable index, so the pivot sequence is a pure function of the
/// input.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseSimplex {
    config: SimplexConfig,
}

impl DenseSimplex {
    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: SimplexConfig) -> Self {
        Self { config }
    }

    /// Returns the solver configuration.
    #[must_use]
    pub const fn config(&self) -> &SimplexConfig {
        &self.config
    }

    fn optimize(
        &self,
        tableau: &mut Tableau,
        deadline: Option<&Deadline>,
        iterations: &mut usize,
    ) -> Result<()> {
        let mut degenerate_run = 0usize;
        let mut bland = false;

        loop {
            if let Some(deadline) = deadline {
                deadline.check()?;
            }

            let Some(col) = tableau.entering(bland, self.config.optimality_tolerance) else {
                return Ok(());
            };

            if *iterations >= self.config.max_iterations {
                return Err(CadizError::Solver(format!(
                    "simplex exceeded {} iterations",
                    self.config.max_iterations
                )));
            }

            let Some(row) = tableau.leaving(col, self.config.pivot_tolerance) else {
                return Err(CadizError::UnboundedProblem(format!(
                    "column {col} can increase without bound"
                )));
            };

            let degenerate = tableau.rhs(row) <= self.config.pivot_tolerance;
            tableau.pivot(row, col);
            *iterations += 1;

            if degenerate {
                degenerate_run += 1;
                if !bland && degenerate_run >= self.config.degenerate_limit {
                    trace!(
                        "simplex: {degenerate_run} degenerate pivots, switching to Bland's rule"
                    );
                    bland = true;
                }
            } else {
                degenerate_run = 0;
                bland = false;
            }
        }
    }
}

impl LinearSolver for DenseSimplex {
    fn name(&self) -> &str {
        "dense_simplex"
    }

    fn solve(&self, lp: &LinearProgram, time_limit: Option<Duration>) -> Result<LpSolution> {
        let deadline = time_limit.and_then(Deadline::after);
        if let Some(deadline) = &deadline {
            deadline.check()?;
        }

        let (mut tableau, artificial_start) = Tableau::build(lp);
        let columns = tableau.columns();
        let mut iterations = 0usize;

        if artificial_start < columns {
            let costs: Vec<f64> = (0..columns)
                .map(|j| if j >= artificial_start { -1.0 } else { 0.0 })
                .collect();
            tableau.set_objective(&costs);
            self.optimize(&mut tableau, deadline.as_ref(), &mut iterations)?;

            let residual = -tableau.objective_value();
            let scale = lp
                .constraints()
                .iter()
                .map(|row| row.rhs.abs())
                .fold(1.0, f64::max);
            if residual > self.config.feasibility_tolerance * scale {
                return Err(CadizError::InfeasibleConstraints(format!(
                    "no point satisfies all {} rows (phase one residual {residual:.3e})",
                    lp.num_constraints()
                )));
            }

            tableau.drive_out_artificials(artificial_start, self.config.pivot_tolerance);
            tableau.truncate_columns(artificial_start);
            debug!(
                "simplex: phase one feasible after {iterations} pivots, {} rows kept",
                tableau.rows()
            );
        }

        let mut costs = vec![0.0; tableau.columns()];
        costs[..lp.num_variables()].copy_from_slice(lp.objective());
        tableau.set_objective(&costs);
        self.optimize(&mut tableau, deadline.as_ref(), &mut iterations)?;

        let x = tableau.primal(lp.num_variables());
        let objective = lp.evaluate(&x);
        debug!("simplex: optimal objective {objective:.6} after {iterations} pivots");

        Ok(LpSolution {
            x,
            objective,
            iterations,
        })
    }
}

#[derive(Debug)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    fn after(budget: Duration) -> Option<Self> {
        Instant::now()
            .checked_add(budget)
            .map(|at| Self { at, budget })
    }

    fn check(&self) -> Result<()> {
        if Instant::now() >= self.at {
            return Err(CadizError::SolverTimeout {
                budget_ms: u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }
}

/// Constraint rows followed by one objective row; the last column holds the
/// right-hand sides. The objective row stores `z_j - c_j`, so a negative
/// entry marks an improving column.
#[derive(Debug)]
struct Tableau {
    cells: Array2<f64>,
    basis: Vec<usize>,
}

impl Tableau {
    /// Lays out originals, then one slack or surplus per inequality, then
    /// one artificial per `≥` or `=` row. Returns the first artificial column.
    fn build(lp: &LinearProgram) -> (Self, usize) {
        let n = lp.num_variables();
        let rows = lp.constraints();
        let m = rows.len();

        let mut slacks = 0usize;
        let mut artificials = 0usize;
        let normalized: Vec<(f64, Relation)> = rows
            .iter()
            .map(|row| {
                let (sign, relation) = if row.rhs < 0.0 {
                    (-1.0, row.relation.flipped())
                } else {
                    (1.0, row.relation)
                };
                match relation {
                    Relation::Le => slacks += 1,
                    Relation::Ge => {
                        slacks += 1;
                        artificials += 1;
                    }
                    Relation::Eq => artificials += 1,
                }
                (sign, relation)
            })
            .collect();

        let artificial_start = n + slacks;
        let columns = artificial_start + artificials;
        let mut cells = Array2::<f64>::zeros((m + 1, columns + 1));
        let mut basis = Vec::with_capacity(m);
        let mut next_slack = n;
        let mut next_artificial = artificial_start;

        for (i, (row, &(sign, relation))) in rows.iter().zip(&normalized).enumerate() {
            for &(j, a) in &row.coefficients {
                cells[[i, j]] += sign * a;
            }
            cells[[i, columns]] = sign * row.rhs;

            match relation {
                Relation::Le => {
                    cells[[i, next_slack]] = 1.0;
                    basis.push(next_slack);
                    next_slack += 1;
                }
                Relation::Ge => {
                    cells[[i, next_slack]] = -1.0;
                    next_slack += 1;
                    cells[[i, next_artificial]] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
                Relation::Eq => {
                    cells[[i, next_artificial]] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
        }

        (Self { cells, basis }, artificial_start)
    }

    fn rows(&self) -> usize {
        self.basis.len()
    }

    fn columns(&self) -> usize {
        self.cells.ncols() - 1
    }

    fn rhs(&self, row: usize) -> f64 {
        self.cells[[row, self.columns()]]
    }

    fn objective_value(&self) -> f64 {
        self.cells[[self.rows(), self.columns()]]
    }

    /// Prices the objective row for maximizing `costs·x` under the current basis.
    fn set_objective(&mut self, costs: &[f64]) {
        let obj = self.rows();
        let mut objective_row = self.cells.row_mut(obj);
        objective_row.fill(0.0);
        for (j, &c) in costs.iter().enumerate() {
            objective_row[j] = -c;
        }

        for i in 0..self.rows() {
            let cb = costs[self.basis[i]];
            if cb != 0.0 {
                let row = self.cells.row(i).to_owned();
                self.cells.row_mut(obj).scaled_add(cb, &row);
            }
        }
    }

    fn entering(&self, bland: bool, tolerance: f64) -> Option<usize> {
        let reduced = self.cells.row(self.rows());
        let improving = (0..self.columns()).filter(|&j| reduced[j] < -tolerance);
        if bland {
            return improving.min();
        }

        let mut best: Option<(usize, f64)> = None;
        for j in improving {
            if best.is_none_or(|(_, value)| reduced[j] < value) {
                best = Some((j, reduced[j]));
            }
        }
        best.map(|(j, _)| j)
    }

    fn leaving(&self, col: usize, pivot_tolerance: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.rows() {
            let a = self.cells[[i, col]];
            if a <= pivot_tolerance {
                continue;
            }
            let ratio = self.rhs(i).max(0.0) / a;
            let better = match best {
                None => true,
                Some((b, r)) => {
                    ratio < r - RATIO_TIE
                        || ((ratio - r).abs() <= RATIO_TIE && self.basis[i] < self.basis[b])
                }
            };
            if better {
                best = Some((i, ratio));
            }
        }
        best.map(|(i, _)| i)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.cells[[row, col]];
        {
            let mut pivot_row = self.cells.row_mut(row);
            pivot_row /= pivot;
        }
        self.cells[[row, col]] = 1.0;

        let pivot_row = self.cells.row(row).to_owned();
        for i in 0..self.cells.nrows() {
            if i == row {
                continue;
            }
            let factor = self.cells[[i, col]];
            if factor != 0.0 {
                self.cells.row_mut(i).scaled_add(-factor, &pivot_row);
                self.cells[[i, col]] = 0.0;
            }
        }
        self.basis[row] = col;
    }

    /// Pivots zero-valued artificials out of the basis; rows where that is
    /// impossible are linearly dependent and are removed.
    fn drive_out_artificials(&mut self, artificial_start: usize, pivot_tolerance: f64) {
        let mut row = 0;
        while row < self.rows() {
            if self.basis[row] < artificial_start {
                row += 1;
                continue;
            }
            let replacement =
                (0..artificial_start).find(|&j| self.cells[[row, j]].abs() > pivot_tolerance);
            match replacement {
                Some(col) => {
                    self.pivot(row, col);
                    row += 1;
                }
                None => {
                    trace!("simplex: dropping redundant row {row}");
                    let keep: Vec<usize> = (0..self.cells.nrows()).filter(|&i| i != row).collect();
                    self.cells = self.cells.select(Axis(0), &keep);
                    self.basis.remove(row);
                }
            }
        }
    }

    /// Drops every column from `start` on, keeping the right-hand side.
    fn truncate_columns(&mut self, start: usize) {
        let mut keep: Vec<usize> = (0..start).collect();
        keep.push(self.columns());
        self.cells = self.cells.select(Axis(1), &keep);
    }

    fn primal(&self, n: usize) -> Vec<f64> {
        let mut x = vec![0.0; n];
        for (i, &b) in self.basis.iter().enumerate() {
            if b < n {
                x[b] = self.rhs(i).max(0.0);
            }
        }
        x
    }
}
