//! Linear program description and the solver seam.

use std::time::Duration;

use cadiz_traits::{CadizError, Result};
use serde::{Deserialize, Serialize};

/// Relation between a row's left-hand side and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// `a·x ≤ b`
    Le,
    /// `a·x ≥ b`
    Ge,
    /// `a·x = b`
    Eq,
}

impl Relation {
    /// The relation obtained by multiplying both sides by -1.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Le => Self::Ge,
            Self::Ge => Self::Le,
            Self::Eq => Self::Eq,
        }
    }
}

/// One sparse constraint row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Non-zero coefficients as `(variable, coefficient)` pairs
    pub coefficients: Vec<(usize, f64)>,
    /// Row relation
    pub relation: Relation,
    /// Right-hand side
    pub rhs: f64,
}

impl LinearConstraint {
    /// Left-hand side evaluated at `x`.
    #[must_use]
    pub fn lhs(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|&(j, a)| a * x.get(j).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Maximize `c·x` subject to sparse rows and `x ≥ 0`.
///
/// # Examples
///
/// ```
/// use cadiz_optimize::{DenseSimplex, LinearProgram, LinearSolver, Relation};
///
/// // maximize 3x + 2y  s.t.  x + y ≤ 4,  x ≤ 3
/// let mut lp = LinearProgram::new(vec![3.0, 2.0]).unwrap();
/// lp.add_constraint([(0, 1.0), (1, 1.0)], Relation::Le, 4.0).unwrap();
/// lp.add_constraint([(0, 1.0)], Relation::Le, 3.0).unwrap();
///
/// let solution = DenseSimplex::default().solve(&lp, None).unwrap();
/// assert!((solution.objective - 11.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl LinearProgram {
    /// Creates a program over `objective.len()` non-negative variables.
    pub fn new(objective: Vec<f64>) -> Result<Self> {
        if let Some(j) = objective.iter().position(|c| !c.is_finite()) {
            return Err(CadizError::InvalidData(format!(
                "objective coefficient {j} is not finite"
            )));
        }
        Ok(Self {
            objective,
            constraints: Vec::new(),
        })
    }

    /// Appends a constraint row. Repeated variable indices are summed.
    pub fn add_constraint(
        &mut self,
        coefficients: impl IntoIterator<Item = (usize, f64)>,
        relation: Relation,
        rhs: f64,
    ) -> Result<()> {
        let coefficients: Vec<(usize, f64)> = coefficients.into_iter().collect();
        let n = self.num_variables();
        for &(j, a) in &coefficients {
            if j >= n {
                return Err(CadizError::InvalidData(format!(
                    "constraint references variable {j} of {n}"
                )));
            }
            if !a.is_finite() {
                return Err(CadizError::InvalidData(format!(
                    "constraint coefficient for variable {j} is not finite"
                )));
            }
        }
        if !rhs.is_finite() {
            return Err(CadizError::InvalidData(
                "constraint right-hand side is not finite".into(),
            ));
        }
        self.constraints.push(LinearConstraint {
            coefficients,
            relation,
            rhs,
        });
        Ok(())
    }

    /// Number of decision variables.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraint rows.
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective coefficients.
    #[must_use]
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Constraint rows in insertion order.
    #[must_use]
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective value at `x`.
    #[must_use]
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// Largest row or bound violation at `x`, zero if `x` is feasible.
    #[must_use]
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        let bounds = x.iter().map(|v| (-v).max(0.0));
        let rows = self.constraints.iter().map(|row| {
            let lhs = row.lhs(x);
            match row.relation {
                Relation::Le => (lhs - row.rhs).max(0.0),
                Relation::Ge => (row.rhs - lhs).max(0.0),
                Relation::Eq => (lhs - row.rhs).abs(),
            }
        });
        bounds.chain(rows).fold(0.0, f64::max)
    }
}

/// An optimal point returned by a [`LinearSolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpSolution {
    /// Variable values
    pub x: Vec<f64>,
    /// Objective value at `x`
    pub objective: f64,
    /// Pivots performed across both phases
    pub iterations: usize,
}

/// Solves linear programs for the allocator.
///
/// Implementations return an optimal solution or one of
/// [`CadizError::InfeasibleConstraints`], [`CadizError::UnboundedProblem`],
/// [`CadizError::SolverTimeout`] or [`CadizError::Solver`]. A timed-out
/// solve never returns a partial point.
pub trait LinearSolver: Send + Sync {
    /// Solver name, recorded in reports.
    fn name(&self) -> &str;

    /// Solves `lp`, giving up once `time_limit` has elapsed.
    fn solve(&self, lp: &LinearProgram, time_limit: Option<Duration>) -> Result<LpSolution>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_out_of_range_variable() {
        let mut lp = LinearProgram::new(vec![1.0]).unwrap();
        assert!(matches!(
            lp.add_constraint([(1, 1.0)], Relation::Le, 1.0),
            Err(CadizError::InvalidData(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(LinearProgram::new(vec![f64::NAN]).is_err());
        let mut lp = LinearProgram::new(vec![1.0]).unwrap();
        assert!(lp.add_constraint([(0, f64::INFINITY)], Relation::Le, 1.0).is_err());
        assert!(lp.add_constraint([(0, 1.0)], Relation::Le, f64::NAN).is_err());
        assert_eq!(lp.num_constraints(), 0);
    }

    #[test]
    fn test_violation() {
        let mut lp = LinearProgram::new(vec![1.0, 1.0]).unwrap();
        lp.add_constraint([(0, 1.0), (1, 1.0)], Relation::Le, 1.0).unwrap();
        lp.add_constraint([(0, 1.0)], Relation::Eq, 0.25).unwrap();
        assert_relative_eq!(lp.max_violation(&[0.25, 0.5]), 0.0);
        assert_relative_eq!(lp.max_violation(&[0.25, 1.0]), 0.25);
        assert_relative_eq!(lp.max_violation(&[0.5, -0.1]), 0.25);
        assert_relative_eq!(lp.evaluate(&[0.25, 0.5]), 0.75);
    }

    #[test]
    fn test_relation_flip() {
        assert_eq!(Relation::Le.flipped(), Relation::Ge);
        assert_eq!(Relation::Ge.flipped(), Relation::Le);
        assert_eq!(Relation::Eq.flipped(), Relation::Eq);
    }
}
