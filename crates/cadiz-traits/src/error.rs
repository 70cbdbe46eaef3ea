//! Error types for the Cadiz engine.
//!
//! Data-level missingness is never an error: absent fields propagate as
//! `None` through factors, ranks and the composite score. The variants here
//! cover configuration problems, malformed inputs and allocation failures,
//! all of which abort the cycle without producing target weights.

use thiserror::Error;

/// The main error type for Cadiz operations.
#[derive(Debug, Error)]
pub enum CadizError {
    /// The constraint set admits no feasible allocation.
    #[error("Infeasible constraints: {0}")]
    InfeasibleConstraints(String),

    /// The solver exceeded its wall-clock budget.
    #[error("Solver timed out after {budget_ms} ms")]
    SolverTimeout {
        /// Configured budget in milliseconds.
        budget_ms: u64,
    },

    /// The objective can grow without bound under the given constraints.
    #[error("Unbounded problem: {0}")]
    UnboundedProblem(String),

    /// The solver failed for a reason other than infeasibility or timeout.
    #[error("Solver failure: {0}")]
    Solver(String),

    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl CadizError {
    /// Returns true for failures raised by the allocation step.
    pub const fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            Self::InfeasibleConstraints(_)
                | Self::SolverTimeout { .. }
                | Self::UnboundedProblem(_)
                | Self::Solver(_)
        )
    }
}

/// A specialized Result type for Cadiz operations.
pub type Result<T> = std::result::Result<T, CadizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CadizError::InfeasibleConstraints("sector 101".to_string());
        assert_eq!(err.to_string(), "Infeasible constraints: sector 101");

        let err = CadizError::SolverTimeout { budget_ms: 250 };
        assert_eq!(err.to_string(), "Solver timed out after 250 ms");

        let err = CadizError::MissingColumn("close".to_string());
        assert_eq!(err.to_string(), "Missing required column: close");
    }

    #[test]
    fn test_allocation_failure_classification() {
        assert!(CadizError::InfeasibleConstraints(String::new()).is_allocation_failure());
        assert!(CadizError::SolverTimeout { budget_ms: 1 }.is_allocation_failure());
        assert!(!CadizError::InvalidConfig(String::new()).is_allocation_failure());
        assert!(!CadizError::MissingColumn(String::new()).is_allocation_failure());
    }

    #[test]
    fn test_timeout_is_distinct_from_infeasible() {
        let timeout = CadizError::SolverTimeout { budget_ms: 10 };
        assert!(!matches!(timeout, CadizError::InfeasibleConstraints(_)));
    }
}
