//! Constrained portfolio allocation for cadiz.
//!
//! The [`Allocator`] turns composite alpha scores into target weights by
//! maximizing total weighted alpha under leverage, position-size, sector
//! and neutrality constraints. The problem is expressed as a
//! [`LinearProgram`] and handed to a [`LinearSolver`]; [`DenseSimplex`] is
//! the bundled implementation.
//!
//! # Examples
//!
//! ```rust
//! use cadiz_optimize::{AllocationConfig, Allocator};
//! use cadiz_traits::{AlphaScore, SectorMap};
//!
//! let alpha: AlphaScore = [("A", 3.0), ("B", 1.0)].into_iter().collect();
//! let sectors: SectorMap = [("A".to_string(), 101), ("B".to_string(), 206)].into_iter().collect();
//!
//! let config = AllocationConfig::default();
//! let weights = Allocator::new(Some(config.time_limit()))
//!     .allocate(&alpha, &sectors, &config.constraints())
//!     .unwrap();
//! assert!((weights["A"] - 0.01).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

mod allocator;
mod constraint;
mod problem;
mod simplex;

// Re-export main types
pub use allocator::{
    Allocation, AllocationConfig, Allocator, VERIFY_TOLERANCE, ZERO_SNAP, sectors_present,
};
pub use constraint::{Constraint, ExposureBand};
pub use problem::{LinearConstraint, LinearProgram, LinearSolver, LpSolution, Relation};
pub use simplex::{DenseSimplex, SimplexConfig};
