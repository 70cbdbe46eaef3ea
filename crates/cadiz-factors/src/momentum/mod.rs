//! Momentum factors based on historical close prices.
//!
//! The strategy uses a single lagged momentum measure: the return over the
//! bulk of a one-year window, excluding the most recent month.

mod lagged;

pub use lagged::{LaggedMomentum, MIN_WINDOW, MomentumConfig};
