//! Factor implementations and universe selection for the cadiz engine.
//!
//! This crate provides the raw per-security factors across three categories:
//! - Momentum: long-horizon price momentum skipping the most recent month
//! - Value: book-to-market
//! - Quality: operating profitability
//!
//! along with the [`UniverseFilter`] that selects the tradable universe and
//! the [`FactorEngine`] that evaluates a configured factor list over it.
//!
//! # Example
//!
//! ```
//! use cadiz_factors::{FactorEngine, registry::FactorKind, momentum::MomentumConfig};
//!
//! let engine = FactorEngine::from_kinds(&FactorKind::ALL, &MomentumConfig::default()).unwrap();
//! assert_eq!(engine.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod momentum;
pub mod quality;
pub mod registry;
pub mod value;

mod engine;
mod universe;

// Re-export key types
pub use engine::FactorEngine;
pub use registry::{FactorCategory, FactorInfo, FactorKind};
pub use universe::{PercentileBand, UniverseConfig, UniverseFilter};
