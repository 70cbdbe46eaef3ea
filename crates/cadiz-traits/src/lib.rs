#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cadiz/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the Cadiz portfolio construction engine.
//!
//! This crate provides the shared vocabulary of a rebalance cycle: the
//! per-security snapshot, the universe, factor and alpha scores, target
//! weights, the [`Factor`] abstraction and the error type.

/// The version of the cadiz-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod factor;
pub mod frame;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{CadizError, Result};
pub use factor::Factor;
pub use types::{
    AlphaScore, CycleContext, Date, FactorScore, SectorCode, SectorMap, Security, SecurityId,
    TargetWeights, Universe,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
