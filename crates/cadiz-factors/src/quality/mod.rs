//! Quality factors based on profitability.
//!
//! Higher quality companies tend to outperform over the long term.

mod operating_profitability;

pub use operating_profitability::OperatingProfitability;
