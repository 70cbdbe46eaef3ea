//! Value factors based on fundamental valuation metrics.
//!
//! Value factors compare balance-sheet fundamentals to market prices using
//! point-in-time snapshots.

mod book_to_market;

pub use book_to_market::BookToMarket;
