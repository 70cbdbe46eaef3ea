//! Cross-sectional ranking and factor combination for cadiz.
//!
//! Raw factor values are first converted into ranks over the cycle's
//! universe, then merged into a composite alpha. The default strategy sums
//! ranks and keeps only securities scored by every factor.
//!
//! # Examples
//!
//! ```rust
//! use cadiz_combine::{Combiner, CrossSectionalRanker, RankSumCombiner};
//! use cadiz_traits::{FactorScore, Universe};
//!
//! let universe: Universe = ["A", "B"].into_iter().map(String::from).collect();
//! let value: FactorScore = [("A", Some(0.8)), ("B", Some(0.2))].into_iter().collect();
//! let momentum: FactorScore = [("A", Some(0.9)), ("B", Some(1.3))].into_iter().collect();
//!
//! let ranker = CrossSectionalRanker::default();
//! let ranks = ranker.rank_all(&[value, momentum], &universe);
//! let alpha = RankSumCombiner.combine(&ranks).unwrap();
//! assert_eq!(alpha.get("A"), Some(&3.0));
//! assert_eq!(alpha.get("B"), Some(&3.0));
//! ```

mod combiner;
mod rank;
mod rank_sum;

// Re-export main types
pub use combiner::Combiner;
pub use rank::{CrossSectionalRanker, RankConfig, RankOrigin};
pub use rank_sum::RankSumCombiner;
