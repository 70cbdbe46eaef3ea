//! Core trait definition for factor combiners.

use cadiz_traits::{AlphaScore, FactorScore, Result};

/// Combines multiple factor scores into a composite alpha.
///
/// Implementors define different strategies for merging per-factor scores.
/// All implementations must be thread-safe (Send + Sync).
///
/// # Examples
///
/// ```rust
/// use cadiz_combine::Combiner;
/// use cadiz_traits::{AlphaScore, FactorScore};
///
/// struct FirstFactor;
///
/// impl Combiner for FirstFactor {
///     fn combine(&self, factors: &[FactorScore]) -> cadiz_traits::Result<AlphaScore> {
///         Ok(factors
///             .first()
///             .map(|f| f.present().map(|(id, v)| (id.clone(), v)).collect())
///             .unwrap_or_default())
///     }
///
///     fn name(&self) -> &str {
///         "first_factor"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Combine multiple factor scores into a composite alpha.
    ///
    /// # Arguments
    ///
    /// * `factors` - Ordered factor scores to combine, usually rank versions.
    ///
    /// # Returns
    ///
    /// An alpha score containing only securities the strategy can score.
    ///
    /// # Errors
    ///
    /// Returns an error if no factors are provided or the combination
    /// produces non-finite values.
    fn combine(&self, factors: &[FactorScore]) -> Result<AlphaScore>;

    /// Name of this combination strategy.
    ///
    /// Used for logging and for the rebalance report.
    fn name(&self) -> &str;
}
