//! Rank-sum composite with all-or-nothing missing data.

use std::collections::BTreeSet;

use cadiz_traits::{AlphaScore, CadizError, FactorScore, Result, SecurityId};
use log::debug;

use crate::combiner::Combiner;

/// Sums per-factor ranks into one alpha per security.
///
/// A security receives an alpha only when every input factor has a value
/// for it; otherwise it is screened out of the composite. Securities are
/// drawn from the union of the inputs' keys.
///
/// # Examples
///
/// ```rust
/// use cadiz_combine::{Combiner, RankSumCombiner};
/// use cadiz_traits::FactorScore;
///
/// let value: FactorScore = [("A", Some(1.0)), ("B", Some(2.0))].into_iter().collect();
/// let quality: FactorScore = [("A", Some(2.0)), ("B", None)].into_iter().collect();
///
/// let alpha = RankSumCombiner.combine(&[value, quality]).unwrap();
/// assert_eq!(alpha.get("A"), Some(&3.0));
/// assert!(alpha.get("B").is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RankSumCombiner;

impl Combiner for RankSumCombiner {
    fn combine(&self, factors: &[FactorScore]) -> Result<AlphaScore> {
        if factors.is_empty() {
            return Err(CadizError::InvalidConfig("Cannot combine zero factors".into()));
        }

        let ids: BTreeSet<&SecurityId> = factors
            .iter()
            .flat_map(|f| f.iter().map(|(id, _)| id))
            .collect();

        let mut alpha = AlphaScore::new();
        for id in ids {
            let total: Option<f64> = factors.iter().map(|f| f.get(id)).sum();
            if let Some(total) = total {
                if !total.is_finite() {
                    return Err(CadizError::InvalidData(format!(
                        "composite for '{id}' is not finite"
                    )));
                }
                alpha.insert(id.as_str(), total);
            }
        }

        debug!(
            "composite: {} of {} securities scored by {} factors",
            alpha.len(),
            factors.iter().map(FactorScore::len).max().unwrap_or(0),
            factors.len()
        );
        Ok(alpha)
    }

    fn name(&self) -> &str {
        "rank_sum"
    }
}
