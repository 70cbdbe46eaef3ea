//! Cross-sectional ranking of raw factor values.

use cadiz_traits::{FactorScore, Universe, stats::ascending_positions};
use serde::{Deserialize, Serialize};

/// Value assigned to the smallest observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrigin {
    /// Ranks run 0..n-1.
    Zero,
    /// Ranks run 1..n.
    #[default]
    One,
}

impl RankOrigin {
    const fn offset(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

/// Configuration for cross-sectional ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Rank of the smallest value (default: one)
    pub origin: RankOrigin,
}

/// Converts a raw factor into ascending ranks over the universe.
///
/// Only universe members are ranked. Each non-missing value receives its
/// position among the non-missing values, ties broken by ascending id;
/// missing values stay missing. The output keeps the factor name.
///
/// # Examples
///
/// ```rust
/// use cadiz_combine::CrossSectionalRanker;
/// use cadiz_traits::{FactorScore, Universe};
///
/// let raw: FactorScore = [("A", Some(0.3)), ("B", Some(0.1)), ("C", None)]
///     .into_iter()
///     .collect();
/// let universe: Universe = ["A", "B", "C"].into_iter().map(String::from).collect();
///
/// let ranks = CrossSectionalRanker::default().rank(&raw, &universe);
/// assert_eq!(ranks.get("A"), Some(2.0));
/// assert_eq!(ranks.get("B"), Some(1.0));
/// assert_eq!(ranks.get("C"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossSectionalRanker {
    config: RankConfig,
}

impl CrossSectionalRanker {
    /// Create a ranker with the given configuration.
    pub const fn new(config: RankConfig) -> Self {
        Self { config }
    }

    /// Rank one factor over `universe`.
    pub fn rank(&self, factor: &FactorScore, universe: &Universe) -> FactorScore {
        let offset = self.config.origin.offset();
        let present = universe
            .iter()
            .filter_map(|id| factor.get(id).map(|v| (id.as_str(), v)));

        let mut ranks = FactorScore::new(factor.name());
        for id in universe.iter() {
            ranks.insert(id.as_str(), None);
        }
        for (id, pos) in ascending_positions(present) {
            ranks.insert(id, Some((pos + offset) as f64));
        }
        ranks
    }

    /// Rank every factor over `universe`, preserving order.
    pub fn rank_all(&self, factors: &[FactorScore], universe: &Universe) -> Vec<FactorScore> {
        factors.iter().map(|f| self.rank(f, universe)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn universe(ids: &[&str]) -> Universe {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_rank_one_based() {
        let raw: FactorScore = [("A", Some(3.0)), ("B", Some(1.0)), ("C", Some(2.0))]
            .into_iter()
            .collect::<FactorScore>()
            .with_name("momentum");
        let ranks = CrossSectionalRanker::default().rank(&raw, &universe(&["A", "B", "C"]));
        assert_eq!(ranks.name(), "momentum");
        assert_eq!(ranks.get("A"), Some(3.0));
        assert_eq!(ranks.get("B"), Some(1.0));
        assert_eq!(ranks.get("C"), Some(2.0));
    }

    #[test]
    fn test_rank_zero_based() {
        let raw: FactorScore = [("A", Some(3.0)), ("B", Some(1.0))].into_iter().collect();
        let ranker = CrossSectionalRanker::new(RankConfig {
            origin: RankOrigin::Zero,
        });
        let ranks = ranker.rank(&raw, &universe(&["A", "B"]));
        assert_eq!(ranks.get("A"), Some(1.0));
        assert_eq!(ranks.get("B"), Some(0.0));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let raw: FactorScore = [("C", Some(1.0)), ("A", Some(1.0)), ("B", Some(1.0))]
            .into_iter()
            .collect();
        let ranks = CrossSectionalRanker::default().rank(&raw, &universe(&["A", "B", "C"]));
        assert_eq!(ranks.get("A"), Some(1.0));
        assert_eq!(ranks.get("B"), Some(2.0));
        assert_eq!(ranks.get("C"), Some(3.0));
    }

    #[test]
    fn test_missing_stays_missing() {
        let raw: FactorScore = [("A", Some(5.0)), ("B", None), ("C", Some(f64::NAN))]
            .into_iter()
            .collect();
        let ranks = CrossSectionalRanker::default().rank(&raw, &universe(&["A", "B", "C", "D"]));
        assert_eq!(ranks.len(), 4);
        assert_eq!(ranks.get("A"), Some(1.0));
        assert_eq!(ranks.missing_count(), 3);
    }

    #[test]
    fn test_restricted_to_universe() {
        let raw: FactorScore = [("A", Some(5.0)), ("B", Some(1.0)), ("Z", Some(0.0))]
            .into_iter()
            .collect();
        let ranks = CrossSectionalRanker::default().rank(&raw, &universe(&["A", "B"]));
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks.get("B"), Some(1.0));
        assert_eq!(ranks.get("Z"), None);
    }

    #[test]
    fn test_rank_all_preserves_order() {
        let a = FactorScore::new("value");
        let b = FactorScore::new("quality");
        let ranked = CrossSectionalRanker::default().rank_all(&[a, b], &universe(&["A"]));
        let names: Vec<&str> = ranked.iter().map(FactorScore::name).collect();
        assert_eq!(names, vec!["value", "quality"]);
    }

    proptest! {
        #[test]
        fn prop_ranks_are_a_permutation(
            values in proptest::collection::vec(proptest::option::of(-100.0f64..100.0), 0..40),
            zero_based in any::<bool>(),
        ) {
            let ids: Vec<String> = (0..values.len()).map(|i| format!("S{i:03}")).collect();
            let raw: FactorScore = ids.iter().cloned().zip(values.iter().copied()).collect();
            let universe: Universe = ids.iter().cloned().collect();
            let config = RankConfig {
                origin: if zero_based { RankOrigin::Zero } else { RankOrigin::One },
            };

            let ranks = CrossSectionalRanker::new(config).rank(&raw, &universe);
            let present = values.iter().filter(|v| v.is_some()).count();
            let offset = usize::from(!zero_based);

            let mut got: Vec<usize> = ranks.present().map(|(_, r)| r as usize).collect();
            got.sort_unstable();
            let expected: Vec<usize> = (offset..present + offset).collect();
            prop_assert_eq!(got, expected);

            for (id, value) in ids.iter().zip(values.iter()) {
                prop_assert_eq!(ranks.get(id).is_some(), value.is_some());
            }
        }

        #[test]
        fn prop_rank_preserves_order(
            values in proptest::collection::vec(-100.0f64..100.0, 2..30),
        ) {
            let ids: Vec<String> = (0..values.len()).map(|i| format!("S{i:03}")).collect();
            let raw: FactorScore = ids
                .iter()
                .cloned()
                .zip(values.iter().map(|v| Some(*v)))
                .collect();
            let universe: Universe = ids.iter().cloned().collect();
            let ranks = CrossSectionalRanker::default().rank(&raw, &universe);

            for i in 0..ids.len() {
                for j in 0..ids.len() {
                    if values[i] < values[j] {
                        prop_assert!(ranks.get(&ids[i]) < ranks.get(&ids[j]));
                    }
                }
            }
        }
    }
}
