//! Ordering statistics shared by the universe filter and the ranker.
//!
//! Both percentile banding and cross-sectional ranking need the same
//! deterministic ascending order: by value, then by key for ties.

use std::cmp::Ordering;

/// Sorts entries ascending by value, breaking ties by ascending key, and
/// returns each key with its zero-based position.
///
/// Non-finite values are dropped and receive no position.
///
/// # Examples
///
/// ```
/// use cadiz_traits::stats::ascending_positions;
///
/// let ranked = ascending_positions(vec![("b", 2.0), ("a", 2.0), ("c", 1.0)]);
/// assert_eq!(ranked, vec![("c", 0), ("a", 1), ("b", 2)]);
/// ```
pub fn ascending_positions<K: Ord>(entries: impl IntoIterator<Item = (K, f64)>) -> Vec<(K, usize)> {
    let mut finite: Vec<(K, f64)> = entries
        .into_iter()
        .filter(|(_, v)| v.is_finite())
        .collect();
    finite.sort_by(|(ka, va), (kb, vb)| match va.total_cmp(vb) {
        Ordering::Equal => ka.cmp(kb),
        other => other,
    });
    finite
        .into_iter()
        .enumerate()
        .map(|(pos, (key, _))| (key, pos))
        .collect()
}

/// Maps entries to percentiles in `[0, 100)` by ascending position.
///
/// The k-th smallest of n values (zero-based) gets `100 · k / n`.
///
/// # Edge Cases
///
/// - Empty input: returns an empty vector
/// - Single value: returns percentile 0
/// - Non-finite values are dropped
///
/// # Examples
///
/// ```
/// use cadiz_traits::stats::percentile_positions;
///
/// let pct = percentile_positions(vec![("a", 10.0), ("b", 30.0), ("c", 20.0), ("d", 40.0)]);
/// assert_eq!(pct, vec![("a", 0.0), ("c", 25.0), ("b", 50.0), ("d", 75.0)]);
/// ```
pub fn percentile_positions<K: Ord>(entries: impl IntoIterator<Item = (K, f64)>) -> Vec<(K, f64)> {
    let ranked = ascending_positions(entries);
    let n = ranked.len() as f64;
    ranked
        .into_iter()
        .map(|(key, pos)| (key, 100.0 * pos as f64 / n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_basic() {
        let ranked = ascending_positions(vec![("x", 3.0), ("y", 1.0), ("z", 2.0)]);
        assert_eq!(ranked, vec![("y", 0), ("z", 1), ("x", 2)]);
    }

    #[test]
    fn test_positions_ties_by_key() {
        let ranked = ascending_positions(vec![("d", 1.0), ("b", 1.0), ("c", 1.0), ("a", 0.0)]);
        assert_eq!(ranked, vec![("a", 0), ("b", 1), ("c", 2), ("d", 3)]);
    }

    #[test]
    fn test_positions_drop_non_finite() {
        let ranked = ascending_positions(vec![("a", f64::NAN), ("b", 1.0), ("c", f64::INFINITY)]);
        assert_eq!(ranked, vec![("b", 0)]);
    }

    #[test]
    fn test_positions_empty() {
        let ranked = ascending_positions(Vec::<(&str, f64)>::new());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_positions_negative_values() {
        let ranked = ascending_positions(vec![("a", -1.0), ("b", -5.0), ("c", 0.0)]);
        assert_eq!(ranked, vec![("b", 0), ("a", 1), ("c", 2)]);
    }

    #[test]
    fn test_percentiles_below_hundred() {
        let entries: Vec<(usize, f64)> = (0..7).map(|i| (i, i as f64)).collect();
        let pct = percentile_positions(entries);
        assert_eq!(pct.len(), 7);
        assert_eq!(pct[0].1, 0.0);
        assert!(pct.iter().all(|(_, p)| *p >= 0.0 && *p < 100.0));
    }

    #[test]
    fn test_percentile_single_value() {
        let pct = percentile_positions(vec![("only", 5.0)]);
        assert_eq!(pct, vec![("only", 0.0)]);
    }
}
