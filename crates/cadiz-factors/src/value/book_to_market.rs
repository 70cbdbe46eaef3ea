//! Book-to-market value factor.

use cadiz_traits::{Factor, Security};

/// Book-to-market value factor.
///
/// Computes total equity divided by market capitalization. Higher values
/// indicate stocks trading cheaply relative to their book value.
///
/// The value is missing when either input is missing or market cap is zero.
///
/// # Example
///
/// ```
/// use cadiz_factors::value::BookToMarket;
/// use cadiz_traits::{Factor, Security};
///
/// let mut security = Security::new("XOM");
/// security.total_equity = Some(50.0);
/// security.market_cap = Some(200.0);
/// assert_eq!(BookToMarket.compute(&security), Some(0.25));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BookToMarket;

impl Factor for BookToMarket {
    fn name(&self) -> &str {
        "book_to_market"
    }

    fn compute(&self, security: &Security) -> Option<f64> {
        match (security.total_equity, security.market_cap) {
            (Some(equity), Some(cap)) if cap != 0.0 => {
                Some(equity / cap).filter(|ratio| ratio.is_finite())
            }
            _ => None,
        }
    }

    fn lookback(&self) -> usize {
        // Point-in-time fundamentals only
        0
    }

    fn required_fields(&self) -> &[&str] {
        &["total_equity", "market_cap"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn security(equity: Option<f64>, cap: Option<f64>) -> Security {
        let mut security = Security::new("TEST");
        security.total_equity = equity;
        security.market_cap = cap;
        security
    }

    #[test]
    fn test_ratio() {
        let value = BookToMarket.compute(&security(Some(30.0), Some(120.0))).unwrap();
        assert_relative_eq!(value, 0.25);
    }

    #[test]
    fn test_negative_equity_is_kept() {
        let value = BookToMarket.compute(&security(Some(-10.0), Some(100.0))).unwrap();
        assert_relative_eq!(value, -0.1);
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(BookToMarket.compute(&security(None, Some(100.0))), None);
        assert_eq!(BookToMarket.compute(&security(Some(10.0), None)), None);
    }

    #[test]
    fn test_zero_market_cap_is_missing() {
        assert_eq!(BookToMarket.compute(&security(Some(10.0), Some(0.0))), None);
    }

    #[test]
    fn test_metadata() {
        assert_eq!(BookToMarket.name(), "book_to_market");
        assert_eq!(BookToMarket.lookback(), 0);
        assert_eq!(BookToMarket.required_fields(), &["total_equity", "market_cap"]);
    }
}
