//! Factor trait for per-security raw scores.
//!
//! A factor maps one security's attributes to a raw value, or to `None` when
//! the inputs it needs are absent or degenerate (for example a zero
//! denominator). Cross-sectional work such as ranking happens downstream.

use crate::Security;

/// A raw cross-sectional factor.
///
/// Implementations must be thread-safe (`Send + Sync`) so the engine can
/// evaluate securities in parallel.
///
/// # Example
///
/// ```
/// use cadiz_traits::{Factor, Security};
///
/// struct Size;
///
/// impl Factor for Size {
///     fn name(&self) -> &str {
///         "size"
///     }
///
///     fn compute(&self, security: &Security) -> Option<f64> {
///         security.market_cap
///     }
///
///     fn lookback(&self) -> usize {
///         0
///     }
///
///     fn required_fields(&self) -> &[&str] {
///         &["market_cap"]
///     }
/// }
///
/// let mut security = Security::new("AAPL");
/// security.market_cap = Some(3.0e12);
/// assert_eq!(Size.compute(&security), Some(3.0e12));
/// ```
pub trait Factor: Send + Sync {
    /// Returns the name of this factor.
    ///
    /// The name is used as the key of the produced `FactorScore` and in logs
    /// and reports, so it should be unique within a strategy.
    fn name(&self) -> &str;

    /// Computes the raw factor value for one security.
    ///
    /// Returns `None` when a required input is missing or the value is
    /// undefined. Missing data is never an error.
    fn compute(&self, security: &Security) -> Option<f64>;

    /// Returns the number of close samples this factor needs.
    ///
    /// Fundamental ratios use point-in-time snapshots and return 0.
    fn lookback(&self) -> usize;

    /// Returns the security fields this factor reads.
    fn required_fields(&self) -> &[&str];
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestFactor {
        name: String,
        lookback: usize,
    }

    impl Factor for TestFactor {
        fn name(&self) -> &str {
            &self.name
        }

        fn compute(&self, security: &Security) -> Option<f64> {
            security.close_at(self.lookback.saturating_sub(1))
        }

        fn lookback(&self) -> usize {
            self.lookback
        }

        fn required_fields(&self) -> &[&str] {
            &["closes"]
        }
    }

    #[test]
    fn test_factor_name() {
        let factor = TestFactor {
            name: "test_factor".to_string(),
            lookback: 2,
        };
        assert_eq!(factor.name(), "test_factor");
        assert_eq!(factor.lookback(), 2);
        assert_eq!(factor.required_fields(), &["closes"]);
    }

    #[test]
    fn test_factor_compute_missing() {
        let factor = TestFactor {
            name: "test".to_string(),
            lookback: 3,
        };
        let mut security = Security::new("AAPL");
        security.closes = vec![Some(1.0), Some(2.0)];
        assert_eq!(factor.compute(&security), None);

        security.closes.push(Some(3.0));
        assert_eq!(factor.compute(&security), Some(3.0));
    }

    #[test]
    fn test_factor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn Factor>>();
    }
}
