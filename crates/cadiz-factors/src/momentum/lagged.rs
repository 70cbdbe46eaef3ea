//! Lagged price momentum: long-horizon return that skips the most recent month.

use cadiz_traits::{CadizError, Factor, Result, Security};
use serde::{Deserialize, Serialize};

/// Shortest accepted window, in periods.
pub const MIN_WINDOW: usize = 21;

/// Configuration for lagged momentum.
///
/// With the defaults the factor measures the return over roughly eleven
/// months, ending one month before the decision date, which sidesteps the
/// short-term reversal effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Number of close samples in the window (default: 252 ≈ 12 months)
    pub window_length: usize,

    /// Number of most recent samples excluded at the end (default: 21 ≈ 1 month)
    pub skip_recent: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            window_length: 252,
            skip_recent: 21,
        }
    }
}

impl MomentumConfig {
    /// Checks the window and gap against each other.
    pub fn validate(&self) -> Result<()> {
        if self.window_length < MIN_WINDOW {
            return Err(CadizError::InvalidConfig(format!(
                "momentum window_length must be at least {MIN_WINDOW}, got {}",
                self.window_length
            )));
        }
        if self.skip_recent == 0 || self.skip_recent >= self.window_length {
            return Err(CadizError::InvalidConfig(format!(
                "momentum skip_recent must be in 1..{}, got {}",
                self.window_length, self.skip_recent
            )));
        }
        Ok(())
    }
}

/// Lagged momentum factor.
///
/// Over the last `window_length` closes, the score is the price at offset
/// `window_length - skip_recent` from the window start divided by the price
/// at the window start. The ratio form makes the score invariant to a
/// uniform rescaling of prices.
///
/// The score is missing when the history is shorter than the window, when
/// either sample is missing, or when the start price is not positive.
///
/// # Example
///
/// ```
/// use cadiz_factors::momentum::{LaggedMomentum, MomentumConfig};
/// use cadiz_traits::{Factor, Security};
///
/// let momentum = LaggedMomentum::new(MomentumConfig { window_length: 22, skip_recent: 21 });
/// let mut security = Security::new("AAPL");
/// security.closes = (1..=22).map(|p| Some(p as f64)).collect();
/// assert_eq!(momentum.compute(&security), Some(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct LaggedMomentum {
    config: MomentumConfig,
}

impl LaggedMomentum {
    /// Create a new lagged momentum factor with the given configuration.
    #[must_use]
    pub const fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Get the window length.
    #[must_use]
    pub const fn window_length(&self) -> usize {
        self.config.window_length
    }

    /// Get the number of most recent samples skipped.
    #[must_use]
    pub const fn skip_recent(&self) -> usize {
        self.config.skip_recent
    }

    /// Get the span between the two sampled prices.
    #[must_use]
    pub const fn effective_span(&self) -> usize {
        self.config.window_length - self.config.skip_recent
    }
}

impl Default for LaggedMomentum {
    fn default() -> Self {
        Self::new(MomentumConfig::default())
    }
}

impl Factor for LaggedMomentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn compute(&self, security: &Security) -> Option<f64> {
        let window = self.config.window_length;
        let n = security.closes.len();
        if n < window || self.config.skip_recent == 0 || self.config.skip_recent >= window {
            return None;
        }

        let start_idx = n - window;
        let end_idx = start_idx + self.effective_span();

        let start_price = security.close_at(start_idx)?;
        let end_price = security.close_at(end_idx)?;

        if start_price <= 0.0 {
            return None;
        }

        Some(end_price / start_price)
    }

    fn lookback(&self) -> usize {
        self.config.window_length
    }

    fn required_fields(&self) -> &[&str] {
        &["closes"]
    }
}
