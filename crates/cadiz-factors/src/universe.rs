//! Tradable-universe selection for one rebalance cycle.

use std::collections::BTreeSet;

use cadiz_traits::{
    CadizError, CycleContext, Factor, Result, SectorCode, Security, Universe,
    stats::percentile_positions,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::momentum::{LaggedMomentum, MomentumConfig};

/// Half-open market-cap percentile band `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    /// Inclusive lower percentile
    pub lower: f64,
    /// Exclusive upper percentile
    pub upper: f64,
}

impl PercentileBand {
    /// Creates a band.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Returns whether `percentile` falls inside the band.
    #[must_use]
    pub fn contains(&self, percentile: f64) -> bool {
        self.lower <= percentile && percentile < self.upper
    }

    fn validate(&self) -> Result<()> {
        let in_range = |p: f64| p.is_finite() && (0.0..=100.0).contains(&p);
        if !in_range(self.lower) || !in_range(self.upper) || self.lower >= self.upper {
            return Err(CadizError::InvalidConfig(format!(
                "market cap band must satisfy 0 <= lower < upper <= 100, got [{}, {})",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Eligibility rules for the tradable universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Accepted listing exchange codes
    pub exchanges: Vec<String>,

    /// Market-cap percentile band; `None` disables banding
    pub market_cap_band: Option<PercentileBand>,

    /// Sector allow-list; `None` accepts every sector
    pub sectors: Option<Vec<SectorCode>>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            exchanges: ["NYSE", "NYS", "NAS", "ASE"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            market_cap_band: Some(PercentileBand::new(0.0, 50.0)),
            sectors: None,
        }
    }
}

impl UniverseConfig {
    /// Checks the allow-lists and the band.
    pub fn validate(&self) -> Result<()> {
        if self.exchanges.is_empty() {
            return Err(CadizError::InvalidConfig(
                "exchange allow-list must not be empty".into(),
            ));
        }
        if let Some(band) = &self.market_cap_band {
            band.validate()?;
        }
        if matches!(&self.sectors, Some(sectors) if sectors.is_empty()) {
            return Err(CadizError::InvalidConfig(
                "sector allow-list must not be empty when present".into(),
            ));
        }
        Ok(())
    }
}

/// Reduces the cycle's securities to the tradable universe.
///
/// A security is kept when it is flagged tradable, listed on an accepted
/// exchange, has every attribute the factors need, and passes the optional
/// market-cap band and sector allow-list. Percentiles are computed over the
/// securities that pass the first three checks.
#[derive(Debug, Clone)]
pub struct UniverseFilter {
    config: UniverseConfig,
    momentum: LaggedMomentum,
}

impl UniverseFilter {
    /// Creates a filter, validating both configurations.
    pub fn new(config: UniverseConfig, momentum: MomentumConfig) -> Result<Self> {
        config.validate()?;
        momentum.validate()?;
        Ok(Self {
            config,
            momentum: LaggedMomentum::new(momentum),
        })
    }

    /// Returns the filter configuration.
    #[must_use]
    pub const fn config(&self) -> &UniverseConfig {
        &self.config
    }

    /// Selects the universe. An empty result is valid.
    pub fn filter(&self, ctx: &CycleContext) -> Universe {
        let eligible: Vec<&Security> = ctx
            .securities
            .iter()
            .filter(|s| s.tradable)
            .filter(|s| self.listed_on_accepted_exchange(s))
            .filter(|s| self.is_complete(s))
            .collect();
        debug!(
            "universe: {} of {} securities eligible before banding",
            eligible.len(),
            ctx.len()
        );

        let banded: Vec<&Security> = match &self.config.market_cap_band {
            Some(band) => {
                let caps = eligible
                    .iter()
                    .copied()
                    .filter_map(|s| s.market_cap.map(|cap| (s.id.as_str(), cap)));
                let in_band: BTreeSet<&str> = percentile_positions(caps)
                    .into_iter()
                    .filter(|(_, pct)| band.contains(*pct))
                    .map(|(id, _)| id)
                    .collect();
                eligible
                    .into_iter()
                    .filter(|s| in_band.contains(&s.id.as_str()))
                    .collect()
            }
            None => eligible,
        };

        let universe: Universe = banded
            .into_iter()
            .filter(|s| match (&self.config.sectors, s.sector) {
                (Some(allowed), Some(sector)) => allowed.contains(&sector),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .map(|s| s.id.clone())
            .collect();
        debug!("universe: {} members", universe.len());
        universe
    }

    fn listed_on_accepted_exchange(&self, security: &Security) -> bool {
        security
            .exchange
            .as_ref()
            .is_some_and(|ex| self.config.exchanges.iter().any(|allowed| allowed == ex))
    }

    fn is_complete(&self, security: &Security) -> bool {
        security.total_equity.is_some_and(f64::is_finite)
            && security.market_cap.is_some_and(f64::is_finite)
            && security.operating_income.is_some_and(f64::is_finite)
            && security.interest_expense.is_some_and(f64::is_finite)
            && security.sector.is_some()
            && self.momentum.compute(security).is_some()
    }
}
