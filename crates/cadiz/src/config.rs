//! Strategy configuration.
//!
//! Every section is defaulted, so an empty JSON object describes the
//! original small-cap strategy: book-to-market, operating profitability and
//! momentum ranks summed over NYSE/NASDAQ/AMEX small caps, allocated long
//! only at 1% per name with ±10% sector exposure.

use std::{collections::BTreeSet, fs, path::Path};

use cadiz_combine::RankConfig;
use cadiz_factors::{FactorKind, UniverseConfig, momentum::MomentumConfig};
use cadiz_optimize::AllocationConfig;
use cadiz_traits::{CadizError, Result};
use serde::{Deserialize, Serialize};

/// Complete configuration of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Universe eligibility rules
    pub universe: UniverseConfig,

    /// Momentum window
    pub momentum: MomentumConfig,

    /// Factors combined into the alpha, in order
    pub factors: Vec<FactorKind>,

    /// Rank origin
    pub ranking: RankConfig,

    /// Constraint limits and solver budget
    pub allocation: AllocationConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            universe: UniverseConfig::default(),
            momentum: MomentumConfig::default(),
            factors: FactorKind::ALL.to_vec(),
            ranking: RankConfig::default(),
            allocation: AllocationConfig::default(),
        }
    }
}

impl StrategyConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CadizError::InvalidConfig(format!("cannot parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            CadizError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CadizError::InvalidConfig(format!("cannot serialize config: {e}")))
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<()> {
        self.universe.validate()?;
        self.momentum.validate()?;
        self.allocation.validate()?;

        if self.factors.is_empty() {
            return Err(CadizError::InvalidConfig(
                "at least one factor must be configured".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for kind in &self.factors {
            if !seen.insert(kind) {
                return Err(CadizError::InvalidConfig(format!(
                    "factor '{}' is configured twice",
                    kind.name()
                )));
            }
        }
        Ok(())
    }
}
