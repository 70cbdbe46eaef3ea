//! Factor registry for discovering and constructing available factors.
//!
//! This module provides metadata and name lookup for every factor in the
//! cadiz-factors library, and builds factor instances from configuration.

use std::str::FromStr;

use cadiz_traits::{CadizError, Factor, Result};
use serde::{Deserialize, Serialize};

use crate::{
    momentum::{LaggedMomentum, MomentumConfig},
    quality::OperatingProfitability,
    value::BookToMarket,
};

/// Factor category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorCategory {
    /// Price momentum factors
    Momentum,
    /// Valuation factors
    Value,
    /// Profitability and quality factors
    Quality,
}

impl FactorCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Momentum => "Price momentum and trend-following factors",
            Self::Value => "Valuation metrics comparing fundamentals to price",
            Self::Quality => "Profitability and operational efficiency metrics",
        }
    }
}

/// The factors a strategy can select, in configuration form.
///
/// Serializes as the canonical name and deserializes from the canonical
/// name or any alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FactorKind {
    /// Lagged price momentum.
    Momentum,
    /// Total equity over market cap.
    BookToMarket,
    /// Operating income net of interest over total equity.
    OperatingProfitability,
}

impl FactorKind {
    /// All factor kinds, in the order the strategy combines them by default.
    pub const ALL: [Self; 3] = [Self::BookToMarket, Self::OperatingProfitability, Self::Momentum];

    /// Canonical factor name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Momentum => "momentum",
            Self::BookToMarket => "book_to_market",
            Self::OperatingProfitability => "operating_profitability",
        }
    }

    /// Alternative names accepted by [`FactorKind::from_name`].
    #[must_use]
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Momentum => &["umd", "mom", "momentum_12_1"],
            Self::BookToMarket => &["bm", "btm", "value"],
            Self::OperatingProfitability => &["op", "profitability", "quality"],
        }
    }

    /// Resolve a factor name or one of its aliases.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.aliases().contains(&name))
            .ok_or_else(|| {
                CadizError::InvalidConfig(format!(
                    "Unknown factor: '{name}'. Use 'cadiz factors' to list available factors."
                ))
            })
    }

    /// Build the factor instance.
    #[must_use]
    pub fn build(&self, momentum: &MomentumConfig) -> Box<dyn Factor> {
        match self {
            Self::Momentum => Box::new(LaggedMomentum::new(*momentum)),
            Self::BookToMarket => Box::new(BookToMarket),
            Self::OperatingProfitability => Box::new(OperatingProfitability),
        }
    }

    /// Registry metadata for this kind.
    #[must_use]
    pub const fn info(&self) -> FactorInfo {
        match self {
            Self::Momentum => FactorInfo {
                kind: Self::Momentum,
                name: "momentum",
                category: FactorCategory::Momentum,
                description: "11-month return skipping the most recent month",
                typical_lookback: 252,
                requires_fundamentals: false,
            },
            Self::BookToMarket => FactorInfo {
                kind: Self::BookToMarket,
                name: "book_to_market",
                category: FactorCategory::Value,
                description: "Total equity relative to market cap",
                typical_lookback: 0,
                requires_fundamentals: true,
            },
            Self::OperatingProfitability => FactorInfo {
                kind: Self::OperatingProfitability,
                name: "operating_profitability",
                category: FactorCategory::Quality,
                description: "Operating income less interest expense, relative to total equity",
                typical_lookback: 0,
                requires_fundamentals: true,
            },
        }
    }
}

impl FromStr for FactorKind {
    type Err = CadizError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for FactorKind {
    type Error = CadizError;

    fn try_from(name: String) -> Result<Self> {
        Self::from_name(&name)
    }
}

/// Metadata about a factor.
#[derive(Debug, Clone, Serialize)]
pub struct FactorInfo {
    /// Factor kind
    pub kind: FactorKind,

    /// Unique identifier for the factor
    pub name: &'static str,

    /// Category classification
    pub category: FactorCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Typical lookback period in periods
    pub typical_lookback: usize,

    /// Whether the factor requires fundamental data
    pub requires_fundamentals: bool,
}

/// Get information about all available factors.
#[must_use]
pub fn available_factors() -> Vec<FactorInfo> {
    [
        FactorKind::Momentum,
        FactorKind::BookToMarket,
        FactorKind::OperatingProfitability,
    ]
    .iter()
    .map(FactorKind::info)
    .collect()
}

/// Get all factors in a specific category.
#[must_use]
pub fn factors_by_category(category: &FactorCategory) -> Vec<FactorInfo> {
    available_factors()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific factor by name or alias.
#[must_use]
pub fn get_factor_info(name: &str) -> Option<FactorInfo> {
    FactorKind::from_name(name).ok().map(|kind| kind.info())
}
