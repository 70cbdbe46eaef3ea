//! Portfolio constraints and their verification.

use std::collections::BTreeMap;

use cadiz_traits::{CadizError, Result, SectorCode, SectorMap, TargetWeights};
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` for a sector's net exposure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureBand {
    /// Lowest allowed net weight
    pub min: f64,
    /// Highest allowed net weight
    pub max: f64,
}

impl ExposureBand {
    /// Creates a band.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Symmetric band `[-width, width]`.
    #[must_use]
    pub const fn symmetric(width: f64) -> Self {
        Self::new(-width, width)
    }

    fn validate(&self, label: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CadizError::InvalidConfig(format!(
                "{label} exposure band must be finite"
            )));
        }
        if self.min > self.max {
            return Err(CadizError::InvalidConfig(format!(
                "{label} exposure band has min {} above max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// One restriction on the target weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// `Σ|w_i| ≤ max`
    GrossLeverageBound {
        /// Largest gross exposure
        max: f64,
    },
    /// `-max_short ≤ w_i ≤ max_long` for every security
    PositionBox {
        /// Largest short position, as a positive fraction
        max_short: f64,
        /// Largest long position
        max_long: f64,
    },
    /// Net exposure of every sector present stays inside its band
    SectorExposureBound {
        /// Band used for sectors without an override
        default: ExposureBand,
        /// Per-sector bands
        #[serde(default)]
        overrides: BTreeMap<SectorCode, ExposureBand>,
    },
    /// `Σ w_i = 0`
    DollarNeutral,
}

impl Constraint {
    /// Short tag used in logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GrossLeverageBound { .. } => "gross_leverage",
            Self::PositionBox { .. } => "position_box",
            Self::SectorExposureBound { .. } => "sector_exposure",
            Self::DollarNeutral => "dollar_neutral",
        }
    }

    /// Rejects negative limits, inverted bands and non-finite values.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::GrossLeverageBound { max } => non_negative("gross leverage", *max),
            Self::PositionBox {
                max_short,
                max_long,
            } => {
                non_negative("max short", *max_short)?;
                non_negative("max long", *max_long)
            }
            Self::SectorExposureBound { default, overrides } => {
                default.validate("default sector")?;
                for (sector, band) in overrides {
                    band.validate(&format!("sector {sector}"))?;
                }
                Ok(())
            }
            Self::DollarNeutral => Ok(()),
        }
    }

    /// Band applied to `sector`, if this is a sector constraint.
    #[must_use]
    pub fn sector_band(&self, sector: SectorCode) -> Option<ExposureBand> {
        match self {
            Self::SectorExposureBound { default, overrides } => {
                Some(overrides.get(&sector).copied().unwrap_or(*default))
            }
            _ => None,
        }
    }

    /// Describes how `weights` break this constraint, if they do.
    ///
    /// A bound `b` is met when the violation is at most `tolerance · max(1, |b|)`.
    #[must_use]
    pub fn violation(
        &self,
        weights: &TargetWeights,
        sectors: &SectorMap,
        tolerance: f64,
    ) -> Option<String> {
        let slack = |bound: f64| tolerance * bound.abs().max(1.0);
        match self {
            Self::GrossLeverageBound { max } => {
                let gross = weights.gross();
                (gross - max > slack(*max))
                    .then(|| format!("gross exposure {gross:.9} exceeds {max}"))
            }
            Self::PositionBox {
                max_short,
                max_long,
            } => weights.iter().find_map(|(id, &w)| {
                if w - max_long > slack(*max_long) {
                    Some(format!("{id} long {w:.9} exceeds {max_long}"))
                } else if -w - max_short > slack(*max_short) {
                    Some(format!("{id} short {w:.9} exceeds {max_short}"))
                } else {
                    None
                }
            }),
            Self::SectorExposureBound { .. } => {
                let mut net: BTreeMap<SectorCode, f64> = BTreeMap::new();
                for (id, &w) in weights.iter() {
                    if let Some(sector) = sectors.get(id) {
                        *net.entry(*sector).or_insert(0.0) += w;
                    }
                }
                net.into_iter().find_map(|(sector, exposure)| {
                    let band = self.sector_band(sector)?;
                    (band.min - exposure > slack(band.min) || exposure - band.max > slack(band.max))
                        .then(|| {
                            format!(
                                "sector {sector} exposure {exposure:.9} outside [{}, {}]",
                                band.min, band.max
                            )
                        })
                })
            }
            Self::DollarNeutral => {
                let net = weights.net();
                (net.abs() > tolerance).then(|| format!("net exposure {net:.9} is not zero"))
            }
        }
    }
}

fn non_negative(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CadizError::InvalidConfig(format!(
            "{label} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}
