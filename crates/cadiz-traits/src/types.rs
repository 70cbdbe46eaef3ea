//! Common types used throughout the Cadiz engine.
//!
//! Every per-cycle entity is rebuilt from scratch on each rebalance. Maps
//! and sets are ordered so that iteration, and therefore every downstream
//! computation, is deterministic for identical inputs.

use std::collections::{BTreeMap, BTreeSet};

use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use crate::{CadizError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A security identifier, typically a ticker like "AAPL".
pub type SecurityId = String;

/// A sector classification code (e.g. Morningstar's 101 for Basic Materials).
pub type SectorCode = i32;

/// Sector label per security.
pub type SectorMap = BTreeMap<SecurityId, SectorCode>;

/// Per-cycle attributes of a single security.
///
/// Any field may be absent in the source data; absence is represented as
/// `None` and is handled by the filters and factors rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    /// Unique identifier.
    pub id: SecurityId,
    /// Listing exchange code (e.g. "NYS", "NAS").
    #[serde(default)]
    pub exchange: Option<String>,
    /// Sector classification code.
    #[serde(default)]
    pub sector: Option<SectorCode>,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Total equity from the latest balance sheet.
    #[serde(default)]
    pub total_equity: Option<f64>,
    /// Operating income from the latest income statement.
    #[serde(default)]
    pub operating_income: Option<f64>,
    /// Interest expense from the latest income statement.
    #[serde(default)]
    pub interest_expense: Option<f64>,
    /// Externally computed tradability / liquidity eligibility.
    pub tradable: bool,
    /// Close prices, oldest first. Individual samples may be missing.
    #[serde(default)]
    pub closes: Vec<Option<f64>>,
}

impl Security {
    /// Creates a tradable security with no attributes set.
    pub fn new(id: impl Into<SecurityId>) -> Self {
        Self {
            id: id.into(),
            exchange: None,
            sector: None,
            market_cap: None,
            total_equity: None,
            operating_income: None,
            interest_expense: None,
            tradable: true,
            closes: Vec::new(),
        }
    }

    /// Returns the close sample at `index`, treating non-finite prices as missing.
    pub fn close_at(&self, index: usize) -> Option<f64> {
        self.closes
            .get(index)
            .copied()
            .flatten()
            .filter(|p| p.is_finite())
    }
}

/// Explicit input of one rebalance cycle.
///
/// The core never reads a clock or a calendar; the decision date and the
/// attribute snapshot arrive together here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleContext {
    /// The decision date.
    pub as_of: Date,
    /// Attribute snapshot as known on `as_of`.
    pub securities: Vec<Security>,
}

impl CycleContext {
    /// Creates a cycle context, rejecting duplicate security ids.
    pub fn new(as_of: Date, securities: Vec<Security>) -> Result<Self> {
        let ctx = Self { as_of, securities };
        ctx.validate()?;
        Ok(ctx)
    }

    /// Checks that every security id appears once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for security in &self.securities {
            if !seen.insert(security.id.as_str()) {
                return Err(CadizError::InvalidData(format!(
                    "duplicate security id '{}'",
                    security.id
                )));
            }
        }
        Ok(())
    }

    /// Returns the number of securities in the snapshot.
    pub fn len(&self) -> usize {
        self.securities.len()
    }

    /// Returns whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    /// Looks up a security by id.
    pub fn security(&self, id: &str) -> Option<&Security> {
        self.securities.iter().find(|s| s.id == id)
    }

    /// Returns the securities whose ids are members of `universe`, in id order.
    pub fn members<'a>(&'a self, universe: &Universe) -> Vec<&'a Security> {
        let mut members: Vec<&Security> = self
            .securities
            .iter()
            .filter(|s| universe.contains(&s.id))
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        members
    }

    /// Collects sector labels for the given ids. Ids without a sector are skipped.
    pub fn sector_map<'a>(&self, ids: impl IntoIterator<Item = &'a SecurityId>) -> SectorMap {
        let wanted: BTreeSet<&SecurityId> = ids.into_iter().collect();
        self.securities
            .iter()
            .filter(|s| wanted.contains(&s.id))
            .filter_map(|s| s.sector.map(|sector| (s.id.clone(), sector)))
            .collect()
    }
}

/// The set of securities eligible in the current cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref, From)]
pub struct Universe(BTreeSet<SecurityId>);

impl Universe {
    /// Creates an empty universe.
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a member.
    pub fn insert(&mut self, id: impl Into<SecurityId>) -> bool {
        self.0.insert(id.into())
    }
}

impl FromIterator<SecurityId> for Universe {
    fn from_iter<I: IntoIterator<Item = SecurityId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A named cross-section of factor values, one per security.
///
/// `None` marks a missing value. Non-finite inputs are stored as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    name: String,
    values: BTreeMap<SecurityId, Option<f64>>,
}

impl FactorScore {
    /// Creates an empty factor score.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Replaces the factor name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the factor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records the value for `id`.
    pub fn insert(&mut self, id: impl Into<SecurityId>, value: Option<f64>) {
        self.values
            .insert(id.into(), value.filter(|v| v.is_finite()));
    }

    /// Returns the value for `id`, or `None` if missing or unknown.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied().flatten()
    }

    /// Iterates over all recorded entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&SecurityId, Option<f64>)> {
        self.values.iter().map(|(id, v)| (id, *v))
    }

    /// Iterates over non-missing entries in id order.
    pub fn present(&self) -> impl Iterator<Item = (&SecurityId, f64)> {
        self.values.iter().filter_map(|(id, v)| v.map(|v| (id, v)))
    }

    /// Number of recorded entries, missing ones included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no entries are recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing entries.
    pub fn missing_count(&self) -> usize {
        self.values.values().filter(|v| v.is_none()).count()
    }
}

impl<K: Into<SecurityId>> FromIterator<(K, Option<f64>)> for FactorScore {
    fn from_iter<I: IntoIterator<Item = (K, Option<f64>)>>(iter: I) -> Self {
        let mut score = Self::new("");
        for (id, value) in iter {
            score.insert(id, value);
        }
        score
    }
}

/// Composite alpha per security. Only securities with a defined alpha appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, From)]
pub struct AlphaScore(BTreeMap<SecurityId, f64>);

impl AlphaScore {
    /// Creates an empty alpha score.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets the alpha for `id`.
    pub fn insert(&mut self, id: impl Into<SecurityId>, value: f64) {
        self.0.insert(id.into(), value);
    }
}

impl<K: Into<SecurityId>> FromIterator<(K, f64)> for AlphaScore {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Target portfolio weights as signed fractions of portfolio value.
///
/// Securities absent from the map receive no target; the execution side is
/// free to interpret that as "close the position".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, From)]
pub struct TargetWeights(BTreeMap<SecurityId, f64>);

impl TargetWeights {
    /// Creates an empty weight map.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets the weight for `id`.
    pub fn insert(&mut self, id: impl Into<SecurityId>, weight: f64) {
        self.0.insert(id.into(), weight);
    }

    /// Sum of absolute weights.
    pub fn gross(&self) -> f64 {
        self.0.values().map(|w| w.abs()).sum()
    }

    /// Sum of signed weights.
    pub fn net(&self) -> f64 {
        self.0.values().sum()
    }

    /// Weighted alpha `Σ alpha_i · w_i`; ids without alpha contribute zero.
    pub fn weighted_alpha(&self, alpha: &AlphaScore) -> f64 {
        self.0
            .iter()
            .map(|(id, w)| alpha.get(id).copied().unwrap_or(0.0) * w)
            .sum()
    }
}

impl<K: Into<SecurityId>> FromIterator<(K, f64)> for TargetWeights {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
