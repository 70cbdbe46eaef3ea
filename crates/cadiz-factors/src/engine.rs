//! Evaluation of an ordered factor list over the cycle's universe.

use std::collections::BTreeMap;
use std::fmt;

use cadiz_traits::{CycleContext, Factor, FactorScore, Result, Security, Universe};
use log::debug;
use rayon::prelude::*;

use crate::{momentum::MomentumConfig, registry::FactorKind};

/// Computes raw factor scores for every universe member.
///
/// Factors run in configuration order and each produces one [`FactorScore`]
/// keyed by security id. Securities are evaluated in parallel; results are
/// collected in id order, so the output does not depend on scheduling.
pub struct FactorEngine {
    factors: Vec<Box<dyn Factor>>,
}

impl FactorEngine {
    /// Creates an engine over the given factors.
    pub fn new(factors: Vec<Box<dyn Factor>>) -> Self {
        Self { factors }
    }

    /// Builds the engine from configured factor kinds.
    pub fn from_kinds(kinds: &[FactorKind], momentum: &MomentumConfig) -> Result<Self> {
        momentum.validate()?;
        Ok(Self::new(kinds.iter().map(|k| k.build(momentum)).collect()))
    }

    /// Names of the configured factors, in order.
    pub fn factor_names(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.name()).collect()
    }

    /// Number of configured factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Returns whether no factors are configured.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Longest close history any configured factor needs.
    pub fn max_lookback(&self) -> usize {
        self.factors.iter().map(|f| f.lookback()).max().unwrap_or(0)
    }

    /// Computes every factor for every member of `universe`.
    ///
    /// Universe ids without a security in the snapshot are recorded as missing.
    pub fn compute(&self, ctx: &CycleContext, universe: &Universe) -> Vec<FactorScore> {
        let index: BTreeMap<&str, &Security> = ctx
            .securities
            .iter()
            .map(|s| (s.id.as_str(), s))
            .collect();
        let members: Vec<(&String, Option<&Security>)> = universe
            .iter()
            .map(|id| (id, index.get(id.as_str()).copied()))
            .collect();

        self.factors
            .iter()
            .map(|factor| {
                let values: Vec<(String, Option<f64>)> = members
                    .par_iter()
                    .map(|(id, security)| ((*id).clone(), security.and_then(|s| factor.compute(s))))
                    .collect();

                let score = values
                    .into_iter()
                    .collect::<FactorScore>()
                    .with_name(factor.name());
                debug!(
                    "factor {}: {} present, {} missing",
                    score.name(),
                    score.len() - score.missing_count(),
                    score.missing_count()
                );
                score
            })
            .collect()
    }
}

impl fmt::Debug for FactorEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorEngine")
            .field("factors", &self.factor_names())
            .finish()
    }
}
