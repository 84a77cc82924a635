//! Standardization and aggregation pipeline turning raw behavioral features
//! into concept scores and a single resilience score.

mod concepts;
mod risk;

pub use concepts::{Concept, ConceptDefinitions};
pub use risk::{RiskTier, HIGH_RISK_BELOW, LOW_RISK_FROM};

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::dataset::{FeatureRow, FeatureStats, PopulationStats, TableError};
use crate::error::EngineError;

/// How to treat a feature whose population variance is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Fail the whole score, surfacing the offending feature.
    #[default]
    Fail,
    /// Drop the feature from its concept's mean and keep going.
    Skip,
}

impl DegeneratePolicy {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail" => Some(DegeneratePolicy::Fail),
            "skip" => Some(DegeneratePolicy::Skip),
            _ => None,
        }
    }
}

/// Four concept scores plus the raw and rescaled resilience score.
///
/// The raw resilience score is always the unweighted mean of the four concept
/// scores; the scaled value maps it into the published [0, 1] range.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreVector {
    pub concepts: BTreeMap<Concept, f64>,
    pub resilience_raw: f64,
    pub resilience_scaled: f64,
}

/// Stateless scorer applying the z-score/mean pipeline to one feature row.
pub struct ConceptScorer<'a> {
    stats: &'a PopulationStats,
    definitions: &'a ConceptDefinitions,
    policy: DegeneratePolicy,
}

impl<'a> ConceptScorer<'a> {
    pub fn new(
        stats: &'a PopulationStats,
        definitions: &'a ConceptDefinitions,
        policy: DegeneratePolicy,
    ) -> Self {
        Self {
            stats,
            definitions,
            policy,
        }
    }

    pub fn score(&self, row: &FeatureRow) -> Result<ScoreVector, EngineError> {
        let concepts =
            raw_concept_scores(row, self.definitions, self.stats.features(), self.policy)?;
        let resilience_raw = concepts.values().sum::<f64>() / concepts.len() as f64;
        let resilience_scaled = self.stats.rescale(resilience_raw)?;
        Ok(ScoreVector {
            concepts,
            resilience_raw,
            resilience_scaled,
        })
    }
}

/// Z-score each concept feature against the population, then average within
/// the concept. All arithmetic stays in double precision; no rounding happens
/// before display.
pub(crate) fn raw_concept_scores(
    row: &FeatureRow,
    definitions: &ConceptDefinitions,
    feature_stats: &BTreeMap<String, FeatureStats>,
    policy: DegeneratePolicy,
) -> Result<BTreeMap<Concept, f64>, EngineError> {
    let mut concepts = BTreeMap::new();
    for concept in Concept::ordered() {
        let mut sum = 0.0;
        let mut used = 0usize;
        for name in definitions.features_for(concept) {
            let stats = feature_stats
                .get(name)
                .ok_or_else(|| TableError::MissingFeature(name.clone()))?;
            if stats.std_dev == 0.0 {
                match policy {
                    DegeneratePolicy::Fail => {
                        return Err(EngineError::DegenerateFeature {
                            feature: name.clone(),
                        })
                    }
                    DegeneratePolicy::Skip => {
                        warn!(feature = %name, "skipping zero-variance feature");
                        continue;
                    }
                }
            }
            let value = row
                .get(name)
                .ok_or_else(|| TableError::MissingFeature(name.clone()))?;
            sum += (value - stats.mean) / stats.std_dev;
            used += 1;
        }
        if used == 0 {
            return Err(EngineError::UnscorableConcept {
                concept: concept.label().to_string(),
            });
        }
        concepts.insert(concept, sum / used as f64);
    }
    Ok(concepts)
}

/// Raw (pre-scaling) resilience score: the unweighted mean of the concepts.
pub(crate) fn raw_resilience(
    row: &FeatureRow,
    definitions: &ConceptDefinitions,
    feature_stats: &BTreeMap<String, FeatureStats>,
    policy: DegeneratePolicy,
) -> Result<f64, EngineError> {
    let concepts = raw_concept_scores(row, definitions, feature_stats, policy)?;
    Ok(concepts.values().sum::<f64>() / concepts.len() as f64)
}

/// Attention threshold below which a published concept score is flagged.
const fn attention_threshold(concept: Concept) -> f64 {
    match concept {
        Concept::FinancialHealth => 0.3,
        Concept::CreditReliability => 0.4,
        Concept::CustomerEngagement => 0.5,
        Concept::SocioeconomicStability => 0.6,
    }
}

/// Concepts whose published scores fall below their attention thresholds.
pub fn shortfalls(concept_scores: &BTreeMap<Concept, f64>) -> Vec<Concept> {
    Concept::ordered()
        .into_iter()
        .filter(|concept| {
            concept_scores
                .get(concept)
                .is_some_and(|score| *score < attention_threshold(*concept))
        })
        .collect()
}
