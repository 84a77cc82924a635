use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::EngineError;
use crate::scoring::Concept;

const CONCEPT_COUNT: f64 = 4.0;

/// Outcome of comparing a current resilience score against a desired target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetGap {
    pub achieved: bool,
    pub delta: f64,
    pub per_concept_increase: f64,
    pub per_concept_targets: BTreeMap<Concept, f64>,
}

/// Split the remaining gap uniformly across the four concepts.
///
/// This is a simplifying policy, not a constrained optimization, and the
/// suggested targets are not clamped: a concept target can exceed 1.0.
pub fn gap(
    current: f64,
    target: f64,
    concept_scores: &BTreeMap<Concept, f64>,
) -> Result<TargetGap, EngineError> {
    if !(-1.0..=1.0).contains(&target) {
        return Err(EngineError::InvalidTargetScore { target });
    }

    if target <= current {
        return Ok(TargetGap {
            achieved: true,
            delta: 0.0,
            per_concept_increase: 0.0,
            per_concept_targets: BTreeMap::new(),
        });
    }

    let delta = target - current;
    let per_concept_increase = delta / CONCEPT_COUNT;
    let per_concept_targets = concept_scores
        .iter()
        .map(|(&concept, &score)| (concept, score + per_concept_increase))
        .collect();

    Ok(TargetGap {
        achieved: false,
        delta,
        per_concept_increase,
        per_concept_targets,
    })
}
