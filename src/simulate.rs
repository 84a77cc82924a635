//! What-if simulation of a hypothetical loan uptake.

use serde::Serialize;
use tracing::debug;

use crate::dataset::{columns, FeatureRow, PopulationStats};
use crate::error::EngineError;
use crate::recommend::LoanPlan;
use crate::scoring::{ConceptDefinitions, ConceptScorer, DegeneratePolicy, ScoreVector};

/// Top tier of the loan-behavior code; the modeled loan assumes on-time
/// repayment.
const BEST_LOAN_BEHAVIOR: f64 = 4.0;

/// Score movement from applying a hypothetical loan to a customer row.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub original: ScoreVector,
    pub adjusted: ScoreVector,
    pub boost: f64,
    pub new_resilience_score: f64,
}

/// Apply the plan to a clone of the row, rescore, and report the delta.
///
/// The adjusted row is rescored against the *same* population statistics and
/// min-max bounds as the original score, not a refreshed population; the
/// result is a directional estimate rather than a re-fit model.
pub fn simulate(
    row: &FeatureRow,
    plan: &LoanPlan,
    stats: &PopulationStats,
    definitions: &ConceptDefinitions,
    policy: DegeneratePolicy,
) -> Result<SimulationOutcome, EngineError> {
    let scorer = ConceptScorer::new(stats, definitions, policy);
    let original = scorer.score(row)?;
    let adjusted_row = adjust(row, plan);
    let adjusted = scorer.score(&adjusted_row)?;

    let boost = adjusted.resilience_scaled - original.resilience_scaled;
    let new_resilience_score = original.resilience_scaled + boost;
    debug!(boost, "simulated loan uptake");

    Ok(SimulationOutcome {
        original,
        adjusted,
        boost,
        new_resilience_score,
    })
}

fn adjust(row: &FeatureRow, plan: &LoanPlan) -> FeatureRow {
    let mut adjusted = row.clone();
    if plan.principal == 0.0 && plan.monthly_installment == 0.0 {
        // A no-op plan must leave the row untouched so the boost is exactly
        // zero.
        return adjusted;
    }

    *adjusted
        .entry(columns::TOTAL_BALANCE.to_string())
        .or_insert(0.0) += plan.principal;
    *adjusted
        .entry(columns::LOAN_AMOUNT.to_string())
        .or_insert(0.0) += plan.principal;
    *adjusted
        .entry(columns::CURRENT_BILLING.to_string())
        .or_insert(0.0) += plan.monthly_installment;
    adjusted.insert(columns::LOAN_BEHAVIOR_INDICATOR.to_string(), BEST_LOAN_BEHAVIOR);
    adjusted
}
