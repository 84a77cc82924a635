use serde::Serialize;

use crate::benchmark::{self, CohortFilter, PeerComparison};
use crate::dataset::{columns, CustomerId, DataContext, TableError};
use crate::error::EngineError;
use crate::recommend::{self, LoanPlan, PolicyVariant, Recommendation};
use crate::scoring::{self, Concept, ConceptScorer, RiskTier, ScoreVector};
use crate::simulate::{self, SimulationOutcome};
use crate::target::{self, TargetGap};

/// Published engagement scores below this value prompt an engagement nudge.
const LOW_ENGAGEMENT_BELOW: f64 = 0.5;

/// Indicator-driven advice booleans for the presentation layer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdviceFlags {
    pub has_active_loan: bool,
    pub missing_savings_account: bool,
    pub low_engagement: bool,
}

/// Facade binding the read-only data context to the per-customer operations.
pub struct ResilienceEngine {
    context: DataContext,
}

impl ResilienceEngine {
    pub fn new(context: DataContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &DataContext {
        &self.context
    }

    fn scorer(&self) -> ConceptScorer<'_> {
        ConceptScorer::new(
            self.context.stats(),
            self.context.definitions(),
            self.context.degenerate_policy(),
        )
    }

    fn concept_score(&self, id: &CustomerId, concept: Concept) -> Result<f64, EngineError> {
        self.context
            .scored_for(id)?
            .concept_score(concept)
            .ok_or_else(|| TableError::MissingColumn(concept.score_column().to_string()).into())
    }

    /// Recompute the full score vector from the customer's raw features.
    pub fn score_customer(&self, id: &CustomerId) -> Result<ScoreVector, EngineError> {
        let row = self.context.raw_for(id)?;
        self.scorer().score(row)
    }

    /// Risk tier for the customer's published resilience score.
    pub fn risk_for(&self, id: &CustomerId) -> Result<RiskTier, EngineError> {
        Ok(RiskTier::classify(
            self.context.scored_for(id)?.resilience_score,
        ))
    }

    /// Published concept scores sitting below their attention thresholds.
    pub fn attention_flags(&self, id: &CustomerId) -> Result<Vec<Concept>, EngineError> {
        Ok(scoring::shortfalls(
            &self.context.scored_for(id)?.concept_scores,
        ))
    }

    /// Loan, savings, and engagement advice flags from the customer's
    /// indicators.
    pub fn advice_flags(&self, id: &CustomerId) -> Result<AdviceFlags, EngineError> {
        let row = self.context.raw_for(id)?;
        let indicator =
            |name: &str| row.get(name).copied().unwrap_or(0.0) == 1.0;

        Ok(AdviceFlags {
            has_active_loan: indicator(columns::AUTO_LOAN_INDICATOR)
                || indicator(columns::HOUSING_LOAN_INDICATOR),
            missing_savings_account: !indicator(columns::SAVINGS_ACCOUNT_INDICATOR),
            low_engagement: self.concept_score(id, Concept::CustomerEngagement)?
                < LOW_ENGAGEMENT_BELOW,
        })
    }

    /// Compare the customer against peers sharing their location and segment,
    /// optionally narrowed to their banking group.
    ///
    /// A customer absent from the grouped table has no group to narrow by;
    /// the comparison then covers the full cohort and its echoed filter
    /// carries no group.
    pub fn benchmark(
        &self,
        id: &CustomerId,
        narrow_to_group: bool,
    ) -> Result<PeerComparison, EngineError> {
        let record = self.context.scored_for(id)?;
        let group = if narrow_to_group {
            self.context.group_for(id)
        } else {
            None
        };
        let filter = CohortFilter {
            location: record.location.clone(),
            segment: record.segment.clone(),
            group,
        };
        benchmark::compare(&self.context, &filter)
    }

    /// Required per-concept increase to reach a target resilience score.
    pub fn target_gap(&self, id: &CustomerId, target: f64) -> Result<TargetGap, EngineError> {
        let record = self.context.scored_for(id)?;
        target::gap(record.resilience_score, target, &record.concept_scores)
    }

    /// Loan and savings recommendation under the chosen policy variant.
    pub fn recommend_for(
        &self,
        id: &CustomerId,
        variant: PolicyVariant,
    ) -> Result<Recommendation, EngineError> {
        let financial_health = self.concept_score(id, Concept::FinancialHealth)?;
        let credit_reliability = self.concept_score(id, Concept::CreditReliability)?;
        let row = self.context.raw_for(id)?;
        let monthly_income = row
            .get(columns::MONTHLY_INCOME)
            .copied()
            .ok_or_else(|| TableError::MissingFeature(columns::MONTHLY_INCOME.to_string()))?;

        Ok(recommend::recommend(
            financial_health,
            credit_reliability,
            monthly_income,
            variant,
        ))
    }

    /// Rescore the customer as if they took the given loan.
    pub fn simulate_loan(
        &self,
        id: &CustomerId,
        plan: &LoanPlan,
    ) -> Result<SimulationOutcome, EngineError> {
        let row = self.context.raw_for(id)?;
        simulate::simulate(
            row,
            plan,
            self.context.stats(),
            self.context.definitions(),
            self.context.degenerate_policy(),
        )
    }

    /// Recommend under the given variant and immediately simulate uptake.
    pub fn plan_future_loan(
        &self,
        id: &CustomerId,
        variant: PolicyVariant,
    ) -> Result<(Recommendation, SimulationOutcome), EngineError> {
        let recommendation = self.recommend_for(id, variant)?;
        let outcome = self.simulate_loan(id, &recommendation.plan)?;
        Ok((recommendation, outcome))
    }
}
