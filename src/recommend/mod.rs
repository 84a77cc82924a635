//! Tiered loan/savings policy selection, loan sizing, and affordability
//! capping.

mod amortize;

pub use amortize::{installment, max_principal};

use serde::Serialize;
use tracing::debug;

/// Fixed annual interest rate applied to recommended loans.
pub const ANNUAL_RATE: f64 = 0.06;
/// Installments above this share of monthly income trigger re-derivation of
/// the principal.
pub const AFFORDABILITY_CAP: f64 = 0.20;

/// Which policy table drives a recommendation.
///
/// The platform historically carried two: score-driven tiers and a fixed
/// fallback used by the future-loan planning path. Callers pick one
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyVariant {
    #[default]
    Tiered,
    Default,
}

/// Tier-selected loan and savings parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecommendationPolicy {
    pub loan_pct: f64,
    pub loan_duration_years: u32,
    pub savings_pct: f64,
    pub savings_target_months: u32,
}

/// Fixed parameters used by the future-loan planning path.
pub const DEFAULT_POLICY: RecommendationPolicy = RecommendationPolicy {
    loan_pct: 0.15,
    loan_duration_years: 5,
    savings_pct: 0.10,
    savings_target_months: 3,
};

/// Sized loan with its amortized monthly installment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanPlan {
    pub principal: f64,
    pub annual_rate: f64,
    pub duration_years: u32,
    pub monthly_installment: f64,
}

/// Full recommendation handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub policy: RecommendationPolicy,
    /// Income-sized principal before the affordability cap, rounded to tens.
    pub recommended_principal: f64,
    /// Final plan; differs from `recommended_principal` when `capped`.
    pub plan: LoanPlan,
    pub capped: bool,
    pub monthly_savings: f64,
    pub savings_target_amount: f64,
}

/// One row of an ordered threshold table; an exclusive bound admits only
/// scores strictly above it.
#[derive(Debug, Clone, Copy)]
struct TierRow {
    threshold: f64,
    exclusive: bool,
    pct: f64,
    periods: u32,
}

impl TierRow {
    fn admits(self, score: f64) -> bool {
        if self.exclusive {
            score > self.threshold
        } else {
            score >= self.threshold
        }
    }
}

// Loan share of income and duration, keyed on the financial-health score.
const LOAN_TIERS: [TierRow; 3] = [
    TierRow {
        threshold: 0.75,
        exclusive: true,
        pct: 0.20,
        periods: 3,
    },
    TierRow {
        threshold: 0.5,
        exclusive: false,
        pct: 0.15,
        periods: 5,
    },
    TierRow {
        threshold: f64::NEG_INFINITY,
        exclusive: false,
        pct: 0.10,
        periods: 7,
    },
];

// Savings share of income and target months, keyed on the credit-reliability
// score.
const SAVINGS_TIERS: [TierRow; 3] = [
    TierRow {
        threshold: 0.75,
        exclusive: true,
        pct: 0.15,
        periods: 3,
    },
    TierRow {
        threshold: 0.5,
        exclusive: false,
        pct: 0.20,
        periods: 6,
    },
    TierRow {
        threshold: f64::NEG_INFINITY,
        exclusive: false,
        pct: 0.25,
        periods: 12,
    },
];

fn select(score: f64, table: &[TierRow; 3]) -> TierRow {
    for row in &table[..table.len() - 1] {
        if row.admits(score) {
            return *row;
        }
    }
    table[table.len() - 1]
}

/// Resolve the policy parameters for a variant and score pair.
pub fn policy_for(
    variant: PolicyVariant,
    financial_health: f64,
    credit_reliability: f64,
) -> RecommendationPolicy {
    match variant {
        PolicyVariant::Default => DEFAULT_POLICY,
        PolicyVariant::Tiered => {
            let loan = select(financial_health, &LOAN_TIERS);
            let savings = select(credit_reliability, &SAVINGS_TIERS);
            RecommendationPolicy {
                loan_pct: loan.pct,
                loan_duration_years: loan.periods,
                savings_pct: savings.pct,
                savings_target_months: savings.periods,
            }
        }
    }
}

/// Size a loan and savings plan from the concept scores and monthly income.
pub fn recommend(
    financial_health: f64,
    credit_reliability: f64,
    monthly_income: f64,
    variant: PolicyVariant,
) -> Recommendation {
    let policy = policy_for(variant, financial_health, credit_reliability);
    let months = policy.loan_duration_years * 12;

    let recommended_principal = round_to_ten(
        monthly_income * policy.loan_pct * 12.0 * policy.loan_duration_years as f64,
    );
    let mut plan = LoanPlan {
        principal: recommended_principal,
        annual_rate: ANNUAL_RATE,
        duration_years: policy.loan_duration_years,
        monthly_installment: installment(recommended_principal, ANNUAL_RATE, months),
    };

    let cap = AFFORDABILITY_CAP * monthly_income;
    let capped = plan.monthly_installment > cap;
    if capped {
        let principal = round_to_ten(max_principal(cap, ANNUAL_RATE, months));
        debug!(
            principal,
            cap, "installment exceeded affordability cap, re-derived principal"
        );
        plan = LoanPlan {
            principal,
            annual_rate: ANNUAL_RATE,
            duration_years: policy.loan_duration_years,
            monthly_installment: installment(principal, ANNUAL_RATE, months),
        };
    }

    let monthly_savings = monthly_income * policy.savings_pct;
    Recommendation {
        policy,
        recommended_principal,
        plan,
        capped,
        monthly_savings,
        savings_target_amount: monthly_savings * policy.savings_target_months as f64,
    }
}

// Loan principals are quoted to the nearest 10 currency units.
fn round_to_ten(amount: f64) -> f64 {
    (amount / 10.0).round() * 10.0
}
