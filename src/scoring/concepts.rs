use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::columns;

/// The four fixed concept dimensions behind the resilience score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Concept {
    FinancialHealth,
    CreditReliability,
    CustomerEngagement,
    SocioeconomicStability,
}

impl Concept {
    pub const fn label(self) -> &'static str {
        match self {
            Concept::FinancialHealth => "Financial Health",
            Concept::CreditReliability => "Credit Reliability",
            Concept::CustomerEngagement => "Customer Engagement",
            Concept::SocioeconomicStability => "Socioeconomic Stability",
        }
    }

    /// Column carrying this concept's published score in the scaled table.
    pub const fn score_column(self) -> &'static str {
        match self {
            Concept::FinancialHealth => "Financial Health_Score",
            Concept::CreditReliability => "Credit Reliability_Score",
            Concept::CustomerEngagement => "Customer Engagement_Score",
            Concept::SocioeconomicStability => "Socioeconomic Stability_Score",
        }
    }

    pub const fn ordered() -> [Concept; 4] {
        [
            Concept::FinancialHealth,
            Concept::CreditReliability,
            Concept::CustomerEngagement,
            Concept::SocioeconomicStability,
        ]
    }
}

/// Concept-to-feature mapping, fixed for the lifetime of a data context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptDefinitions {
    features: BTreeMap<Concept, Vec<String>>,
}

impl ConceptDefinitions {
    /// The production mapping over the raw behavioral columns.
    pub fn standard() -> Self {
        let features = [
            (
                Concept::FinancialHealth,
                names(&[
                    columns::MONTHLY_INCOME,
                    columns::TOTAL_BALANCE,
                    columns::QUARTERLY_TRANSACTION_AMOUNT,
                ]),
            ),
            (
                Concept::CreditReliability,
                names(&[
                    columns::LOAN_AMOUNT,
                    columns::CURRENT_BILLING,
                    columns::LOAN_BEHAVIOR_INDICATOR,
                ]),
            ),
            (
                Concept::CustomerEngagement,
                names(&[
                    columns::DIGITAL_BANKING_INDICATOR,
                    columns::SAVINGS_ACCOUNT_INDICATOR,
                    columns::PRODUCT_COUNT,
                ]),
            ),
            (
                Concept::SocioeconomicStability,
                names(&[
                    columns::BANK_TENURE,
                    columns::CUSTOMER_AGE,
                    columns::REGION_CODE,
                ]),
            ),
        ]
        .into_iter()
        .collect();
        Self { features }
    }

    pub fn new(features: BTreeMap<Concept, Vec<String>>) -> Self {
        Self { features }
    }

    pub fn features_for(&self, concept: Concept) -> &[String] {
        self.features
            .get(&concept)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_features(&self) -> impl Iterator<Item = &str> {
        self.features.values().flatten().map(String::as_str)
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}
