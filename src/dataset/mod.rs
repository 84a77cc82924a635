//! Loaded customer tables and the population statistics derived from them.
//!
//! The [`DataContext`] is built once per session, is read-only afterwards, and
//! is handed to every engine operation explicitly. Reloading means building a
//! fresh context; there is no hidden global cache.

mod parser;
mod stats;

pub use parser::TableError;
pub use stats::{FeatureStats, PopulationStats};

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DataConfig;
use crate::error::EngineError;
use crate::scoring::{Concept, ConceptDefinitions, DegeneratePolicy};

/// Column names shared with the upstream data provider.
pub mod columns {
    pub const CUSTOMER_ID: &str = "CUSTOMER_ID";
    pub const CUSTOMER_LOCATION: &str = "CUSTOMER_LOCATION";
    pub const CUSTOMER_SEGMENT: &str = "CUSTOMER_SEGMENT";
    pub const CUSTOMER_GROUP: &str = "CUSTOMER_GROUP";
    pub const RESILIENCE_SCORE: &str = "Resilience_Score";

    pub const MONTHLY_INCOME: &str = "MONTHLY_INCOME";
    pub const TOTAL_BALANCE: &str = "TOTAL_BALANCE";
    pub const QUARTERLY_TRANSACTION_AMOUNT: &str = "QUARTERLY_TRANSACTION_AMOUNT";
    pub const LOAN_AMOUNT: &str = "LOAN_AMOUNT";
    pub const CURRENT_BILLING: &str = "CURRENT_BILLING";
    pub const LOAN_BEHAVIOR_INDICATOR: &str = "LOAN_BEHAVIOR_INDICATOR";
    pub const DIGITAL_BANKING_INDICATOR: &str = "DIGITAL_BANKING_INDICATOR";
    pub const SAVINGS_ACCOUNT_INDICATOR: &str = "SAVINGS_ACCOUNT_INDICATOR";
    pub const PRODUCT_COUNT: &str = "PRODUCT_COUNT";
    pub const BANK_TENURE: &str = "BANK_TENURE";
    pub const CUSTOMER_AGE: &str = "CUSTOMER_AGE";
    pub const REGION_CODE: &str = "REGION_CODE";
    pub const AUTO_LOAN_INDICATOR: &str = "AUTO_LOAN_INDICATOR";
    pub const HOUSING_LOAN_INDICATOR: &str = "HOUSING_LOAN_INDICATOR";
}

/// Identifier carried through every table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw feature values for one customer; cloned and mutated during simulation.
pub type FeatureRow = BTreeMap<String, f64>;

/// Banking group label carried by the grouped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerGroup {
    Retail,
    BusinessBanking,
}

impl CustomerGroup {
    pub const fn label(self) -> &'static str {
        match self {
            CustomerGroup::Retail => "Retail",
            CustomerGroup::BusinessBanking => "Business Banking",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "retail" => Some(CustomerGroup::Retail),
            "business banking" | "business_banking" => Some(CustomerGroup::BusinessBanking),
            _ => None,
        }
    }
}

/// One row of the scaled score table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: CustomerId,
    pub location: String,
    pub segment: String,
    pub concept_scores: BTreeMap<Concept, f64>,
    pub resilience_score: f64,
}

impl ScoredRecord {
    /// Published score for one concept; the parser populates all four.
    pub fn concept_score(&self, concept: Concept) -> Option<f64> {
        self.concept_scores.get(&concept).copied()
    }
}

/// Read-only data context shared by every engine operation for one session.
#[derive(Debug)]
pub struct DataContext {
    scored: Vec<ScoredRecord>,
    scored_index: BTreeMap<CustomerId, usize>,
    raw: BTreeMap<CustomerId, FeatureRow>,
    groups: BTreeMap<CustomerId, CustomerGroup>,
    stats: PopulationStats,
    definitions: ConceptDefinitions,
    degenerate_policy: DegeneratePolicy,
}

impl DataContext {
    /// Load the three tables named by the configuration, using the standard
    /// concept definitions.
    pub fn load(config: &DataConfig) -> Result<Self, EngineError> {
        let scored = File::open(&config.scored_table).map_err(TableError::Io)?;
        let raw = File::open(&config.raw_table).map_err(TableError::Io)?;
        let grouped = File::open(&config.grouped_table).map_err(TableError::Io)?;
        Self::from_readers(
            scored,
            raw,
            grouped,
            ConceptDefinitions::standard(),
            config.degenerate_policy,
        )
    }

    /// Build a context from arbitrary readers, so tests and callers can feed
    /// in-memory tables.
    pub fn from_readers<S: Read, R: Read, G: Read>(
        scored: S,
        raw: R,
        grouped: G,
        definitions: ConceptDefinitions,
        degenerate_policy: DegeneratePolicy,
    ) -> Result<Self, EngineError> {
        let scored = parser::parse_scored(scored)?;
        if scored.is_empty() {
            return Err(TableError::EmptyTable.into());
        }

        let raw = parser::parse_raw(raw)?;
        let groups = parser::parse_grouped(grouped)?;

        // Every feature named by a concept must exist in the unscaled table.
        if let Some((_, row)) = raw.iter().next() {
            for feature in definitions.all_features() {
                if !row.contains_key(feature) {
                    return Err(TableError::MissingFeature(feature.to_string()).into());
                }
            }
        }

        let stats = PopulationStats::compute(&raw, &definitions, degenerate_policy)?;

        let scored_index = scored
            .iter()
            .enumerate()
            .map(|(index, record)| (record.id.clone(), index))
            .collect();

        info!(
            customers = scored.len(),
            features = stats.features().len(),
            "loaded resilience tables"
        );

        Ok(Self {
            scored,
            scored_index,
            raw,
            groups,
            stats,
            definitions,
            degenerate_policy,
        })
    }

    pub fn scored(&self) -> &[ScoredRecord] {
        &self.scored
    }

    pub fn scored_for(&self, id: &CustomerId) -> Result<&ScoredRecord, EngineError> {
        self.scored_index
            .get(id)
            .map(|&index| &self.scored[index])
            .ok_or_else(|| EngineError::MissingCustomer(id.clone()))
    }

    pub fn raw_for(&self, id: &CustomerId) -> Result<&FeatureRow, EngineError> {
        self.raw
            .get(id)
            .ok_or_else(|| EngineError::MissingCustomer(id.clone()))
    }

    pub fn group_for(&self, id: &CustomerId) -> Option<CustomerGroup> {
        self.groups.get(id).copied()
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn definitions(&self) -> &ConceptDefinitions {
        &self.definitions
    }

    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.degenerate_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SCALED: &str = "\
CUSTOMER_ID,CUSTOMER_LOCATION,CUSTOMER_SEGMENT,Financial Health_Score,Credit Reliability_Score,Customer Engagement_Score,Socioeconomic Stability_Score,Resilience_Score
1001,Manila,Agriculture,0.8,0.6,0.4,0.7,0.62
";

    const GROUPED: &str = "CUSTOMER_ID,CUSTOMER_GROUP\n1001,Retail\n";

    #[test]
    fn loading_fails_when_a_concept_feature_is_absent_from_the_raw_table() {
        // REGION_CODE is in the standard definitions but not in this table.
        let raw = "\
CUSTOMER_ID,MONTHLY_INCOME,TOTAL_BALANCE,QUARTERLY_TRANSACTION_AMOUNT,LOAN_AMOUNT,CURRENT_BILLING,LOAN_BEHAVIOR_INDICATOR,DIGITAL_BANKING_INDICATOR,SAVINGS_ACCOUNT_INDICATOR,PRODUCT_COUNT,BANK_TENURE,CUSTOMER_AGE,AUTO_LOAN_INDICATOR,HOUSING_LOAN_INDICATOR
1001,50000,120000,90000,40000,4000,3,1,1,4,6,45,1,0
";
        let error = DataContext::from_readers(
            Cursor::new(SCALED),
            Cursor::new(raw),
            Cursor::new(GROUPED),
            ConceptDefinitions::standard(),
            DegeneratePolicy::Fail,
        )
        .expect_err("missing feature");
        assert!(matches!(
            error,
            EngineError::Table(TableError::MissingFeature(ref name)) if name == columns::REGION_CODE
        ));
    }
}
