use crate::config::ConfigError;
use crate::dataset::{CustomerId, TableError};

/// Errors surfaced by the engine's per-customer operations.
///
/// Every variant is recoverable at the presentation layer; nothing here decays
/// into a default score of zero, since that would corrupt downstream risk
/// classification.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("customer {0} not found in the loaded tables")]
    MissingCustomer(CustomerId),
    #[error("feature '{feature}' has zero variance across the population")]
    DegenerateFeature { feature: String },
    #[error("concept '{concept}' has no usable features left to score")]
    UnscorableConcept { concept: String },
    #[error("population resilience scores span an empty range, min-max rescaling is undefined")]
    DegenerateScoreRange,
    #[error("no peers match location '{location}' and segment '{segment}'{}", group_note(.group))]
    EmptyCohort {
        location: String,
        segment: String,
        group: Option<String>,
    },
    #[error("target score {target} is outside the valid domain [-1, 1]")]
    InvalidTargetScore { target: f64 },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn group_note(group: &Option<String>) -> String {
    match group {
        Some(label) => format!(" in group '{label}'"),
        None => String::new(),
    }
}
