//! Scoring and simulation engine for MSME financial resilience.
//!
//! The crate consumes three precomputed customer tables (a scaled score table,
//! its unscaled counterpart, and a customer-group table), derives population
//! statistics once per load, and exposes stateless per-customer operations:
//! concept scoring, risk classification, peer benchmarking, target gap
//! solving, loan/savings recommendations, and what-if loan simulation. All
//! outputs are plain numeric structures; rendering belongs to the caller.

pub mod benchmark;
pub mod config;
pub mod dataset;
pub mod error;
pub mod recommend;
pub mod scoring;
pub mod simulate;
pub mod target;

mod engine;

pub use benchmark::{CohortFilter, CohortMetric, CohortSummary, PeerComparison};
pub use config::{ConfigError, DataConfig};
pub use dataset::{
    columns, CustomerGroup, CustomerId, DataContext, FeatureRow, FeatureStats, PopulationStats,
    ScoredRecord, TableError,
};
pub use engine::{AdviceFlags, ResilienceEngine};
pub use error::EngineError;
pub use recommend::{
    LoanPlan, PolicyVariant, Recommendation, RecommendationPolicy, AFFORDABILITY_CAP, ANNUAL_RATE,
    DEFAULT_POLICY,
};
pub use scoring::{
    Concept, ConceptDefinitions, ConceptScorer, DegeneratePolicy, RiskTier, ScoreVector,
};
pub use simulate::SimulationOutcome;
pub use target::TargetGap;
