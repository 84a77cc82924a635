use std::env;
use std::path::PathBuf;

use crate::scoring::DegeneratePolicy;

/// Table locations and scoring policy resolved from the environment.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub scored_table: PathBuf,
    pub raw_table: PathBuf,
    pub grouped_table: PathBuf,
    pub degenerate_policy: DegeneratePolicy,
}

impl DataConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let scored_table = env::var("RESILIENCE_SCORED_TABLE")
            .unwrap_or_else(|_| "data/resilience_scored.csv".to_string())
            .into();
        let raw_table = env::var("RESILIENCE_RAW_TABLE")
            .unwrap_or_else(|_| "data/resilience_raw.csv".to_string())
            .into();
        let grouped_table = env::var("RESILIENCE_GROUPED_TABLE")
            .unwrap_or_else(|_| "data/resilience_grouped.csv".to_string())
            .into();

        let degenerate_policy = match env::var("RESILIENCE_DEGENERATE_POLICY") {
            Ok(value) => DegeneratePolicy::parse(&value)
                .ok_or(ConfigError::InvalidDegeneratePolicy(value))?,
            Err(_) => DegeneratePolicy::default(),
        };

        Ok(Self {
            scored_table,
            raw_table,
            grouped_table,
            degenerate_policy,
        })
    }
}

/// Error raised while resolving the data configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("RESILIENCE_DEGENERATE_POLICY must be 'fail' or 'skip', got '{0}'")]
    InvalidDegeneratePolicy(String),
}
