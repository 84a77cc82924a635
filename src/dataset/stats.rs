use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::{CustomerId, FeatureRow, TableError};
use crate::error::EngineError;
use crate::scoring::{self, ConceptDefinitions, DegeneratePolicy};

/// Mean and sample standard deviation of one feature across the population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Population-wide figures computed once per load and read-only afterwards.
///
/// The resilience bounds are the min and max of the raw (pre-scaling)
/// resilience score over the same population and concept definitions, so
/// rescaled scores land in [0, 1] for every loaded customer.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationStats {
    features: BTreeMap<String, FeatureStats>,
    resilience_min: f64,
    resilience_max: f64,
    population: usize,
}

impl PopulationStats {
    pub(super) fn compute(
        rows: &BTreeMap<CustomerId, FeatureRow>,
        definitions: &ConceptDefinitions,
        policy: DegeneratePolicy,
    ) -> Result<Self, EngineError> {
        if rows.is_empty() {
            return Err(TableError::EmptyTable.into());
        }

        let mut features = BTreeMap::new();
        let names: Vec<&String> = rows
            .values()
            .next()
            .map(|row| row.keys().collect())
            .unwrap_or_default();
        for name in names {
            let values: Vec<f64> = rows
                .values()
                .filter_map(|row| row.get(name))
                .copied()
                .collect();
            features.insert(name.clone(), feature_stats(&values));
        }

        let mut resilience_min = f64::INFINITY;
        let mut resilience_max = f64::NEG_INFINITY;
        for row in rows.values() {
            let raw = scoring::raw_resilience(row, definitions, &features, policy)?;
            resilience_min = resilience_min.min(raw);
            resilience_max = resilience_max.max(raw);
        }

        debug!(
            features = features.len(),
            population = rows.len(),
            resilience_min,
            resilience_max,
            "computed population statistics"
        );

        Ok(Self {
            features,
            resilience_min,
            resilience_max,
            population: rows.len(),
        })
    }

    pub fn feature(&self, name: &str) -> Option<FeatureStats> {
        self.features.get(name).copied()
    }

    pub fn features(&self) -> &BTreeMap<String, FeatureStats> {
        &self.features
    }

    pub fn resilience_min(&self) -> f64 {
        self.resilience_min
    }

    pub fn resilience_max(&self) -> f64 {
        self.resilience_max
    }

    pub fn population(&self) -> usize {
        self.population
    }

    /// Min-max rescale a raw resilience score into the published [0, 1] range.
    pub fn rescale(&self, raw: f64) -> Result<f64, EngineError> {
        let span = self.resilience_max - self.resilience_min;
        if span == 0.0 {
            return Err(EngineError::DegenerateScoreRange);
        }
        Ok((raw - self.resilience_min) / span)
    }
}

// Sample standard deviation, matching how the upstream tables were produced.
// A single observation has no spread and reports as degenerate.
fn feature_stats(values: &[f64]) -> FeatureStats {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    };
    FeatureStats { mean, std_dev }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Concept;

    fn row(pairs: &[(&str, f64)]) -> FeatureRow {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn population() -> BTreeMap<CustomerId, FeatureRow> {
        [
            ("c1", 10.0, 1.0, 0.0, 2.0),
            ("c2", 20.0, 2.0, 1.0, 4.0),
            ("c3", 30.0, 3.0, 2.0, 6.0),
        ]
        .into_iter()
        .map(|(id, income, loans, digital, tenure)| {
            (
                CustomerId(id.to_string()),
                row(&[
                    ("income", income),
                    ("loans", loans),
                    ("digital", digital),
                    ("tenure", tenure),
                ]),
            )
        })
        .collect()
    }

    fn definitions() -> ConceptDefinitions {
        ConceptDefinitions::new(
            [
                (Concept::FinancialHealth, vec!["income".to_string()]),
                (Concept::CreditReliability, vec!["loans".to_string()]),
                (Concept::CustomerEngagement, vec!["digital".to_string()]),
                (Concept::SocioeconomicStability, vec!["tenure".to_string()]),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn computes_sample_mean_and_std() {
        let stats = PopulationStats::compute(&population(), &definitions(), DegeneratePolicy::Fail)
            .expect("stats");
        let income = stats.feature("income").expect("income stats");
        assert!((income.mean - 20.0).abs() < 1e-12);
        assert!((income.std_dev - 10.0).abs() < 1e-12);
        assert_eq!(stats.population(), 3);
    }

    #[test]
    fn resilience_bounds_cover_the_population() {
        // Each feature is linear across the three rows, so raw resilience is
        // -1, 0, and 1 for c1, c2, and c3.
        let stats = PopulationStats::compute(&population(), &definitions(), DegeneratePolicy::Fail)
            .expect("stats");
        assert!((stats.resilience_min() - (-1.0)).abs() < 1e-9);
        assert!((stats.resilience_max() - 1.0).abs() < 1e-9);

        assert!((stats.rescale(-1.0).expect("rescale") - 0.0).abs() < 1e-9);
        assert!((stats.rescale(0.0).expect("rescale") - 0.5).abs() < 1e-9);
        assert!((stats.rescale(1.0).expect("rescale") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collapsed_resilience_bounds_make_rescaling_undefined() {
        // Mirrored rows with equal spreads: every feature varies, but the
        // per-row z-scores cancel pairwise, so each raw resilience is
        // exactly zero.
        let rows: BTreeMap<CustomerId, FeatureRow> = [
            ("c1", 10.0, 30.0, 10.0, 30.0),
            ("c2", 30.0, 10.0, 30.0, 10.0),
        ]
        .into_iter()
        .map(|(id, income, loans, digital, tenure)| {
            (
                CustomerId(id.to_string()),
                row(&[
                    ("income", income),
                    ("loans", loans),
                    ("digital", digital),
                    ("tenure", tenure),
                ]),
            )
        })
        .collect();

        let stats = PopulationStats::compute(&rows, &definitions(), DegeneratePolicy::Fail)
            .expect("stats");
        assert_eq!(stats.resilience_min(), stats.resilience_max());

        let error = stats
            .rescale(stats.resilience_min())
            .expect_err("undefined rescale");
        assert!(matches!(error, EngineError::DegenerateScoreRange));
    }

    #[test]
    fn empty_population_is_rejected() {
        let error =
            PopulationStats::compute(&BTreeMap::new(), &definitions(), DegeneratePolicy::Fail)
                .expect_err("empty table");
        assert!(matches!(
            error,
            EngineError::Table(TableError::EmptyTable)
        ));
    }
}
