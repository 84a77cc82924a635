//! Peer cohort filtering and summary statistics.
//!
//! One parameterized summarizer serves both the box-summary (quartiles) and
//! the radar-style per-concept means; chart drawing stays with the caller.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::dataset::{CustomerGroup, DataContext, ScoredRecord};
use crate::error::EngineError;
use crate::scoring::Concept;

/// Exact-match cohort filter over the scaled table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CohortFilter {
    pub location: String,
    pub segment: String,
    pub group: Option<CustomerGroup>,
}

/// Metric extracted from each peer record when summarizing a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortMetric {
    Resilience,
    Concept(Concept),
}

impl CohortMetric {
    fn extract(self, record: &ScoredRecord) -> Option<f64> {
        match self {
            CohortMetric::Resilience => Some(record.resilience_score),
            CohortMetric::Concept(concept) => record.concept_score(concept),
        }
    }
}

/// Quartile-and-mean summary of one cohort metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CohortSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub mean: f64,
    pub size: usize,
}

/// Cohort statistics handed to the presentation layer.
///
/// Echoes the filter the cohort was built from; a `None` group means no
/// group narrowing was applied, even if the caller asked for it.
#[derive(Debug, Clone, Serialize)]
pub struct PeerComparison {
    pub filter: CohortFilter,
    pub resilience: CohortSummary,
    pub concept_means: BTreeMap<Concept, f64>,
}

/// Peers sharing the filter's location and segment, optionally narrowed by
/// banking group. The customer's own record stays in the cohort.
pub fn cohort<'a>(context: &'a DataContext, filter: &CohortFilter) -> Vec<&'a ScoredRecord> {
    context
        .scored()
        .iter()
        .filter(|record| {
            record.location == filter.location
                && record.segment == filter.segment
                && filter
                    .group
                    .map_or(true, |group| context.group_for(&record.id) == Some(group))
        })
        .collect()
}

/// Summarize one metric over a cohort; `None` when the cohort is empty.
pub fn summarize(records: &[&ScoredRecord], metric: CohortMetric) -> Option<CohortSummary> {
    let mut values: Vec<f64> = records
        .iter()
        .filter_map(|record| metric.extract(record))
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(CohortSummary {
        q1: percentile(&values, 0.25),
        median: percentile(&values, 0.5),
        q3: percentile(&values, 0.75),
        mean,
        size: values.len(),
    })
}

/// Full comparison for a filter: resilience quartiles plus the radar vector.
pub fn compare(context: &DataContext, filter: &CohortFilter) -> Result<PeerComparison, EngineError> {
    let records = cohort(context, filter);
    let empty_cohort = || EngineError::EmptyCohort {
        location: filter.location.clone(),
        segment: filter.segment.clone(),
        group: filter.group.map(|group| group.label().to_string()),
    };

    let resilience = summarize(&records, CohortMetric::Resilience).ok_or_else(empty_cohort)?;

    let mut concept_means = BTreeMap::new();
    for concept in Concept::ordered() {
        let summary =
            summarize(&records, CohortMetric::Concept(concept)).ok_or_else(empty_cohort)?;
        concept_means.insert(concept, summary.mean);
    }

    debug!(
        peers = records.len(),
        location = %filter.location,
        segment = %filter.segment,
        "assembled peer cohort"
    );

    Ok(PeerComparison {
        filter: filter.clone(),
        resilience,
        concept_means,
    })
}

// Linear interpolation between closest ranks, matching the upstream tables'
// quartile convention.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let fraction = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
}
