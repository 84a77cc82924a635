use std::collections::BTreeMap;
use std::io::Read;

use super::{columns, CustomerGroup, CustomerId, FeatureRow, ScoredRecord};
use crate::scoring::Concept;

/// Error raised while ingesting one of the customer tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("column '{column}' row {row} is not numeric: '{value}'")]
    BadNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[error("unrecognized customer group '{value}' at row {row}")]
    UnknownGroup { value: String, row: usize },
    #[error("concept definitions reference feature '{0}' absent from the unscaled table")]
    MissingFeature(String),
    #[error("table contains no rows")]
    EmptyTable,
}

fn reader_for<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, TableError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| TableError::MissingColumn(name.to_string()))
}

fn parse_number(value: &str, column: &str, row: usize) -> Result<f64, TableError> {
    value.parse::<f64>().map_err(|_| TableError::BadNumber {
        column: column.to_string(),
        row,
        value: value.to_string(),
    })
}

fn field<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

/// Parse the scaled score table: identifier, location, segment, the four
/// published concept scores, and the resilience score. Extra columns are
/// ignored.
pub(super) fn parse_scored<R: Read>(input: R) -> Result<Vec<ScoredRecord>, TableError> {
    let mut reader = reader_for(input);
    let headers = reader.headers()?.clone();

    let id_idx = column_index(&headers, columns::CUSTOMER_ID)?;
    let location_idx = column_index(&headers, columns::CUSTOMER_LOCATION)?;
    let segment_idx = column_index(&headers, columns::CUSTOMER_SEGMENT)?;
    let resilience_idx = column_index(&headers, columns::RESILIENCE_SCORE)?;
    let concept_idx: Vec<(Concept, usize)> = Concept::ordered()
        .into_iter()
        .map(|concept| Ok((concept, column_index(&headers, concept.score_column())?)))
        .collect::<Result<_, TableError>>()?;

    let mut records = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let record = record?;
        let row = offset + 2; // header occupies row 1

        let mut concept_scores = BTreeMap::new();
        for &(concept, index) in &concept_idx {
            let value = parse_number(field(&record, index), concept.score_column(), row)?;
            concept_scores.insert(concept, value);
        }

        records.push(ScoredRecord {
            id: CustomerId(field(&record, id_idx).to_string()),
            location: field(&record, location_idx).to_string(),
            segment: field(&record, segment_idx).to_string(),
            concept_scores,
            resilience_score: parse_number(
                field(&record, resilience_idx),
                columns::RESILIENCE_SCORE,
                row,
            )?,
        });
    }

    Ok(records)
}

/// Parse the unscaled feature table. Every non-reserved column is treated as
/// a numeric raw feature.
pub(super) fn parse_raw<R: Read>(
    input: R,
) -> Result<BTreeMap<CustomerId, FeatureRow>, TableError> {
    let mut reader = reader_for(input);
    let headers = reader.headers()?.clone();
    let id_idx = column_index(&headers, columns::CUSTOMER_ID)?;

    let feature_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !is_reserved(name))
        .map(|(index, name)| (index, name.to_string()))
        .collect();

    let mut rows = BTreeMap::new();
    for (offset, record) in reader.records().enumerate() {
        let record = record?;
        let row = offset + 2;

        let mut features = FeatureRow::new();
        for (index, name) in &feature_columns {
            let value = parse_number(field(&record, *index), name, row)?;
            features.insert(name.clone(), value);
        }

        rows.insert(CustomerId(field(&record, id_idx).to_string()), features);
    }

    Ok(rows)
}

/// Parse the grouped table mapping customer identifiers to banking groups.
pub(super) fn parse_grouped<R: Read>(
    input: R,
) -> Result<BTreeMap<CustomerId, CustomerGroup>, TableError> {
    let mut reader = reader_for(input);
    let headers = reader.headers()?.clone();
    let id_idx = column_index(&headers, columns::CUSTOMER_ID)?;
    let group_idx = column_index(&headers, columns::CUSTOMER_GROUP)?;

    let mut groups = BTreeMap::new();
    for (offset, record) in reader.records().enumerate() {
        let record = record?;
        let row = offset + 2;

        let value = field(&record, group_idx);
        let group = CustomerGroup::parse(value).ok_or_else(|| TableError::UnknownGroup {
            value: value.to_string(),
            row,
        })?;
        groups.insert(CustomerId(field(&record, id_idx).to_string()), group);
    }

    Ok(groups)
}

fn is_reserved(name: &str) -> bool {
    name == columns::CUSTOMER_ID
        || name == columns::CUSTOMER_LOCATION
        || name == columns::CUSTOMER_SEGMENT
        || name == columns::RESILIENCE_SCORE
        || Concept::ordered()
            .iter()
            .any(|concept| concept.score_column() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SCALED: &str = "\
CUSTOMER_ID,CUSTOMER_LOCATION,CUSTOMER_SEGMENT,Financial Health_Score,Credit Reliability_Score,Customer Engagement_Score,Socioeconomic Stability_Score,Resilience_Score
1001,Manila,Agriculture,0.8,0.6,0.4,0.7,0.62
1002,Cebu,Retail Trade,0.2,0.3,0.5,0.4,0.35
";

    #[test]
    fn parses_scored_records_with_all_concepts() {
        let records = parse_scored(Cursor::new(SCALED)).expect("parse");
        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.id.0, "1001");
        assert_eq!(first.location, "Manila");
        assert_eq!(first.segment, "Agriculture");
        assert_eq!(first.concept_scores.len(), 4);
        assert_eq!(first.concept_score(Concept::FinancialHealth), Some(0.8));
        assert_eq!(first.resilience_score, 0.62);
    }

    #[test]
    fn missing_score_column_is_reported_by_name() {
        let csv = "CUSTOMER_ID,CUSTOMER_LOCATION,CUSTOMER_SEGMENT\n1001,Manila,Agriculture\n";
        let error = parse_scored(Cursor::new(csv)).expect_err("missing column");
        match error {
            TableError::MissingColumn(name) => assert_eq!(name, "Financial Health_Score"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_feature_is_rejected_with_position() {
        let csv = "CUSTOMER_ID,MONTHLY_INCOME\n1001,lots\n";
        let error = parse_raw(Cursor::new(csv)).expect_err("bad number");
        match error {
            TableError::BadNumber { column, row, value } => {
                assert_eq!(column, "MONTHLY_INCOME");
                assert_eq!(row, 2);
                assert_eq!(value, "lots");
            }
            other => panic!("expected bad number, got {other:?}"),
        }
    }

    #[test]
    fn raw_parser_skips_reserved_columns() {
        let csv = "CUSTOMER_ID,CUSTOMER_LOCATION,Resilience_Score,MONTHLY_INCOME\n1001,Manila,0.5,20000\n";
        let rows = parse_raw(Cursor::new(csv)).expect("parse");
        let features = rows.get(&CustomerId("1001".to_string())).expect("row");
        assert_eq!(features.len(), 1);
        assert_eq!(features.get("MONTHLY_INCOME"), Some(&20000.0));
    }

    #[test]
    fn grouped_parser_reads_labels_and_rejects_unknowns() {
        let csv = "CUSTOMER_ID,CUSTOMER_GROUP\n1001,Retail\n1002,Business Banking\n";
        let groups = parse_grouped(Cursor::new(csv)).expect("parse");
        assert_eq!(
            groups.get(&CustomerId("1001".to_string())),
            Some(&CustomerGroup::Retail)
        );
        assert_eq!(
            groups.get(&CustomerId("1002".to_string())),
            Some(&CustomerGroup::BusinessBanking)
        );

        let csv = "CUSTOMER_ID,CUSTOMER_GROUP\n1001,Wholesale\n";
        let error = parse_grouped(Cursor::new(csv)).expect_err("unknown group");
        assert!(matches!(error, TableError::UnknownGroup { row: 2, .. }));
    }
}
