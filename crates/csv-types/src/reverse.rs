//! Reverse conversion: CSV text → typed Dataset.
//!
//! Parsing is permissive: a cell that cannot be cast to its column's
//! semantic type becomes null and is logged, the row is kept.

use csv::ReaderBuilder;
use oea_core::{Dataset, DatasetError, EntitySchema, SemanticType, Value};
use tracing::{debug, warn};

/// Error type for CSV parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum CsvReadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Parse CSV text into a dataset, casting each cell through the schema.
///
/// With a header, columns come from the header and cells of undeclared
/// columns stay text. Without one, columns are the schema's declaration
/// order; short rows are padded with nulls and extra cells dropped.
pub fn read_csv(text: &str, schema: &EntitySchema, has_header: bool) -> Result<Dataset, CsvReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = if has_header {
        reader.headers()?.iter().map(|h| h.to_string()).collect()
    } else {
        schema.column_names().iter().map(|c| c.to_string()).collect()
    };
    let types: Vec<SemanticType> = columns
        .iter()
        .map(|c| {
            schema
                .column(c)
                .map(|spec| spec.semantic_type)
                .unwrap_or(SemanticType::String)
        })
        .collect();

    let mut dataset = Dataset::new(columns.iter().map(String::as_str))?;
    let mut failed_casts = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let row = types
            .iter()
            .enumerate()
            .map(|(i, semantic_type)| {
                let raw = record.get(i).unwrap_or("");
                semantic_type.cast(raw).unwrap_or_else(|e| {
                    debug!("Row {}, column '{}': {e}", line + 1, columns[i]);
                    failed_casts += 1;
                    Value::Null
                })
            })
            .collect();
        dataset.push_row(row)?;
    }

    if failed_casts > 0 {
        warn!(
            "{failed_casts} cells of entity '{}' could not be cast and were read as null",
            schema.name
        );
    }
    Ok(dataset)
}

/// Parse CSV text with every cell kept as text (empty cells as null).
///
/// Headerless input gets generated names `_c0`, `_c1`, ... sized by the
/// widest row.
pub fn read_csv_untyped(text: &str, has_header: bool) -> Result<Dataset, CsvReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Option<Vec<String>> = if has_header {
        Some(reader.headers()?.iter().map(|h| h.to_string()).collect())
    } else {
        None
    };
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;

    let columns = header.unwrap_or_else(|| {
        let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
        (0..width).map(|i| format!("_c{i}")).collect()
    });

    let mut dataset = Dataset::new(columns.iter().map(String::as_str))?;
    for record in &records {
        let row = (0..columns.len())
            .map(|i| match record.get(i) {
                None | Some("") => Value::Null,
                Some(cell) => Value::String(cell.to_string()),
            })
            .collect();
        dataset.push_row(row)?;
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::records_to_csv;
    use chrono::NaiveDate;
    use oea_core::Record;

    fn person_schema() -> EntitySchema {
        EntitySchema::from_triples(
            "Person",
            &[
                ["Id", "string", "hash"],
                ["Age", "integer", "no-op"],
                ["Active", "boolean", "no-op"],
                ["Seen", "timestamp", "no-op"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_typed_read() {
        let text = "Id,Age,Active,Seen\nA1,7,true,2021-07-12 10:00:00\n";
        let dataset = read_csv(text, &person_schema(), true).unwrap();
        assert_eq!(dataset.columns(), ["Id", "Age", "Active", "Seen"]);
        assert_eq!(dataset.get(0, "Id"), Some(&Value::String("A1".into())));
        assert_eq!(dataset.get(0, "Age"), Some(&Value::Int(7)));
        assert_eq!(dataset.get(0, "Active"), Some(&Value::Bool(true)));
        let seen = NaiveDate::from_ymd_opt(2021, 7, 12)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(dataset.get(0, "Seen"), Some(&Value::Timestamp(seen)));
    }

    #[test]
    fn test_failed_cast_is_null() {
        let text = "Id,Age\nA1,seven\nA2,\n";
        let dataset = read_csv(text, &person_schema(), true).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.get(0, "Age"), Some(&Value::Null));
        assert_eq!(dataset.get(1, "Age"), Some(&Value::Null));
    }

    #[test]
    fn test_undeclared_column_is_text() {
        let text = "Id,Extra\nA1,42\n";
        let dataset = read_csv(text, &person_schema(), true).unwrap();
        assert_eq!(dataset.get(0, "Extra"), Some(&Value::String("42".into())));
    }

    #[test]
    fn test_headerless_uses_schema_order() {
        let text = "A1,7\nA2,8,true,,surplus\n";
        let dataset = read_csv(text, &person_schema(), false).unwrap();
        assert_eq!(dataset.columns().len(), 4);
        assert_eq!(dataset.get(0, "Active"), Some(&Value::Null));
        assert_eq!(dataset.get(1, "Active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_round_trip_keeps_key_order() {
        let records = vec![
            Record::new()
                .with("Id", "A1")
                .with("Age", 7)
                .with("Active", false),
            Record::new()
                .with("Id", "B, \"2\"")
                .with("Age", 8)
                .with("Active", true),
        ];
        let text = records_to_csv(&records, true).unwrap();
        let dataset = read_csv(&text, &person_schema(), true).unwrap();
        assert_eq!(dataset.to_records(), records);
    }

    #[test]
    fn test_untyped_headerless() {
        let dataset = read_csv_untyped("a,b\nc\n", false).unwrap();
        assert_eq!(dataset.columns(), ["_c0", "_c1"]);
        assert_eq!(dataset.get(1, "_c1"), Some(&Value::Null));
        assert_eq!(dataset.get(0, "_c1"), Some(&Value::String("b".into())));
    }
}
