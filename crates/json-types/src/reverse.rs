//! Reverse conversion: newline-delimited JSON → typed Dataset.

use oea_core::{Dataset, DatasetError, EntitySchema, Value};
use tracing::warn;

/// Error type for JSON parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum JsonReadError {
    #[error("Invalid JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Parse newline-delimited JSON into a dataset.
///
/// Columns are the union of object keys in first-seen order. Values of
/// declared columns are cast through their semantic type via their string
/// form; a value that does not cast becomes null. Blank lines are skipped.
pub fn read_ndjson(text: &str, schema: &EntitySchema) -> Result<Dataset, JsonReadError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let json: serde_json::Value =
            serde_json::from_str(line).map_err(|source| JsonReadError::Parse {
                line: index + 1,
                source,
            })?;
        match Value::from(json) {
            Value::Object(record) => records.push(record),
            _ => return Err(JsonReadError::NotAnObject(index + 1)),
        }
    }

    let mut dataset = Dataset::from_records(&records);
    let mut failed_casts = 0usize;
    for spec in schema.columns() {
        if !dataset.has_column(&spec.name) {
            continue;
        }
        dataset = dataset.map_column(&spec.name, |value| {
            let Some(raw) = value.string_form() else {
                return Value::Null;
            };
            spec.semantic_type.cast(&raw).unwrap_or_else(|_| {
                failed_casts += 1;
                Value::Null
            })
        })?;
    }
    if failed_casts > 0 {
        warn!(
            "{failed_casts} values of entity '{}' could not be cast and were read as null",
            schema.name
        );
    }
    Ok(dataset)
}
