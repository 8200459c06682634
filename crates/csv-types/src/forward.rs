//! Forward conversion: Records / Dataset → CSV text.
//!
//! Values are written in their canonical string form, nulls as empty cells.
//! Quoting follows RFC 4180 through the `csv` crate; lines end with `\n`
//! and the output ends with a trailing newline.

use csv::{Terminator, WriterBuilder};
use oea_core::{Dataset, Record, Value};

/// Error type for CSV serialization failures.
#[derive(Debug, thiserror::Error)]
pub enum CsvWriteError {
    /// A header was requested but there is no record to infer it from
    #[error("Cannot infer a CSV header from an empty record sequence")]
    EmptyInput,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Header inferred from a record sequence: the first record's public field
/// names, in insertion order.
pub fn header_of(records: &[Record]) -> Option<Vec<String>> {
    records
        .first()
        .map(|first| first.public_fields().map(|(k, _)| k.to_string()).collect())
}

fn cell(value: Option<&Value>) -> String {
    value.and_then(Value::string_form).unwrap_or_default()
}

/// Render records as CSV.
///
/// The header comes from the first record; every row emits its values in
/// header order, with an empty cell for a field the record lacks. Fields
/// whose names start with `_` are never written.
///
/// An empty sequence renders as `""` when `include_header` is false and
/// fails with [`CsvWriteError::EmptyInput`] otherwise.
pub fn records_to_csv(records: &[Record], include_header: bool) -> Result<String, CsvWriteError> {
    let Some(header) = header_of(records) else {
        return if include_header {
            Err(CsvWriteError::EmptyInput)
        } else {
            Ok(String::new())
        };
    };

    let rows = records
        .iter()
        .map(|record| header.iter().map(|h| cell(record.get(h))).collect::<Vec<_>>());
    write_rows(include_header.then_some(header.as_slice()), rows)
}

/// Render a dataset as CSV. The header is the dataset's column list, so an
/// empty dataset still renders its header when one is requested.
pub fn dataset_to_csv(dataset: &Dataset, include_header: bool) -> Result<String, CsvWriteError> {
    let rows = dataset
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| cell(Some(v))).collect::<Vec<_>>());
    write_rows(include_header.then_some(dataset.columns()), rows)
}

fn write_rows<H, I>(header: Option<&[H]>, rows: I) -> Result<String, CsvWriteError>
where
    H: AsRef<str>,
    I: Iterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if let Some(header) = header {
        writer.write_record(header.iter().map(|h| h.as_ref()))?;
    }
    for row in rows {
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_follows_first_record() {
        let records = vec![
            Record::new().with("b", 1).with("a", 2),
            Record::new().with("a", 3).with("b", 4),
        ];
        assert_eq!(records_to_csv(&records, true).unwrap(), "b,a\n1,2\n4,3\n");
    }

    #[test]
    fn test_missing_field_is_empty_cell() {
        let records = vec![
            Record::new().with("a", 1).with("b", 2),
            Record::new().with("a", 3),
        ];
        assert_eq!(records_to_csv(&records, true).unwrap(), "a,b\n1,2\n3,\n");
    }

    #[test]
    fn test_private_fields_excluded() {
        let records = vec![Record::new()
            .with("_role", "Student")
            .with("Id", "st1")
            .with("_aad", "x")];
        assert_eq!(records_to_csv(&records, true).unwrap(), "Id\nst1\n");
    }

    #[test]
    fn test_headerless() {
        let records = vec![Record::new().with("a", 1).with("b", Value::Null)];
        assert_eq!(records_to_csv(&records, false).unwrap(), "1,\n");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            records_to_csv(&[], true),
            Err(CsvWriteError::EmptyInput)
        ));
        assert_eq!(records_to_csv(&[], false).unwrap(), "");
    }

    #[test]
    fn test_quoting() {
        let records = vec![Record::new()
            .with("agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .with("note", "a,b")
            .with("quote", "say \"hi\"")];
        assert_eq!(
            records_to_csv(&records, false).unwrap(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64),\"a,b\",\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_value_forms() {
        let records = vec![Record::new()
            .with("gpa", 4.0)
            .with("flag", true)
            .with("tags", vec!["x", "y"])];
        assert_eq!(
            records_to_csv(&records, false).unwrap(),
            "4.0,true,\"[\"\"x\"\",\"\"y\"\"]\"\n"
        );
    }

    #[test]
    fn test_dataset_header_only() {
        let dataset = Dataset::new(["Id", "Name"]).unwrap();
        assert_eq!(dataset_to_csv(&dataset, true).unwrap(), "Id,Name\n");
        assert_eq!(dataset_to_csv(&dataset, false).unwrap(), "");
    }
}
