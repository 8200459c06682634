//! Forward conversion: Record → JSON value.
//!
//! Private fields (names starting with `_`) are dropped at every nesting
//! level. Dates, timestamps and UUIDs become strings in their canonical form.

use oea_core::{Dataset, Record, Value};
use serde_json::json;

/// Error type for JSON serialization failures.
#[derive(Debug, thiserror::Error)]
pub enum JsonWriteError {
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Wrapper for JSON values.
#[derive(Debug, Clone)]
pub struct JsonValue(pub serde_json::Value);

impl JsonValue {
    /// Get the inner JSON value.
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Get a reference to the inner JSON value.
    pub fn as_inner(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => JsonValue(serde_json::Value::Null),
            Value::Bool(b) => JsonValue(json!(*b)),
            Value::Short(i) => JsonValue(json!(*i)),
            Value::Int(i) => JsonValue(json!(*i)),
            Value::Long(i) => JsonValue(json!(*i)),
            // Non-finite doubles have no JSON form and become null
            Value::Double(f) => JsonValue(json!(*f)),
            Value::String(s) => JsonValue(json!(s)),
            Value::Date(_) | Value::Timestamp(_) | Value::Uuid(_) => {
                JsonValue(json!(value.string_form()))
            }
            Value::Array(values) => JsonValue(serde_json::Value::Array(
                values.iter().map(|v| JsonValue::from(v).into_inner()).collect(),
            )),
            Value::Object(record) => JsonValue::from(record),
        }
    }
}

impl From<&Record> for JsonValue {
    fn from(record: &Record) -> Self {
        let mut obj = serde_json::Map::new();
        for (name, value) in record.public_fields() {
            obj.insert(name.to_string(), JsonValue::from(value).into_inner());
        }
        JsonValue(serde_json::Value::Object(obj))
    }
}

/// Render records as one compact JSON array. An empty sequence is `[]`.
pub fn records_to_json_array(records: &[Record]) -> Result<String, JsonWriteError> {
    let array: Vec<serde_json::Value> = records
        .iter()
        .map(|r| JsonValue::from(r).into_inner())
        .collect();
    Ok(serde_json::to_string(&array)?)
}

/// Render records as newline-delimited JSON, one object per line.
pub fn records_to_ndjson(records: &[Record]) -> Result<String, JsonWriteError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(JsonValue::from(record).as_inner())?);
        out.push('\n');
    }
    Ok(out)
}

/// Render a dataset as newline-delimited JSON. Null cells are kept as
/// explicit `null` members so every line carries every column.
pub fn dataset_to_ndjson(dataset: &Dataset) -> Result<String, JsonWriteError> {
    records_to_ndjson(&dataset.to_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_scalar_conversion() {
        assert!(JsonValue::from(&Value::Null).0.is_null());
        assert_eq!(JsonValue::from(&Value::Int(7)).0, json!(7));
        assert_eq!(JsonValue::from(&Value::Double(2.5)).0, json!(2.5));
        assert_eq!(JsonValue::from(&Value::Bool(true)).0, json!(true));
        assert_eq!(JsonValue::from(&Value::Double(f64::NAN)).0, json!(null));
    }

    #[test]
    fn test_date_conversion() {
        let date = NaiveDate::from_ymd_opt(2021, 7, 12).unwrap();
        assert_eq!(JsonValue::from(&Value::Date(date)).0, json!("2021-07-12"));
    }

    #[test]
    fn test_private_fields_dropped_recursively() {
        let record = Record::new()
            .with("id", "s1")
            .with("_etag", "abc")
            .with(
                "schoolReference",
                Record::new().with("schoolId", 1).with("_internal", true),
            );
        assert_eq!(
            records_to_json_array(&[record]).unwrap(),
            r#"[{"id":"s1","schoolReference":{"schoolId":1}}]"#
        );
    }

    #[test]
    fn test_key_order_preserved() {
        let record = Record::new().with("z", 1).with("a", 2).with("m", 3);
        assert_eq!(records_to_ndjson(&[record]).unwrap(), "{\"z\":1,\"a\":2,\"m\":3}\n");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(records_to_json_array(&[]).unwrap(), "[]");
        assert_eq!(records_to_ndjson(&[]).unwrap(), "");
    }

    #[test]
    fn test_dataset_keeps_nulls() {
        let dataset = Dataset::from_rows(["a", "b"], vec![vec![Value::Int(1), Value::Null]]).unwrap();
        assert_eq!(dataset_to_ndjson(&dataset).unwrap(), "{\"a\":1,\"b\":null}\n");
    }
}
