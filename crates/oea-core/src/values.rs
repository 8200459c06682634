//! Value representations shared by the generators and the pseudonymization
//! engine.
//!
//! A [`Value`] is a scalar or nested datum; a [`Record`] is an ordered mapping
//! from field name to value. Key order is insertion order and is what the
//! serializers use to derive headers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Field names starting with this marker are internal and never serialized.
pub const PRIVATE_FIELD_MARKER: char = '_';

/// Whether a field name is internal (excluded from serialized output).
pub fn is_private_field(name: &str) -> bool {
    name.starts_with(PRIVATE_FIELD_MARKER)
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    Array(Vec<Value>),
    Object(Record),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Short(i) => Some(*i as i64),
            Self::Int(i) => Some(*i as i64),
            Self::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a nested record.
    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Self::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Canonical string form, or `None` for null.
    ///
    /// This is the form written to CSV cells and fed to the digest when a
    /// column is hashed. Nested values render as compact JSON.
    pub fn string_form(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Short(i) => Some(i.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Long(i) => Some(i.to_string()),
            Self::Double(f) => Some(format_double(*f)),
            Self::String(s) => Some(s.clone()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Self::Timestamp(ts) => Some(ts.format(TIMESTAMP_FORMAT).to_string()),
            Self::Uuid(u) => Some(u.to_string()),
            Self::Array(_) | Self::Object(_) => serde_json::to_string(self).ok(),
        }
    }
}

fn format_double(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_form().unwrap_or_default())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Short(i) => serializer.serialize_i16(*i),
            Self::Int(i) => serializer.serialize_i32(*i),
            Self::Long(i) => serializer.serialize_i64(*i),
            Self::Double(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Date(_) | Self::Timestamp(_) | Self::Uuid(_) => {
                serializer.serialize_str(&self.string_form().unwrap_or_default())
            }
            Self::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Self::Object(record) => record.serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Long(i),
                None => Self::Double(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(values) => {
                Self::Array(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i16> for Value {
    fn from(i: i16) -> Self {
        Self::Short(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Long(i)
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Self::Long(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Self::Object(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field. An existing key keeps its position and returns the
    /// previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fields whose names do not carry the private marker.
    pub fn public_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter(|(k, _)| !is_private_field(k))
    }

    /// Copy of this record without private fields, applied recursively to
    /// nested records.
    pub fn without_private(&self) -> Record {
        self.public_fields()
            .map(|(k, v)| (k.to_string(), strip_private(v)))
            .collect()
    }
}

fn strip_private(value: &Value) -> Value {
    match value {
        Value::Object(record) => Value::Object(record.without_private()),
        Value::Array(values) => Value::Array(values.iter().map(strip_private).collect()),
        other => other.clone(),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_insertion_order() {
        let record = Record::new()
            .with("b", 1)
            .with("a", 2)
            .with("c", 3)
            .with("a", 4);
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(record.get("a"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_private_fields() {
        let nested = Record::new().with("x", 1).with("_hidden", 2);
        let record = Record::new()
            .with("Id", "1")
            .with("_section_ids", vec!["sec1"])
            .with("Nested", nested);
        let public: Vec<&str> = record.public_fields().map(|(k, _)| k).collect();
        assert_eq!(public, vec!["Id", "Nested"]);

        let stripped = record.without_private();
        let nested = stripped.get("Nested").and_then(Value::as_object).unwrap();
        assert!(!nested.contains_key("_hidden"));
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(Value::Null.string_form(), None);
        assert_eq!(Value::Double(4.0).string_form().unwrap(), "4.0");
        assert_eq!(Value::Double(0.523).string_form().unwrap(), "0.523");
        assert_eq!(Value::Bool(true).string_form().unwrap(), "true");
        let ts = NaiveDate::from_ymd_opt(2021, 7, 1)
            .unwrap()
            .and_hms_opt(8, 5, 9)
            .unwrap();
        assert_eq!(
            Value::Timestamp(ts).string_form().unwrap(),
            "2021-07-01 08:05:09"
        );
        assert_eq!(
            Value::from(vec!["a", "b"]).string_form().unwrap(),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn test_serialize_nested_in_order() {
        let record = Record::new()
            .with("Z", "last-name")
            .with("A", Record::new().with("rel", "School"))
            .with("Empty", Value::Array(vec![]));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Z":"last-name","A":{"rel":"School"},"Empty":[]}"#);
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"id": 5, "score": 1.5, "tags": ["x"], "ok": null}"#).unwrap();
        let value = Value::from(json);
        let record = value.as_object().unwrap();
        assert_eq!(record.get("id"), Some(&Value::Long(5)));
        assert_eq!(record.get("score"), Some(&Value::Double(1.5)));
        assert_eq!(record.get("ok"), Some(&Value::Null));
    }
}
