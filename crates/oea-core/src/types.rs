//! Semantic column types and their mapping to columnar storage types.
//!
//! `SemanticType` is the closed set of type tokens accepted in an entity
//! schema. Each variant maps exhaustively to a [`StorageType`] (the type the
//! columnar table format stores) and knows how to cast a raw text cell into a
//! [`Value`].

use crate::values::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Semantic type of a declared column.
///
/// # YAML Format
///
/// Types are written as lowercase tokens inside the schema triple:
/// ```yaml
/// - [Id, string, hash]
/// - [Grade, short, no-op]
/// - [LastModifiedDate, timestamp, no-op]
/// ```
///
/// Parsing is case-insensitive, so `String` and `STRING` are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// UTF-8 text
    String,
    /// 32-bit signed integer
    Integer,
    /// 64-bit IEEE 754 floating point
    Double,
    /// Boolean
    Boolean,
    /// Timestamp without timezone
    Timestamp,
    /// 16-bit signed integer
    Short,
    /// Array of text values
    Array,
}

impl SemanticType {
    /// Every semantic type, in declaration order.
    pub const ALL: [SemanticType; 7] = [
        SemanticType::String,
        SemanticType::Integer,
        SemanticType::Double,
        SemanticType::Boolean,
        SemanticType::Timestamp,
        SemanticType::Short,
        SemanticType::Array,
    ];

    /// Canonical schema token for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Short => "short",
            Self::Array => "array",
        }
    }

    /// Storage type used by the columnar table format.
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::String => StorageType::Utf8,
            Self::Integer => StorageType::Int32,
            Self::Double => StorageType::Float64,
            Self::Boolean => StorageType::Boolean,
            Self::Timestamp => StorageType::Timestamp,
            Self::Short => StorageType::Int16,
            Self::Array => StorageType::List(Box::new(StorageType::Utf8)),
        }
    }

    /// Cast a raw text cell into a value of this type.
    ///
    /// Empty cells are null for every type.
    pub fn cast(&self, raw: &str) -> Result<Value, CastError> {
        if raw.is_empty() {
            return Ok(Value::Null);
        }
        let invalid = || CastError {
            value: raw.to_string(),
            target: *self,
        };
        let trimmed = raw.trim();

        match self {
            Self::String => Ok(Value::String(raw.to_string())),
            Self::Integer => trimmed.parse::<i32>().map(Value::Int).map_err(|_| invalid()),
            Self::Short => trimmed.parse::<i16>().map(Value::Short).map_err(|_| invalid()),
            Self::Double => trimmed.parse::<f64>().map(Value::Double).map_err(|_| invalid()),
            Self::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            Self::Timestamp => parse_timestamp(trimmed)
                .map(Value::Timestamp)
                .ok_or_else(invalid),
            Self::Array => {
                let elements: Vec<serde_json::Value> =
                    serde_json::from_str(trimmed).map_err(|_| invalid())?;
                Ok(Value::Array(
                    elements
                        .into_iter()
                        .map(|element| match element {
                            serde_json::Value::Null => Value::Null,
                            serde_json::Value::String(s) => Value::String(s),
                            other => Value::String(other.to_string()),
                        })
                        .collect(),
                ))
            }
        }
    }

    /// Best-effort semantic type of an already materialized value.
    ///
    /// Returns `None` for nulls, whose type cannot be observed.
    pub fn infer(value: &Value) -> Option<SemanticType> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Boolean),
            Value::Short(_) => Some(Self::Short),
            Value::Int(_) => Some(Self::Integer),
            Value::Long(_) | Value::Double(_) => Some(Self::Double),
            Value::Date(_) | Value::Timestamp(_) => Some(Self::Timestamp),
            Value::Array(_) => Some(Self::Array),
            Value::String(_) | Value::Uuid(_) | Value::Object(_) => Some(Self::String),
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == lowered)
            .ok_or_else(|| UnknownTypeError(s.to_string()))
    }
}

impl Serialize for SemanticType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SemanticType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

/// Unrecognized semantic type token.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown semantic type '{0}'")]
pub struct UnknownTypeError(pub String);

/// A raw cell could not be cast to the column's semantic type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot cast '{value}' to {target}")]
pub struct CastError {
    /// Raw cell text
    pub value: String,
    /// Type the cell was cast to
    pub target: SemanticType,
}

/// Physical type in the columnar table format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    Utf8,
    Int16,
    Int32,
    Float64,
    Boolean,
    Timestamp,
    List(Box<StorageType>),
}

impl StorageType {
    /// Type name as the table format prints it.
    pub fn type_name(&self) -> String {
        match self {
            Self::Utf8 => "string".to_string(),
            Self::Int16 => "smallint".to_string(),
            Self::Int32 => "int".to_string(),
            Self::Float64 => "double".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Timestamp => "timestamp".to_string(),
            Self::List(element) => format!("array<{}>", element.type_name()),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// A single field of a storage schema. Fields are always nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageField {
    pub name: String,
    pub data_type: StorageType,
    pub nullable: bool,
}

/// Ordered storage schema derived from an entity schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageSchema {
    pub fields: Vec<StorageField>,
}

impl StorageSchema {
    /// Render as `struct<name:type,...>`.
    pub fn simple_string(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{}:{}", f.name, f.data_type))
            .collect();
        format!("struct<{}>", fields.join(","))
    }
}

/// Timestamp layouts accepted when casting text cells.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens_case_insensitive() {
        assert_eq!("string".parse::<SemanticType>().unwrap(), SemanticType::String);
        assert_eq!("Integer".parse::<SemanticType>().unwrap(), SemanticType::Integer);
        assert_eq!("SHORT".parse::<SemanticType>().unwrap(), SemanticType::Short);
        assert!("varchar".parse::<SemanticType>().is_err());
    }

    #[test]
    fn test_storage_mapping_is_exhaustive() {
        let names: Vec<String> = SemanticType::ALL
            .iter()
            .map(|t| t.storage_type().type_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "string",
                "int",
                "double",
                "boolean",
                "timestamp",
                "smallint",
                "array<string>"
            ]
        );
    }

    #[test]
    fn test_cast_scalars() {
        assert_eq!(SemanticType::Integer.cast("42").unwrap(), Value::Int(42));
        assert_eq!(SemanticType::Short.cast(" 7 ").unwrap(), Value::Short(7));
        assert_eq!(SemanticType::Double.cast("2.5").unwrap(), Value::Double(2.5));
        assert_eq!(SemanticType::Boolean.cast("True").unwrap(), Value::Bool(true));
        assert_eq!(
            SemanticType::String.cast("hello").unwrap(),
            Value::String("hello".to_string())
        );
    }

    #[test]
    fn test_cast_empty_is_null() {
        for ty in SemanticType::ALL {
            assert_eq!(ty.cast("").unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_cast_invalid() {
        let err = SemanticType::Integer.cast("abc").unwrap_err();
        assert_eq!(err.target, SemanticType::Integer);
        assert!(SemanticType::Short.cast("70000").is_err());
        assert!(SemanticType::Boolean.cast("maybe").is_err());
    }

    #[test]
    fn test_cast_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2020, 8, 13)
            .unwrap()
            .and_hms_opt(10, 36, 44)
            .unwrap();
        assert_eq!(
            SemanticType::Timestamp.cast("2020-08-13 10:36:44").unwrap(),
            Value::Timestamp(expected)
        );
        assert_eq!(
            SemanticType::Timestamp.cast("8/13/2020 10:36:44 AM").unwrap(),
            Value::Timestamp(expected)
        );
        let midnight = NaiveDate::from_ymd_opt(2004, 4, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            SemanticType::Timestamp.cast("4/2/2004").unwrap(),
            Value::Timestamp(midnight)
        );
    }

    #[test]
    fn test_cast_array() {
        let value = SemanticType::Array.cast(r#"["a", "b", 3]"#).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::String("a".to_string()),
                Value::String("b".to_string()),
                Value::String("3".to_string()),
            ])
        );
    }

    #[test]
    fn test_storage_schema_simple_string() {
        let schema = StorageSchema {
            fields: vec![
                StorageField {
                    name: "Id".to_string(),
                    data_type: StorageType::Utf8,
                    nullable: true,
                },
                StorageField {
                    name: "Tags".to_string(),
                    data_type: StorageType::List(Box::new(StorageType::Utf8)),
                    nullable: true,
                },
            ],
        };
        assert_eq!(schema.simple_string(), "struct<Id:string,Tags:array<string>>");
    }
}
