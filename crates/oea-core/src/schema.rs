//! Entity schema declarations.
//!
//! An entity schema is an ordered list of `(column, semantic type, policy)`
//! triples. A schema file holds one entity per top-level key:
//!
//! ```yaml
//! Person:
//!   - [Id, string, hash]
//!   - [Name, string, no-op]
//! ```
//!
//! Policy aliases (`h`, `hnl`, `m`, `x`) are accepted only while parsing;
//! in memory a policy is always one of the four [`ColumnPolicy`] variants.

use crate::types::{SemanticType, StorageField, StorageSchema};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Policy token outside the accepted set
    #[error("Invalid pseudonymization policy '{token}' for column '{column}'")]
    InvalidPolicy { column: String, token: String },

    /// Semantic type token outside the accepted set
    #[error("Unknown type '{token}' for column '{column}'")]
    UnknownType { column: String, token: String },

    /// Column declared twice in one entity
    #[error("Column '{column}' declared more than once in entity '{entity}'")]
    DuplicateColumn { entity: String, column: String },

    /// Entity missing from the registry
    #[error("Entity not found: {0}")]
    EntityNotFound(String),
}

// ============================================================================
// Column Policies
// ============================================================================

/// How a column is treated during pseudonymization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnPolicy {
    /// Replace with a salted digest; keep the original in the lookup table
    Hash,
    /// Replace with a salted digest; keep nothing in the lookup table
    HashNoLookup,
    /// Replace with `"*"`
    Mask,
    /// Pass through unchanged
    NoOp,
}

impl ColumnPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::HashNoLookup => "hash-no-lookup",
            Self::Mask => "mask",
            Self::NoOp => "no-op",
        }
    }

    /// Parse a policy token, accepting the short aliases.
    ///
    /// Returns `None` for an unrecognized token; callers attach the column
    /// name when turning that into [`SchemaError::InvalidPolicy`].
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "hash" | "h" => Some(Self::Hash),
            "hash-no-lookup" | "hnl" => Some(Self::HashNoLookup),
            "mask" | "m" => Some(Self::Mask),
            "no-op" | "x" => Some(Self::NoOp),
            _ => None,
        }
    }

    /// Whether the column is replaced by a digest.
    pub fn is_hashed(&self) -> bool {
        matches!(self, Self::Hash | Self::HashNoLookup)
    }
}

impl fmt::Display for ColumnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Column and Entity Schemas
// ============================================================================

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub semantic_type: SemanticType,
    pub policy: ColumnPolicy,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType, policy: ColumnPolicy) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            policy,
        }
    }

    /// Build a column from its three raw tokens.
    pub fn from_tokens(name: &str, type_token: &str, policy_token: &str) -> Result<Self, SchemaError> {
        let semantic_type = type_token
            .parse::<SemanticType>()
            .map_err(|_| SchemaError::UnknownType {
                column: name.to_string(),
                token: type_token.to_string(),
            })?;
        let policy = ColumnPolicy::parse(policy_token).ok_or_else(|| SchemaError::InvalidPolicy {
            column: name.to_string(),
            token: policy_token.to_string(),
        })?;
        Ok(Self::new(name, semantic_type, policy))
    }
}

impl Serialize for ColumnSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (
            self.name.as_str(),
            self.semantic_type.as_str(),
            self.policy.as_str(),
        )
            .serialize(serializer)
    }
}

/// Ordered column declarations for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: String,
    columns: Vec<ColumnSpec>,
}

impl EntitySchema {
    /// Create an entity schema, rejecting duplicate column names.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    entity: name,
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { name, columns })
    }

    /// Build from raw `[column, type, policy]` token triples.
    pub fn from_triples<S: AsRef<str>>(
        name: impl Into<String>,
        triples: &[[S; 3]],
    ) -> Result<Self, SchemaError> {
        let columns = triples
            .iter()
            .map(|[column, ty, policy]| {
                ColumnSpec::from_tokens(column.as_ref(), ty.as_ref(), policy.as_ref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, columns)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Storage schema for the table format, one nullable field per column.
    pub fn to_storage_schema(&self) -> StorageSchema {
        StorageSchema {
            fields: self
                .columns
                .iter()
                .map(|c| StorageField {
                    name: c.name.clone(),
                    data_type: c.semantic_type.storage_type(),
                    nullable: true,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Schema Registry
// ============================================================================

/// Raw on-disk layout: entity name to list of token triples.
type RawRegistry = BTreeMap<String, Vec<(String, String, String)>>;

/// Collection of entity schemas loaded from a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    entities: BTreeMap<String, EntitySchema>,
}

impl SchemaRegistry {
    /// Load a registry from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a registry from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let raw: RawRegistry = serde_yaml::from_str(yaml)?;
        let mut entities = BTreeMap::new();
        for (entity, triples) in raw {
            let columns = triples
                .iter()
                .map(|(column, ty, policy)| ColumnSpec::from_tokens(column, ty, policy))
                .collect::<Result<Vec<_>, _>>()?;
            let schema = EntitySchema::new(entity.clone(), columns)?;
            entities.insert(entity, schema);
        }
        Ok(Self { entities })
    }

    pub fn insert(&mut self, schema: EntitySchema) {
        self.entities.insert(schema.name.clone(), schema);
    }

    /// Get an entity schema by name.
    pub fn get(&self, entity: &str) -> Result<&EntitySchema, SchemaError> {
        self.entities
            .get(entity)
            .ok_or_else(|| SchemaError::EntityNotFound(entity.to_string()))
    }

    /// Entity names in sorted order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Render back to YAML with canonical policy tokens.
    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        let raw: BTreeMap<&str, &[ColumnSpec]> = self
            .entities
            .iter()
            .map(|(name, schema)| (name.as_str(), schema.columns()))
            .collect();
        Ok(serde_yaml::to_string(&raw)?)
    }
}
