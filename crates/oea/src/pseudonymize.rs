//! Column-wise pseudonymization.
//!
//! For each column declared in the entity schema, in declaration order:
//!
//! | Policy           | Pseudonymized output                  | Lookup output                  |
//! |------------------|---------------------------------------|--------------------------------|
//! | `hash`           | digest, renamed `<col>_pseudonym`     | `<col>_pseudonym` and `<col>`  |
//! | `hash-no-lookup` | digest, renamed `<col>_pseudonym`     | absent                         |
//! | `mask`           | `"*"` on every row                    | absent                         |
//! | `no-op`          | unchanged                             | absent                         |
//!
//! Undeclared columns pass through the pseudonymized output untouched and
//! never appear in the lookup. Both outputs get sanitized column names.

use crate::error::{OeaError, Result};
use crate::sanitize::fix_column_names;
use oea_core::{ColumnPolicy, Dataset, EntitySchema, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Suffix appended to hashed column names.
pub const PSEUDONYM_SUFFIX: &str = "_pseudonym";

/// Value written to masked cells.
pub const MASK: &str = "*";

/// Hex SHA-256 of `text + salt`.
pub fn salted_digest(text: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest of a value's string form; null stays null.
pub fn digest_value(value: &Value, salt: &str) -> Value {
    match value.string_form() {
        Some(text) => Value::String(salted_digest(&text, salt)),
        None => Value::Null,
    }
}

pub fn pseudonym_column(column: &str) -> String {
    format!("{column}{PSEUDONYM_SUFFIX}")
}

/// The two datasets produced from one source dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Pseudonymized {
    /// Source rows with hashed and masked columns
    pub pseudonymized: Dataset,
    /// Digest-to-original pairs for every `hash` column
    pub lookup: Dataset,
}

impl Pseudonymized {
    /// True when no column was declared `hash`; callers skip persisting
    /// the lookup in that case.
    pub fn lookup_is_empty(&self) -> bool {
        self.lookup.columns().is_empty()
    }
}

/// Pseudonymize a dataset against its entity schema.
///
/// Fails with [`OeaError::MissingColumn`] if a declared column is absent;
/// no partial output is returned.
pub fn pseudonymize(dataset: &Dataset, schema: &EntitySchema, salt: &str) -> Result<Pseudonymized> {
    for spec in schema.columns() {
        if !dataset.has_column(&spec.name) {
            return Err(OeaError::MissingColumn {
                entity: schema.name.clone(),
                column: spec.name.clone(),
            });
        }
    }

    let mut pseudo = dataset.clone();
    let mut lookup_columns: Vec<String> = Vec::new();
    let mut lookup_rows: Vec<Vec<Value>> = vec![Vec::new(); dataset.row_count()];

    for spec in schema.columns() {
        let name = spec.name.as_str();
        match spec.policy {
            ColumnPolicy::Hash | ColumnPolicy::HashNoLookup => {
                let renamed = pseudonym_column(name);
                pseudo = pseudo
                    .map_column(name, |v| digest_value(v, salt))?
                    .rename_column(name, &renamed)?;

                if spec.policy == ColumnPolicy::Hash {
                    let digests = pseudo.column_values(&renamed)?;
                    let originals = dataset.column_values(name)?;
                    for ((row, digest), original) in
                        lookup_rows.iter_mut().zip(digests).zip(originals)
                    {
                        row.push(digest.clone());
                        row.push(original.clone());
                    }
                    lookup_columns.push(renamed);
                    lookup_columns.push(name.to_string());
                }
            }
            ColumnPolicy::Mask => {
                pseudo = pseudo.map_column(name, |_| Value::from(MASK))?;
            }
            ColumnPolicy::NoOp => {}
        }
    }

    let lookup = if lookup_columns.is_empty() {
        Dataset::default()
    } else {
        Dataset::from_rows(lookup_columns, lookup_rows)?
    };

    debug!(
        "Pseudonymized entity '{}': {} rows, {} lookup columns",
        schema.name,
        pseudo.row_count(),
        lookup.columns().len()
    );

    Ok(Pseudonymized {
        pseudonymized: fix_column_names(pseudo)?,
        lookup: fix_column_names(lookup)?,
    })
}
