//! In-memory tabular data.
//!
//! A [`Dataset`] is the local stand-in for an engine dataframe: ordered
//! column names plus rows of [`Value`]s. Transformations consume `self` and
//! return a new dataset, so a dataset handed to another stage is never
//! mutated behind its back.

use crate::values::{Record, Value};
use std::collections::HashSet;

/// Error type for dataset operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Row has {actual} values but the dataset has {expected} columns")]
    RowWidth { expected: usize, actual: usize },
}

/// Ordered columns and rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create an empty dataset with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, DatasetError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        check_unique(&columns)?;
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a dataset from columns and rows, checking every row's width.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(columns)?;
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Build a dataset from records.
    ///
    /// Columns are the union of record keys in first-seen order; a record
    /// lacking a column contributes a null.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key.to_string()) {
                    columns.push(key.to_string());
                }
            }
        }
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn require_column(&self, name: &str) -> Result<usize, DatasetError> {
        self.column_index(name)
            .ok_or_else(|| DatasetError::ColumnNotFound(name.to_string()))
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>, DatasetError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Single cell lookup.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), DatasetError> {
        if row.len() != self.columns.len() {
            return Err(DatasetError::RowWidth {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Replace every value of an existing column by mapping it.
    pub fn map_column<F>(mut self, name: &str, mut f: F) -> Result<Self, DatasetError>
    where
        F: FnMut(&Value) -> Value,
    {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(self)
    }

    /// Add a column (or replace an existing one) with values derived from
    /// each row.
    pub fn with_derived_column<F>(mut self, name: &str, mut f: F) -> Self
    where
        F: FnMut(&[String], &[Value]) -> Value,
    {
        let columns = self.columns.clone();
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    let value = f(&columns, row);
                    row[idx] = value;
                }
            }
            None => {
                for row in &mut self.rows {
                    let value = f(&columns, row);
                    row.push(value);
                }
                self.columns.push(name.to_string());
            }
        }
        self
    }

    /// Rename one column. Renaming onto an existing name is rejected.
    pub fn rename_column(mut self, from: &str, to: &str) -> Result<Self, DatasetError> {
        let idx = self.require_column(from)?;
        if from != to && self.has_column(to) {
            return Err(DatasetError::DuplicateColumn(to.to_string()));
        }
        self.columns[idx] = to.to_string();
        Ok(self)
    }

    /// Rename every column at once.
    pub fn rename_columns<F>(mut self, mut f: F) -> Result<Self, DatasetError>
    where
        F: FnMut(&str) -> String,
    {
        let renamed: Vec<String> = self.columns.iter().map(|c| f(c)).collect();
        check_unique(&renamed)?;
        self.columns = renamed;
        Ok(self)
    }

    /// Drop a column; dropping an absent column is a no-op.
    pub fn drop_column(mut self, name: &str) -> Self {
        if let Some(idx) = self.column_index(name) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
        self
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self, DatasetError> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<Vec<_>, _>>()?;
        let columns: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        check_unique(&columns)?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Self { columns, rows })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Append the rows of another dataset with the same columns, matched by
    /// name.
    pub fn append(mut self, other: Dataset) -> Result<Self, DatasetError> {
        let mapping = self
            .columns
            .iter()
            .map(|c| other.require_column(c))
            .collect::<Result<Vec<_>, _>>()?;
        if other.columns.len() != self.columns.len() {
            return Err(DatasetError::RowWidth {
                expected: self.columns.len(),
                actual: other.columns.len(),
            });
        }
        for row in other.rows {
            self.rows
                .push(mapping.iter().map(|&i| row[i].clone()).collect());
        }
        Ok(self)
    }

    /// Rows as ordered records.
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

fn check_unique(columns: &[String]) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(DatasetError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Dataset {
        Dataset::from_rows(
            ["Id", "Name"],
            vec![
                vec![Value::from("A1"), Value::from("Sam")],
                vec![Value::from("A2"), Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_records_unions_columns() {
        let records = vec![
            Record::new().with("Id", "1").with("Name", "Sam"),
            Record::new().with("Id", "2").with("Email", "x@example.com"),
        ];
        let dataset = Dataset::from_records(&records);
        assert_eq!(dataset.columns(), &["Id", "Name", "Email"]);
        assert_eq!(dataset.get(1, "Name"), Some(&Value::Null));
        assert_eq!(dataset.to_records()[0].get_str("Name"), Some("Sam"));
    }

    #[test]
    fn test_row_width_checked() {
        let mut dataset = Dataset::new(["a", "b"]).unwrap();
        let err = dataset.push_row(vec![Value::Null]).unwrap_err();
        assert_eq!(err, DatasetError::RowWidth { expected: 2, actual: 1 });
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        assert!(matches!(
            Dataset::new(["a", "a"]),
            Err(DatasetError::DuplicateColumn(_))
        ));
        assert!(matches!(
            people().rename_column("Id", "Name"),
            Err(DatasetError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_map_and_rename() {
        let dataset = people()
            .map_column("Name", |_| Value::from("*"))
            .unwrap()
            .rename_column("Id", "Id_pseudonym")
            .unwrap();
        assert_eq!(dataset.columns(), &["Id_pseudonym", "Name"]);
        assert_eq!(dataset.get(1, "Name"), Some(&Value::from("*")));
    }

    #[test]
    fn test_derived_column_and_drop() {
        let dataset = people().with_derived_column("Upper", |_, row| {
            Value::from(row[0].to_string().to_lowercase())
        });
        assert_eq!(dataset.get(0, "Upper"), Some(&Value::from("a1")));
        let dataset = dataset.drop_column("Upper").drop_column("Missing");
        assert_eq!(dataset.columns(), &["Id", "Name"]);
    }

    #[test]
    fn test_select_and_append() {
        let selected = people().select(&["Name", "Id"]).unwrap();
        assert_eq!(selected.columns(), &["Name", "Id"]);
        let combined = people().append(selected).unwrap();
        assert_eq!(combined.row_count(), 4);
        assert_eq!(combined.get(2, "Id"), Some(&Value::from("A1")));
        assert!(people().select(&["Nope"]).is_err());
    }
}
