//! Column names safe for the columnar table format.

use crate::error::Result;
use oea_core::Dataset;
use once_cell::sync::Lazy;
use regex::Regex;

static INVALID_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid column name pattern"));

/// Collapse every run of characters outside `[A-Za-z0-9_]` to one `_`.
///
/// ```
/// use oea::sanitize_column_name;
///
/// assert_eq!(sanitize_column_name("SIS ID"), "SIS_ID");
/// assert_eq!(sanitize_column_name("City/Region"), "City_Region");
/// ```
pub fn sanitize_column_name(name: &str) -> String {
    INVALID_RUN.replace_all(name, "_").into_owned()
}

/// Sanitize every column name of a dataset.
///
/// Two columns that sanitize to the same name are rejected with
/// `DuplicateColumn`.
pub fn fix_column_names(dataset: Dataset) -> Result<Dataset> {
    let renamed: Vec<String> = dataset
        .columns()
        .iter()
        .map(|c| sanitize_column_name(c))
        .collect();
    let mut names = renamed.into_iter();
    Ok(dataset.rename_columns(|_| names.next().unwrap_or_default())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OeaError;
    use oea_core::{DatasetError, Value};

    #[test]
    fn test_runs_collapse() {
        assert_eq!(sanitize_column_name("a  ,;{}()\n\t=b"), "a_b");
        assert_eq!(sanitize_column_name("Grade (9-12)"), "Grade_9_12_");
        assert_eq!(sanitize_column_name("already_ok_1"), "already_ok_1");
        assert_eq!(sanitize_column_name(""), "");
    }

    #[test]
    fn test_idempotent() {
        for name in ["SIS ID", "City/Region", "x==y", "Zoë's col", "_private"] {
            let once = sanitize_column_name(name);
            assert_eq!(sanitize_column_name(&once), once);
        }
    }

    #[test]
    fn test_fix_column_names_keeps_rows() {
        let dataset = Dataset::from_rows(
            ["SIS ID", "First Name"],
            vec![vec![Value::from("st1"), Value::from("Ann")]],
        )
        .unwrap();
        let fixed = fix_column_names(dataset).unwrap();
        assert_eq!(fixed.columns(), ["SIS_ID", "First_Name"]);
        assert_eq!(fixed.get(0, "First_Name"), Some(&Value::from("Ann")));
    }

    #[test]
    fn test_fix_column_names_collision() {
        let dataset = Dataset::new(["a b", "a-b"]).unwrap();
        assert!(matches!(
            fix_column_names(dataset),
            Err(OeaError::Dataset(DatasetError::DuplicateColumn(_)))
        ));
    }
}
