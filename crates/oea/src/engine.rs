//! Table engine capability and its local implementation.
//!
//! A table is a directory of part files (`part-00000.csv`, ...). Reading a
//! table concatenates its part files in name order; reading a single file
//! path reads just that file.

use crate::error::Result;
use oea_core::{Dataset, EntitySchema};
use oea_storage::{join_path, Filesystem, LocalFilesystem};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// File format of a table's part files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// CSV, with or without a header row
    Csv { header: bool },
    /// Newline-delimited JSON
    Jsonl,
}

impl TableFormat {
    pub const CSV: TableFormat = TableFormat::Csv { header: true };

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv { .. } => "csv",
            Self::Jsonl => "json",
        }
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::CSV),
            "jsonl" | "json" | "ndjson" => Ok(Self::Jsonl),
            other => Err(format!("unknown table format '{other}' (expected csv or jsonl)")),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { .. } => f.write_str("csv"),
            Self::Jsonl => f.write_str("jsonl"),
        }
    }
}

/// How a write treats an existing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace every existing part file
    #[default]
    Overwrite,
    /// Add a new part file next to the existing ones
    Append,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "append" => Ok(Self::Append),
            other => Err(format!("unknown write mode '{other}' (expected overwrite or append)")),
        }
    }
}

/// Reads and writes tables as datasets.
pub trait TableEngine {
    /// Read a table (or one file) cast through `schema`.
    fn read(&self, path: &str, format: TableFormat, schema: &EntitySchema) -> Result<Dataset>;

    /// Write a dataset as a table.
    fn write(&self, dataset: &Dataset, path: &str, format: TableFormat, mode: WriteMode) -> Result<()>;
}

/// [`TableEngine`] over any [`Filesystem`].
#[derive(Debug, Clone)]
pub struct LocalTableEngine<F = LocalFilesystem> {
    fs: F,
}

impl<F: Filesystem> LocalTableEngine<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Files making up the table at `path`: its sorted part files when
    /// `path` is a directory, otherwise `path` itself.
    fn table_files(&self, path: &str, format: TableFormat) -> Result<Vec<String>> {
        match self.fs.ls(path) {
            Ok(entries) => Ok(entries
                .into_iter()
                .filter(|e| e.is_file() && e.name.ends_with(&format!(".{}", format.extension())))
                .map(|e| e.path)
                .collect()),
            Err(e) if e.is_not_found() => Err(e.into()),
            Err(_) => Ok(vec![path.to_string()]),
        }
    }

    fn parse(&self, text: &str, format: TableFormat, schema: &EntitySchema) -> Result<Dataset> {
        Ok(match format {
            TableFormat::Csv { header } => csv_types::read_csv(text, schema, header)?,
            TableFormat::Jsonl => json_types::read_ndjson(text, schema)?,
        })
    }

    fn render(&self, dataset: &Dataset, format: TableFormat) -> Result<String> {
        Ok(match format {
            TableFormat::Csv { header } => csv_types::dataset_to_csv(dataset, header)?,
            TableFormat::Jsonl => json_types::dataset_to_ndjson(dataset)?,
        })
    }
}

impl<F: Filesystem> TableEngine for LocalTableEngine<F> {
    fn read(&self, path: &str, format: TableFormat, schema: &EntitySchema) -> Result<Dataset> {
        let files = self.table_files(path, format)?;

        let mut dataset: Option<Dataset> = None;
        for file in &files {
            let text = self.fs.read_to_string(file)?;
            let part = self.parse(&text, format, schema)?;
            if part.columns().is_empty() {
                debug!("Skipping empty part {}", file);
                continue;
            }
            dataset = Some(match dataset {
                None => part,
                Some(acc) => acc.append(part)?,
            });
        }
        let dataset = match dataset {
            Some(dataset) => dataset,
            None => Dataset::new(schema.column_names())?,
        };
        debug!(
            "Read {} rows from {} ({} files, {format})",
            dataset.row_count(),
            path,
            files.len()
        );
        Ok(dataset)
    }

    fn write(&self, dataset: &Dataset, path: &str, format: TableFormat, mode: WriteMode) -> Result<()> {
        let existing = match self.fs.ls(path) {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let index = match mode {
            WriteMode::Overwrite => {
                if self.fs.exists(path)? {
                    self.fs.remove(path, true)?;
                }
                0
            }
            WriteMode::Append => existing
                .iter()
                .filter(|e| e.is_file() && e.name.starts_with("part-"))
                .count(),
        };

        self.fs.mkdirs(path)?;
        let part = join_path(path, &format!("part-{index:05}.{}", format.extension()));
        let text = self.render(dataset, format)?;
        self.fs.put(&part, &text, mode == WriteMode::Overwrite)?;

        info!(
            "Wrote {} rows to {} ({format}, {:?})",
            dataset.row_count(),
            part,
            mode
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oea_core::Value;
    use tempfile::TempDir;

    const STAGE2: &str = "abfss://stage2p@stoeatest.dfs.core.windows.net";

    fn schema() -> EntitySchema {
        EntitySchema::from_triples(
            "Person",
            &[["Id", "string", "hash"], ["Age", "integer", "no-op"]],
        )
        .unwrap()
    }

    fn people(ids: &[&str]) -> Dataset {
        Dataset::from_rows(
            ["Id", "Age"],
            ids.iter()
                .enumerate()
                .map(|(i, id)| vec![Value::from(*id), Value::Int(i as i32)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_overwrite_then_append_round_trip() {
        let temp = TempDir::new().unwrap();
        let engine = LocalTableEngine::new(LocalFilesystem::new(temp.path()));
        let table = format!("{STAGE2}/contoso/Person");

        for format in [TableFormat::CSV, TableFormat::Jsonl] {
            engine
                .write(&people(&["a", "b"]), &table, format, WriteMode::Overwrite)
                .unwrap();
            engine
                .write(&people(&["c"]), &table, format, WriteMode::Append)
                .unwrap();
            let read = engine.read(&table, format, &schema()).unwrap();
            assert_eq!(read.row_count(), 3, "{format}");
            assert_eq!(read.get(2, "Id"), Some(&Value::from("c")));
            assert_eq!(read.get(1, "Age"), Some(&Value::Int(1)));

            engine
                .write(&people(&["z"]), &table, format, WriteMode::Overwrite)
                .unwrap();
            let read = engine.read(&table, format, &schema()).unwrap();
            assert_eq!(read.row_count(), 1, "{format}");
        }
    }

    #[test]
    fn test_empty_part_before_rows() {
        let temp = TempDir::new().unwrap();
        let engine = LocalTableEngine::new(LocalFilesystem::new(temp.path()));
        let table = format!("{STAGE2}/contoso/Person");
        let empty = Dataset::default();

        engine
            .write(&empty, &table, TableFormat::Jsonl, WriteMode::Overwrite)
            .unwrap();
        engine
            .write(&people(&["c"]), &table, TableFormat::Jsonl, WriteMode::Append)
            .unwrap();

        let read = engine.read(&table, TableFormat::Jsonl, &schema()).unwrap();
        assert_eq!(read.row_count(), 1);
        assert_eq!(read.get(0, "Id"), Some(&Value::from("c")));
    }

    #[test]
    fn test_empty_part_after_rows() {
        let temp = TempDir::new().unwrap();
        let engine = LocalTableEngine::new(LocalFilesystem::new(temp.path()));
        let table = format!("{STAGE2}/contoso/Person");

        engine
            .write(&people(&["a", "b"]), &table, TableFormat::Jsonl, WriteMode::Overwrite)
            .unwrap();
        engine
            .write(&Dataset::default(), &table, TableFormat::Jsonl, WriteMode::Append)
            .unwrap();

        let read = engine.read(&table, TableFormat::Jsonl, &schema()).unwrap();
        assert_eq!(read.row_count(), 2);
        assert_eq!(read.get(1, "Id"), Some(&Value::from("b")));
    }

    #[test]
    fn test_table_without_parts_has_schema_columns() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(temp.path());
        let table = format!("{STAGE2}/contoso/Person");
        fs.mkdirs(&table).unwrap();

        let engine = LocalTableEngine::new(fs);
        let read = engine.read(&table, TableFormat::Jsonl, &schema()).unwrap();
        assert!(read.is_empty());
        assert_eq!(read.columns(), ["Id", "Age"]);
    }

    #[test]
    fn test_read_single_file_headerless() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(temp.path());
        let file = format!("{STAGE2}/raw/people.csv");
        fs.put(&file, "a,1\nb,2\n", true).unwrap();

        let engine = LocalTableEngine::new(fs);
        let read = engine
            .read(&file, TableFormat::Csv { header: false }, &schema())
            .unwrap();
        assert_eq!(read.columns(), ["Id", "Age"]);
        assert_eq!(read.get(1, "Age"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("CSV".parse::<TableFormat>().unwrap(), TableFormat::CSV);
        assert_eq!("jsonl".parse::<TableFormat>().unwrap(), TableFormat::Jsonl);
        assert_eq!("append".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert!("delta".parse::<TableFormat>().is_err());
    }
}
