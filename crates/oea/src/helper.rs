//! The [`Oea`] helper: stage roots plus the storage, table and
//! pseudonymization operations used by modules and notebooks.

use crate::catalog::Catalog;
use crate::engine::{LocalTableEngine, TableEngine, TableFormat};
use crate::error::{OeaError, Result};
use crate::pseudonymize::{pseudonymize, Pseudonymized};
use crate::sanitize;
use oea_core::{
    ColumnPolicy, ColumnSpec, Dataset, EntitySchema, Record, SchemaRegistry, SemanticType,
    StorageSchema, Value,
};
use oea_storage::{
    join_path, Filesystem, LocalFilesystem, SourcePathInfo, StageRoots, StorageLocation,
    DEFAULT_HEAD_BYTES,
};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Storage account name derived from a workspace name: `stoea` followed by
/// the workspace name without its 8-character prefix.
///
/// ```
/// assert_eq!(oea::account_from_workspace("syn-oea-cisd3gg"), "stoeacisd3gg");
/// ```
pub fn account_from_workspace(workspace_name: &str) -> String {
    let id: String = workspace_name.chars().skip(8).collect();
    format!("stoea{id}")
}

/// `path` under `stage`, or `path` itself when it is already a full URI.
fn in_stage(stage: &str, path: &str) -> String {
    if StorageLocation::is_uri(path) {
        path.to_string()
    } else {
        join_path(stage, path)
    }
}

/// Narrowest value a CSV cell's text reads as: integer, double, boolean,
/// else text.
fn guess_value(value: &Value) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };
    if let Ok(int) = text.parse::<i32>() {
        Value::Int(int)
    } else if let Ok(double) = text.parse::<f64>() {
        Value::Double(double)
    } else if let Ok(flag) = text.to_ascii_lowercase().parse::<bool>() {
        Value::Bool(flag)
    } else {
        value.clone()
    }
}

/// Entry point to the stages of one storage account.
pub struct Oea<F = LocalFilesystem, E = LocalTableEngine<LocalFilesystem>> {
    fs: F,
    engine: E,
    salt: String,
    stages: StageRoots,
}

impl Oea {
    /// Helper over a local directory standing in for `account`.
    pub fn local(root: impl Into<PathBuf>, account: &str, salt: impl Into<String>) -> Self {
        let fs = LocalFilesystem::new(root);
        let engine = LocalTableEngine::new(fs.clone());
        Self::new(fs, engine, StageRoots::for_account(account), salt)
    }
}

impl<F: Filesystem, E: TableEngine> Oea<F, E> {
    pub fn new(fs: F, engine: E, stages: StageRoots, salt: impl Into<String>) -> Self {
        let oea = Self {
            fs,
            engine,
            salt: salt.into(),
            stages,
        };
        if oea.salt.is_empty() {
            warn!("No salt configured; pseudonyms are plain SHA-256 digests");
        }
        debug!("OEA initialized for {}", oea.stages.stage1np);
        oea
    }

    pub fn stages(&self) -> &StageRoots {
        &self.stages
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    fn catalog(&self) -> Catalog<'_, F> {
        Catalog::new(&self.fs, &self.stages.framework)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load `<stage>/<folder>/<table>` (stage defaults to `stage2p`).
    pub fn load(
        &self,
        folder: &str,
        table: &str,
        stage: Option<&str>,
        format: TableFormat,
        schema: &EntitySchema,
    ) -> Result<Dataset> {
        let stage = stage.unwrap_or(self.stages.stage2p.as_str());
        let path = join_path(&join_path(stage, folder), table);
        self.engine.read(&path, format, schema)
    }

    /// Load a CSV table or file (with header) from stage1np.
    pub fn load_from_stage1(&self, path_and_filename: &str, schema: &EntitySchema) -> Result<Dataset> {
        let path = join_path(&self.stages.stage1np, path_and_filename);
        self.engine.read(&path, TableFormat::CSV, schema)
    }

    /// Parse the complete lines among the first bytes of a CSV file as
    /// text columns. A relative path is taken under `stage` (default
    /// `stage1np`); a full URI is used as given.
    pub fn load_sample_from_csv_file(
        &self,
        path_and_filename: &str,
        header: bool,
        stage: Option<&str>,
    ) -> Result<Dataset> {
        let path = in_stage(stage.unwrap_or(self.stages.stage1np.as_str()), path_and_filename);
        let head = self.fs.head(&path, DEFAULT_HEAD_BYTES)?;
        let end = head
            .rfind('\n')
            .ok_or_else(|| OeaError::IncompleteSample(path.clone()))?;
        Ok(csv_types::read_csv_untyped(&head[..=end], header)?)
    }

    /// Each folder of a stage with the folders inside it, one per line.
    pub fn describe_stage(&self, path: &str) -> Result<String> {
        let mut msg = format!("{path}\n");
        for folder in self.get_folders(path)? {
            let entities = self.get_folders(&join_path(path, &folder))?;
            let _ = writeln!(msg, "{folder}: [{}]", entities.join(", "));
        }
        Ok(msg)
    }

    // ------------------------------------------------------------------
    // Schema and pseudonymization
    // ------------------------------------------------------------------

    pub fn fix_column_names(&self, dataset: Dataset) -> Result<Dataset> {
        sanitize::fix_column_names(dataset)
    }

    pub fn to_storage_schema(&self, schema: &EntitySchema) -> StorageSchema {
        schema.to_storage_schema()
    }

    /// Pseudonymize with this helper's salt.
    pub fn pseudonymize(&self, dataset: &Dataset, schema: &EntitySchema) -> Result<Pseudonymized> {
        pseudonymize(dataset, schema, &self.salt)
    }

    /// Starter YAML schema for a dataset: every column `no-op`, typed from
    /// its first non-null value (`string` when all values are null).
    pub fn schema_starter(&self, entity_name: &str, dataset: &Dataset) -> Result<String> {
        let columns = dataset
            .columns()
            .iter()
            .map(|name| -> Result<ColumnSpec> {
                let semantic_type = dataset
                    .column_values(name)?
                    .into_iter()
                    .find_map(SemanticType::infer)
                    .unwrap_or(SemanticType::String);
                Ok(ColumnSpec::new(name.clone(), semantic_type, ColumnPolicy::NoOp))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut registry = SchemaRegistry::default();
        registry.insert(EntitySchema::new(entity_name, columns)?);
        Ok(registry.to_yaml()?)
    }

    /// Starter schema for the sample of a CSV file, guessing each column's
    /// type from the text of its first non-empty cell.
    pub fn schema_starter_from_csv(
        &self,
        entity_name: &str,
        path_and_filename: &str,
        stage: Option<&str>,
    ) -> Result<String> {
        let sample = self.load_sample_from_csv_file(path_and_filename, true, stage)?;
        let columns: Vec<String> = sample.columns().to_vec();
        let mut typed = sample;
        for column in &columns {
            typed = typed.map_column(column, guess_value)?;
        }
        self.schema_starter(entity_name, &typed)
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    pub fn path_exists(&self, path: &str) -> Result<bool> {
        match self.fs.ls(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            // a file is not listable but still exists
            Err(_) => Ok(self.fs.exists(path)?),
        }
    }

    /// `(folders, files)` directly under `path`; both empty if it does not
    /// exist.
    pub fn ls(&self, path: &str) -> Result<(Vec<String>, Vec<String>)> {
        let entries = match self.fs.ls(path) {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => {
                warn!("Could not list {path}; it may not exist");
                return Ok((Vec::new(), Vec::new()));
            }
            Err(e) => return Err(e.into()),
        };
        let (folders, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| e.is_dir);
        Ok((
            folders.into_iter().map(|e| e.name).collect(),
            files.into_iter().map(|e| e.name).collect(),
        ))
    }

    pub fn get_folders(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.ls(path)?.0)
    }

    /// Remove `path` if it exists.
    pub fn rm_if_exists(&self, path: &str, recursive: bool) -> Result<()> {
        match self.fs.remove(path, recursive) {
            Ok(()) => {
                info!("Removed {path}");
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn pop_from_path(&self, path: &str) -> Result<(String, String)> {
        Ok(oea_storage::pop_from_path(path)?)
    }

    pub fn parse_source_path(&self, path: &str) -> Result<SourcePathInfo> {
        Ok(oea_storage::parse_source_path(path)?)
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn create_db(&self, source_path: &str, format: TableFormat) -> Result<String> {
        self.catalog().create_db(source_path, format)
    }

    pub fn drop_db(&self, db_name: &str) -> Result<String> {
        self.catalog().drop_db(db_name)
    }

    pub fn list_tables(&self, db_name: &str) -> Result<Vec<String>> {
        self.catalog().list_tables(db_name)
    }

    // ------------------------------------------------------------------
    // Landing CSV
    // ------------------------------------------------------------------

    /// Write records as one headed CSV file, replacing any existing file
    /// (container defaults to `stage1np`).
    pub fn write_rows_as_csv(
        &self,
        rows: &[Record],
        folder: &str,
        filename: &str,
        container: Option<&str>,
    ) -> Result<()> {
        let container = container.unwrap_or(self.stages.stage1np.as_str());
        let path = join_path(&join_path(container, folder), filename);
        let text = csv_types::records_to_csv(rows, true)?;
        self.fs.put(&path, &text, true)?;
        debug!("Wrote {} rows to {path}", rows.len());
        Ok(())
    }

    /// Write each entity's records as `<folder>/<entity>.csv`.
    pub fn write_rowset_as_csv<K: AsRef<str>>(
        &self,
        rowset: &[(K, Vec<Record>)],
        folder: &str,
        container: Option<&str>,
    ) -> Result<()> {
        for (entity, rows) in rowset {
            self.write_rows_as_csv(rows, folder, &format!("{}.csv", entity.as_ref()), container)?;
        }
        Ok(())
    }
}
