//! Database catalog kept as JSON descriptors.
//!
//! Each database is one file, `<framework>/catalog/<db>.json`, listing its
//! tables and where their data lives. Registering a database over a stage
//! folder adds one table per subfolder; tables already present are left as
//! they are, so `stage2p` and `stage2np` can both feed the `s2_` database.

use crate::engine::TableFormat;
use crate::error::Result;
use oea_storage::{join_path, parse_source_path, Filesystem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One registered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub location: String,
    pub format: String,
}

/// One registered database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    pub name: String,
    pub tables: Vec<TableDescriptor>,
}

impl DatabaseDescriptor {
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Catalog stored under a framework root.
pub struct Catalog<'a, F> {
    fs: &'a F,
    dir: String,
}

impl<'a, F: Filesystem> Catalog<'a, F> {
    pub fn new(fs: &'a F, framework_root: &str) -> Self {
        Self {
            fs,
            dir: join_path(framework_root, "catalog"),
        }
    }

    fn descriptor_path(&self, db_name: &str) -> String {
        join_path(&self.dir, &format!("{db_name}.json"))
    }

    /// The descriptor of `db_name`, or `None` if it was never created.
    pub fn database(&self, db_name: &str) -> Result<Option<DatabaseDescriptor>> {
        match self.fs.read_to_string(&self.descriptor_path(db_name)) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of every registered database, sorted.
    pub fn databases(&self) -> Result<Vec<String>> {
        let entries = match self.fs.ls(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(entries
            .into_iter()
            .filter(|e| e.is_file())
            .filter_map(|e| e.name.strip_suffix(".json").map(str::to_string))
            .collect())
    }

    /// Register a database over the stage folder `source_path`, one table
    /// per subfolder. Returns `Database created: <db>`.
    pub fn create_db(&self, source_path: &str, format: TableFormat) -> Result<String> {
        let source = parse_source_path(source_path)?;
        let db_name = source.db_name();
        let mut descriptor = self.database(&db_name)?.unwrap_or_else(|| DatabaseDescriptor {
            name: db_name.clone(),
            tables: Vec::new(),
        });

        let folders = match self.fs.ls(source_path) {
            Ok(entries) => entries.into_iter().filter(|e| e.is_dir).collect(),
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        for folder in folders {
            if descriptor.table(&folder.name).is_some() {
                debug!("Table {}.{} already registered", db_name, folder.name);
                continue;
            }
            descriptor.tables.push(TableDescriptor {
                name: folder.name,
                location: folder.path,
                format: format.to_string(),
            });
        }

        self.fs.put(
            &self.descriptor_path(&db_name),
            &serde_json::to_string_pretty(&descriptor)?,
            true,
        )?;
        let result = format!("Database created: {db_name}");
        info!("{result} ({} tables)", descriptor.tables.len());
        Ok(result)
    }

    /// Remove a database and all its tables from the catalog; table data is
    /// left in place. Returns `Database dropped: <db>`.
    pub fn drop_db(&self, db_name: &str) -> Result<String> {
        match self.fs.remove(&self.descriptor_path(db_name), false) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => debug!("Database {} was not registered", db_name),
            Err(e) => return Err(e.into()),
        }
        let result = format!("Database dropped: {db_name}");
        info!("{result}");
        Ok(result)
    }

    /// Table names of a database; empty if it does not exist.
    pub fn list_tables(&self, db_name: &str) -> Result<Vec<String>> {
        Ok(self
            .database(db_name)?
            .map(|db| db.tables.into_iter().map(|t| t.name).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oea_storage::{LocalFilesystem, StageRoots};
    use tempfile::TempDir;

    #[test]
    fn test_create_merge_and_drop() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(temp.path());
        let roots = StageRoots::for_account("stoeatest");
        fs.mkdirs(&format!("{}/ms_insights/Person", roots.stage2p)).unwrap();
        fs.mkdirs(&format!("{}/ms_insights/Person_lookup", roots.stage2np)).unwrap();
        fs.put(&format!("{}/ms_insights/stray.txt", roots.stage2p), "x", true)
            .unwrap();

        let catalog = Catalog::new(&fs, &roots.framework);
        assert_eq!(
            catalog
                .create_db(&format!("{}/ms_insights", roots.stage2p), TableFormat::Jsonl)
                .unwrap(),
            "Database created: s2_ms_insights"
        );
        catalog
            .create_db(&format!("{}/ms_insights", roots.stage2np), TableFormat::Jsonl)
            .unwrap();
        // registering twice keeps one entry per table
        catalog
            .create_db(&format!("{}/ms_insights", roots.stage2p), TableFormat::Jsonl)
            .unwrap();

        assert_eq!(
            catalog.list_tables("s2_ms_insights").unwrap(),
            ["Person", "Person_lookup"]
        );
        let db = catalog.database("s2_ms_insights").unwrap().unwrap();
        assert_eq!(
            db.table("Person").unwrap().location,
            format!("{}/ms_insights/Person", roots.stage2p)
        );
        assert_eq!(db.table("Person").unwrap().format, "jsonl");
        assert_eq!(catalog.databases().unwrap(), ["s2_ms_insights"]);

        assert_eq!(
            catalog.drop_db("s2_ms_insights").unwrap(),
            "Database dropped: s2_ms_insights"
        );
        assert!(catalog.list_tables("s2_ms_insights").unwrap().is_empty());
        // dropping again is not an error
        catalog.drop_db("s2_ms_insights").unwrap();
    }

    #[test]
    fn test_create_db_rejects_non_stage_path() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(temp.path());
        let catalog = Catalog::new(&fs, "abfss://oea-framework@acct");
        assert!(catalog
            .create_db("abfss://raw@acct/ms_insights", TableFormat::CSV)
            .is_err());
    }
}
