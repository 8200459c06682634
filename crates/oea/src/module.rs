//! Per-source-folder processing from stage 1 into stage 2.

use crate::engine::{TableEngine, TableFormat, WriteMode};
use crate::error::Result;
use crate::helper::Oea;
use oea_core::SchemaRegistry;
use oea_storage::{join_path, Filesystem};
use tracing::info;

/// Format of the tables written to stages 2 and 3.
pub const STAGE_TABLE_FORMAT: TableFormat = TableFormat::Jsonl;

/// Suffix of the lookup table written next to a pseudonymized entity.
pub const LOOKUP_SUFFIX: &str = "_lookup";

/// A data source landing under one folder of every stage.
///
/// Entities are read from `stage1np/<folder>/<entity>` and written to
/// `stage2p/<folder>/<entity>` with their lookup in
/// `stage2np/<folder>/<entity>_lookup`. With pseudonymization turned off
/// the entity goes to `stage2np/<folder>/<entity>` with sanitized column
/// names only.
pub struct OeaModule<'a, F, E> {
    oea: &'a Oea<F, E>,
    source_folder: String,
    pseudonymize: bool,
    schemas: SchemaRegistry,
    pub stage1np: String,
    pub stage2np: String,
    pub stage2p: String,
    pub stage3np: String,
    pub stage3p: String,
    pub module_path: String,
}

impl<'a, F: Filesystem, E: TableEngine> OeaModule<'a, F, E> {
    pub fn new(oea: &'a Oea<F, E>, source_folder: &str, schemas: SchemaRegistry) -> Self {
        let stages = oea.stages();
        let under = |root: &str| join_path(root, source_folder);
        Self {
            oea,
            source_folder: source_folder.to_string(),
            pseudonymize: true,
            schemas,
            stage1np: under(&stages.stage1np),
            stage2np: under(&stages.stage2np),
            stage2p: under(&stages.stage2p),
            stage3np: under(&stages.stage3np),
            stage3p: under(&stages.stage3p),
            module_path: join_path(&join_path(&stages.framework, "modules"), source_folder),
        }
    }

    /// Turn pseudonymization on or off (on by default).
    pub fn with_pseudonymize(mut self, pseudonymize: bool) -> Self {
        self.pseudonymize = pseudonymize;
        self
    }

    pub fn source_folder(&self) -> &str {
        &self.source_folder
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Read one entity from stage1np and write it to stage 2.
    pub fn process_entity_from_stage1(
        &self,
        entity_name: &str,
        format: TableFormat,
        mode: WriteMode,
    ) -> Result<()> {
        let schema = self.schemas.get(entity_name)?;
        let dataset = self
            .oea
            .engine()
            .read(&join_path(&self.stage1np, entity_name), format, schema)?;
        let rows = dataset.row_count();
        let engine = self.oea.engine();

        if self.pseudonymize {
            let output = self.oea.pseudonymize(&dataset, schema)?;
            engine.write(
                &output.pseudonymized,
                &join_path(&self.stage2p, entity_name),
                STAGE_TABLE_FORMAT,
                mode,
            )?;
            if !output.lookup_is_empty() {
                engine.write(
                    &output.lookup,
                    &join_path(&self.stage2np, &format!("{entity_name}{LOOKUP_SUFFIX}")),
                    STAGE_TABLE_FORMAT,
                    mode,
                )?;
            }
        } else {
            let fixed = self.oea.fix_column_names(dataset)?;
            engine.write(
                &fixed,
                &join_path(&self.stage2np, entity_name),
                STAGE_TABLE_FORMAT,
                mode,
            )?;
        }

        info!(
            "Processed {}/{} from stage1 ({} rows)",
            self.source_folder, entity_name, rows
        );
        Ok(())
    }

    /// Process every entity the schema registry declares, in name order.
    pub fn process_all_from_stage1(&self, format: TableFormat, mode: WriteMode) -> Result<usize> {
        let entities: Vec<String> = self.schemas.entity_names().map(str::to_string).collect();
        for entity in &entities {
            self.process_entity_from_stage1(entity, format, mode)?;
        }
        Ok(entities.len())
    }

    pub fn delete_stage1(&self) -> Result<()> {
        self.oea.rm_if_exists(&self.stage1np, true)
    }

    pub fn delete_stage2(&self) -> Result<()> {
        self.oea.rm_if_exists(&self.stage2np, true)?;
        self.oea.rm_if_exists(&self.stage2p, true)
    }

    pub fn delete_stage3(&self) -> Result<()> {
        self.oea.rm_if_exists(&self.stage3np, true)?;
        self.oea.rm_if_exists(&self.stage3p, true)
    }

    pub fn delete_all_stages(&self) -> Result<()> {
        self.delete_stage1()?;
        self.delete_stage2()?;
        self.delete_stage3()
    }

    pub fn create_stage2_db(&self) -> Result<String> {
        self.oea.create_db(&self.stage2p, STAGE_TABLE_FORMAT)?;
        self.oea.create_db(&self.stage2np, STAGE_TABLE_FORMAT)
    }

    pub fn create_stage3_db(&self) -> Result<String> {
        self.oea.create_db(&self.stage3p, STAGE_TABLE_FORMAT)?;
        self.oea.create_db(&self.stage3np, STAGE_TABLE_FORMAT)
    }

    /// Copy `<module_path>/test_data` into this module's stage1np folder.
    pub fn copy_test_data_to_stage1(&self) -> Result<()> {
        self.land_from(&join_path(&self.module_path, "test_data"))
    }

    /// Copy a directory tree (a storage URI or a plain local path) into this
    /// module's stage1np folder.
    pub fn land_from(&self, source: &str) -> Result<()> {
        self.oea.fs().copy(source, &self.stage1np, true)?;
        info!("Landed {} in {}", source, self.stage1np);
        Ok(())
    }
}
