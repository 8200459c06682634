//! `process` and `land` commands.

use anyhow::Context;
use oea::{OeaModule, TableFormat, WriteMode};
use oea_core::SchemaRegistry;
use std::path::Path;
use tracing::info;

use super::open_oea;
use crate::config::Settings;

/// Options of the `process` command.
#[derive(Debug, Clone)]
pub struct ProcessOptions<'a> {
    pub source_folder: &'a str,
    pub schema_file: &'a Path,
    /// Entities to process; all entities of the schema file when empty
    pub entities: &'a [String],
    /// Format of the landed stage 1 files
    pub format: TableFormat,
    pub pseudonymize: bool,
    pub write_mode: WriteMode,
    /// Register the stage 2 database afterwards
    pub create_db: bool,
}

/// Move entities of a source folder from stage1np into stage 2.
/// Returns the number of entities processed.
pub fn run_process(settings: &Settings, options: &ProcessOptions<'_>) -> anyhow::Result<usize> {
    let registry = SchemaRegistry::from_file(options.schema_file)
        .with_context(|| format!("Failed to load schema from {:?}", options.schema_file))?;
    let oea = open_oea(settings);
    let module = OeaModule::new(&oea, options.source_folder, registry)
        .with_pseudonymize(options.pseudonymize);

    let processed = if options.entities.is_empty() {
        module
            .process_all_from_stage1(options.format, options.write_mode)
            .with_context(|| format!("Failed to process '{}'", options.source_folder))?
    } else {
        for entity in options.entities {
            module
                .process_entity_from_stage1(entity, options.format, options.write_mode)
                .with_context(|| {
                    format!("Failed to process {}/{entity}", options.source_folder)
                })?;
        }
        options.entities.len()
    };

    if options.create_db {
        let result = module
            .create_stage2_db()
            .context("Failed to register the stage 2 database")?;
        info!("{result}");
    }
    Ok(processed)
}

/// Copy a local directory of test data into `stage1np/<source_folder>`.
pub fn run_land(settings: &Settings, source_folder: &str, input: &Path) -> anyhow::Result<String> {
    if !input.is_dir() {
        anyhow::bail!("Input {input:?} is not a directory");
    }
    let oea = open_oea(settings);
    let module = OeaModule::new(&oea, source_folder, SchemaRegistry::default());
    module
        .land_from(&input.to_string_lossy())
        .with_context(|| format!("Failed to land {input:?} in {}", module.stage1np))?;
    Ok(module.stage1np.clone())
}
