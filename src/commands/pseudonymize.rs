//! `pseudonymize` command: one CSV file in, pseudonymized and lookup CSV out.

use anyhow::Context;
use oea::LOOKUP_SUFFIX;
use oea_core::SchemaRegistry;
use std::path::{Path, PathBuf};
use tracing::info;

/// Files written by [`run_pseudonymize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudonymizeOutput {
    pub pseudonymized: PathBuf,
    /// Absent when the schema declares no `hash` column
    pub lookup: Option<PathBuf>,
    pub rows: usize,
}

/// Pseudonymize a headed CSV file against one entity of a schema file.
pub fn run_pseudonymize(
    input: &Path,
    schema_file: &Path,
    entity: &str,
    output_dir: &Path,
    salt: &str,
) -> anyhow::Result<PseudonymizeOutput> {
    let registry = SchemaRegistry::from_file(schema_file)
        .with_context(|| format!("Failed to load schema from {schema_file:?}"))?;
    let schema = registry
        .get(entity)
        .with_context(|| format!("Schema file {schema_file:?} has no entity '{entity}'"))?;

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {input:?}"))?;
    let dataset = csv_types::read_csv(&text, schema, true)
        .with_context(|| format!("Failed to parse {input:?}"))?;

    let output = oea::pseudonymize(&dataset, schema, salt)
        .with_context(|| format!("Failed to pseudonymize {input:?}"))?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {output_dir:?}"))?;

    let pseudonymized = output_dir.join(format!("{entity}.csv"));
    write_csv(&pseudonymized, &output.pseudonymized)?;

    let lookup = if output.lookup_is_empty() {
        None
    } else {
        let path = output_dir.join(format!("{entity}{LOOKUP_SUFFIX}.csv"));
        write_csv(&path, &output.lookup)?;
        Some(path)
    };

    info!(
        "Pseudonymized {} rows of '{}' into {:?}",
        dataset.row_count(),
        entity,
        output_dir
    );
    Ok(PseudonymizeOutput {
        pseudonymized,
        lookup,
        rows: dataset.row_count(),
    })
}

fn write_csv(path: &Path, dataset: &oea_core::Dataset) -> anyhow::Result<()> {
    let text = csv_types::dataset_to_csv(dataset, true)
        .with_context(|| format!("Failed to render {path:?}"))?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {path:?}"))
}
