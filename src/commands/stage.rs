//! Stage inspection commands: `stage ...`, `schema-starter` and `sample`.
//!
//! Each handler returns the text the CLI prints.

use anyhow::Context;
use oea::TableFormat;
use std::fmt::Write as _;

use super::{open_oea, resolve_stage_path};
use crate::config::Settings;

/// Folders (with a trailing `/`) then files directly under a stage path.
pub fn run_ls(settings: &Settings, path: &str) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    let path = resolve_stage_path(oea.stages(), path)?;
    let (folders, files) = oea
        .ls(&path)
        .with_context(|| format!("Failed to list {path}"))?;
    let mut out = String::new();
    for folder in folders {
        let _ = writeln!(out, "{folder}/");
    }
    for file in files {
        let _ = writeln!(out, "{file}");
    }
    Ok(out)
}

/// Each folder of a stage with its entities.
pub fn run_describe(settings: &Settings, path: &str) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    let path = resolve_stage_path(oea.stages(), path)?;
    oea.describe_stage(&path)
        .with_context(|| format!("Failed to describe {path}"))
}

/// Stage number, zone, account, subject and database name of a path.
pub fn run_parse(settings: &Settings, path: &str) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    let path = resolve_stage_path(oea.stages(), path)?;
    let info = oea.parse_source_path(&path)?;
    Ok(format!(
        "stage_num: {}\nzone: {}\naccount: {}\nsubject: {}\ndb_name: {}\n",
        info.stage_num,
        info.zone.suffix(),
        info.account,
        info.subject,
        info.db_name()
    ))
}

pub fn run_create_db(settings: &Settings, path: &str, format: TableFormat) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    let path = resolve_stage_path(oea.stages(), path)?;
    oea.create_db(&path, format)
        .with_context(|| format!("Failed to create a database over {path}"))
}

pub fn run_drop_db(settings: &Settings, db_name: &str) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    oea.drop_db(db_name)
        .with_context(|| format!("Failed to drop database {db_name}"))
}

pub fn run_rm(settings: &Settings, path: &str) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    let path = resolve_stage_path(oea.stages(), path)?;
    oea.rm_if_exists(&path, true)
        .with_context(|| format!("Failed to remove {path}"))?;
    Ok(format!("Removed: {path}"))
}

/// Starter YAML schema for a headed CSV file in a stage.
pub fn run_schema_starter(settings: &Settings, entity: &str, input: &str) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    let path = resolve_stage_path(oea.stages(), input)?;
    oea.schema_starter_from_csv(entity, &path, None)
        .with_context(|| format!("Failed to build a schema from {path}"))
}

/// The complete lines at the start of a CSV file, re-rendered as CSV.
pub fn run_sample(settings: &Settings, path: &str, header: bool) -> anyhow::Result<String> {
    let oea = open_oea(settings);
    let path = resolve_stage_path(oea.stages(), path)?;
    let sample = oea
        .load_sample_from_csv_file(&path, header, None)
        .with_context(|| format!("Failed to sample {path}"))?;
    Ok(csv_types::dataset_to_csv(&sample, header)?)
}
