//! Command handlers.

pub mod generate;
pub mod process;
pub mod pseudonymize;
pub mod stage;

use anyhow::Context;
use oea::Oea;
use oea_storage::StageRoots;

use crate::config::Settings;

/// Helper over the configured local storage root.
pub fn open_oea(settings: &Settings) -> Oea {
    Oea::local(
        &settings.storage_root,
        &settings.storage_account,
        settings.salt.clone(),
    )
}

/// Expand a stage path: full URIs are kept, and a path starting with a
/// container name (`stage2p/ms_insights`) is rooted at that container.
pub fn resolve_stage_path(stages: &StageRoots, path: &str) -> anyhow::Result<String> {
    if path.contains("://") {
        return Ok(path.to_string());
    }
    let trimmed = path.trim_matches('/');
    let (container, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));
    let root = stages.by_name(container).with_context(|| {
        format!("Unknown stage container '{container}' in path '{path}' (expected stage1np, stage2np, stage2p, stage3np, stage3p or oea-framework)")
    })?;
    Ok(oea_storage::join_path(root, rest))
}
