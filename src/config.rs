//! Global settings: CLI flags and environment over an optional YAML file.

use anyhow::Context;
use clap::Args;
use oea::account_from_workspace;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory standing in for the storage account when none is configured.
pub const DEFAULT_STORAGE_ROOT: &str = "./lake";

/// Storage account used when neither an account nor a workspace is known.
pub const DEFAULT_STORAGE_ACCOUNT: &str = "stoealocal";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Options accepted by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// YAML configuration file
    #[arg(long, global = true, env = "OEA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "OEA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Local directory holding the stage containers
    #[arg(long, global = true, env = "OEA_STORAGE_ROOT")]
    pub storage_root: Option<PathBuf>,

    /// Storage account name, e.g. stoeaxyz
    #[arg(long, global = true, env = "OEA_STORAGE_ACCOUNT")]
    pub storage_account: Option<String>,

    /// Workspace name; the storage account is derived from it when not given
    #[arg(long, global = true, env = "OEA_WORKSPACE_NAME")]
    pub workspace_name: Option<String>,

    /// Salt appended to values before hashing
    #[arg(long, global = true, env = "OEA_SALT", hide_env_values = true)]
    pub salt: Option<String>,
}

/// Contents of the configuration file; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub storage_root: Option<PathBuf>,
    pub storage_account: Option<String>,
    pub workspace_name: Option<String>,
    pub salt: Option<String>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {path:?}"))
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub storage_root: PathBuf,
    pub storage_account: String,
    pub salt: String,
    pub log_level: String,
}

impl Settings {
    /// Load the config file named by `opts` (if any) and resolve.
    pub fn load(opts: &GlobalOpts) -> anyhow::Result<Self> {
        let file = match &opts.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(opts, file))
    }

    /// CLI/env values win over the file, the file over defaults. An explicit
    /// account wins over one derived from a workspace name.
    pub fn resolve(opts: &GlobalOpts, file: FileConfig) -> Self {
        let account = opts
            .storage_account
            .clone()
            .or_else(|| opts.workspace_name.as_deref().map(account_from_workspace))
            .or(file.storage_account)
            .or_else(|| file.workspace_name.as_deref().map(account_from_workspace))
            .unwrap_or_else(|| DEFAULT_STORAGE_ACCOUNT.to_string());

        Self {
            storage_root: opts
                .storage_root
                .clone()
                .or(file.storage_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT)),
            storage_account: account,
            salt: opts.salt.clone().or(file.salt).unwrap_or_default(),
            log_level: opts
                .log_level
                .clone()
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&GlobalOpts::default(), FileConfig::default());
        assert_eq!(settings.storage_root, PathBuf::from("./lake"));
        assert_eq!(settings.storage_account, "stoealocal");
        assert_eq!(settings.salt, "");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_cli_over_file() {
        let file = FileConfig::from_yaml(
            "storage_root: /data/lake\nsalt: from-file\nworkspace_name: syn-oea-abc\nlog_level: debug\n",
        )
        .unwrap();
        let opts = GlobalOpts {
            salt: Some("from-cli".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&opts, file);
        assert_eq!(settings.storage_root, PathBuf::from("/data/lake"));
        assert_eq!(settings.salt, "from-cli");
        assert_eq!(settings.storage_account, "stoeaabc");
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_account_precedence() {
        let file = FileConfig {
            storage_account: Some("stoeafile".to_string()),
            ..Default::default()
        };
        let opts = GlobalOpts {
            workspace_name: Some("syn-oea-cli".to_string()),
            ..Default::default()
        };
        assert_eq!(Settings::resolve(&opts, file.clone()).storage_account, "stoeacli");
        assert_eq!(
            Settings::resolve(&GlobalOpts::default(), file).storage_account,
            "stoeafile"
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FileConfig::from_yaml("storage_rot: /x\n").is_err());
        assert_eq!(FileConfig::from_yaml("").unwrap(), FileConfig::default());
    }
}
