//! `edgeplan.yaml`: environments, host aliases, and existing worker globs.
//!
//! # Lookup order
//!
//! 1. `--config <path>` (must exist)
//! 2. `<cwd>/edgeplan.yaml`
//! 3. `<home>/.edgeplan/config.yaml`
//!
//! As in the registry API, `locate_at(home, cwd, …)` takes explicit roots and
//! is what tests call; `locate(…)` derives them from the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use edgeplan_core::EnvName;

use crate::error::{io_err, ManifestError};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "edgeplan.yaml";

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// A host alias: routes whose host part equals `alias` are expanded into one
/// route per entry of `hosts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAlias {
    pub alias: String,
    pub hosts: Vec<String>,
}

/// Per-environment settings as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// KV binding name -> namespace id.
    #[serde(default)]
    pub kv: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: Vec<HostAlias>,
}

/// Root of `edgeplan.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeplanConfig {
    /// Glob patterns for existing worker files, relative to the config file.
    #[serde(default)]
    pub existing_workers: Vec<String>,
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

/// An environment ready for use: account id resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: EnvName,
    pub account_id: String,
    pub kv: BTreeMap<String, String>,
    pub aliases: Vec<HostAlias>,
}

/// A parsed config together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: EdgeplanConfig,
}

impl LoadedConfig {
    /// Directory the `existing_workers` globs are relative to.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Resolve every environment, falling back to `account_id` where the
    /// config has none.
    ///
    /// Fails with `NoEnvironments` for an empty config and
    /// `MissingAccountId` for the first environment left without one.
    pub fn environments(&self, account_id: Option<&str>) -> Result<Vec<Environment>, ManifestError> {
        if self.config.environments.is_empty() {
            return Err(ManifestError::NoEnvironments {
                path: self.path.clone(),
            });
        }
        self.config
            .environments
            .iter()
            .map(|(name, env)| {
                let name = EnvName::from(name.as_str());
                let account_id = env
                    .account_id
                    .as_deref()
                    .or(account_id)
                    .ok_or_else(|| ManifestError::MissingAccountId {
                        environment: name.clone(),
                    })?;
                Ok(Environment {
                    name,
                    account_id: account_id.to_string(),
                    kv: env.kv.clone(),
                    aliases: env.aliases.clone(),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Lookup and load
// ---------------------------------------------------------------------------

/// Find the config file to use; see the module docs for the order.
pub fn locate_at(
    home: &Path,
    cwd: &Path,
    explicit: Option<&Path>,
) -> Result<PathBuf, ManifestError> {
    if let Some(path) = explicit {
        let path = cwd.join(path);
        return if path.is_file() {
            Ok(path)
        } else {
            Err(ManifestError::ConfigNotFound {
                searched: vec![path],
            })
        };
    }

    let candidates = [
        cwd.join(CONFIG_FILE_NAME),
        home.join(".edgeplan").join("config.yaml"),
    ];
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| ManifestError::ConfigNotFound {
            searched: candidates.to_vec(),
        })
}

/// `locate_at` using the process home and working directories.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, ManifestError> {
    let home = dirs::home_dir().ok_or(ManifestError::HomeNotFound)?;
    let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
    locate_at(&home, &cwd, explicit)
}

/// Parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ManifestError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let config = serde_yaml::from_str(&contents).map_err(|source| ManifestError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
