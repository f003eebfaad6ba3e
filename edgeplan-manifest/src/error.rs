//! Error types for edgeplan-manifest.

use std::path::PathBuf;

use thiserror::Error;

use edgeplan_core::EnvName;

/// Errors from loading configuration and edge bundle manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O failure, with the file involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error (config or `journeys.yaml`).
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON parse error (`workers.json`).
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No config file at any of the searched locations.
    #[error("config file not found; looked in: {}", join_paths(.searched))]
    ConfigNotFound { searched: Vec<PathBuf> },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config defines no environments to deploy to.
    #[error("config at {path} defines no environments")]
    NoEnvironments { path: PathBuf },

    /// An environment has no account id and no fallback was given.
    #[error("environment '{environment}' has no account_id; set it in the config or pass --account-id")]
    MissingAccountId { environment: EnvName },

    /// The bundle directory has no `journeys.yaml`.
    #[error("no edge bundle at {path} (missing journeys.yaml)")]
    BundleNotFound { path: PathBuf },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience constructor for [`ManifestError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}
