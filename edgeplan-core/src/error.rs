//! Error types for edgeplan-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{EnvName, RoutePattern, UnitName};

/// Errors from loading and persisting existing worker files.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error on load, with the offending file.
    #[error("failed to parse worker config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// TOML serialization error on writeback.
    #[error("failed to serialize worker config for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    /// Writeback could not persist a worker file.
    #[error("failed to write worker config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An `existing_workers` entry is not a valid glob.
    #[error("invalid existing worker pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// A routing conflict. Fatal for the whole run; nothing is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A new route is broader than a route an existing worker already
    /// claims, so a service binding cannot express the split.
    #[error(
        "found a route where a service binding would not work in '{environment}': \
         their route: {theirs} ({unit}), our route: {ours}"
    )]
    BroaderThanExisting {
        environment: EnvName,
        ours: RoutePattern,
        theirs: RoutePattern,
        unit: UnitName,
    },

    /// One new unit would need two different upstreams in one environment.
    #[error(
        "conflicting upstream workers in '{environment}': {route} -> {} vs {first_route} -> {}",
        upstream_label(.upstream),
        upstream_label(.first_upstream)
    )]
    ConflictingUpstreams {
        environment: EnvName,
        first_route: RoutePattern,
        first_upstream: Option<UnitName>,
        route: RoutePattern,
        upstream: Option<UnitName>,
    },
}

fn upstream_label(upstream: &Option<UnitName>) -> String {
    match upstream {
        Some(name) => name.to_string(),
        None => "<none>".to_string(),
    }
}
