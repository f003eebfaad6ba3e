//! Error types for edgeplan-sync.

use std::path::PathBuf;

use thiserror::Error;

use edgeplan_core::{RegistryError, ResolveError};
use edgeplan_manifest::ManifestError;

/// All errors that can arise from a run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Config or bundle could not be loaded.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Existing workers could not be loaded or written back.
    #[error("existing worker error: {0}")]
    Registry(#[from] RegistryError),

    /// Routing conflict; the run was aborted before writing anything.
    #[error("routing conflict: {0}")]
    Resolve(#[from] ResolveError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deployment plan serialization error.
    #[error("deployment plan JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
