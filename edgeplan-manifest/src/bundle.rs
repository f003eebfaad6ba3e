//! Unpacked edge bundle: `journeys.yaml` targets and per-target worker routes.
//!
//! ```text
//! <bundle>/
//!   journeys.yaml            targets: [{name, type, enabled, logpush}]
//!   <target>/workers.json    {"worker_routes": [{"pattern", "script_name"}]}
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use edgeplan_core::{RoutePattern, UnitName};

use crate::error::{io_err, ManifestError};

/// Only targets of this type are deployed by edgeplan.
pub const TARGET_TYPE: &str = "cloudflare";

#[derive(Debug, Deserialize)]
struct Journeys {
    #[serde(default)]
    targets: Vec<TargetEntry>,
}

#[derive(Debug, Deserialize)]
struct TargetEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    logpush: bool,
}

#[derive(Debug, Deserialize)]
struct WorkersFile {
    #[serde(default)]
    worker_routes: Vec<WorkerRoute>,
}

/// One route of one worker, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkerRoute {
    pub pattern: RoutePattern,
    pub script_name: UnitName,
}

/// An enabled deployment target and its worker routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleTarget {
    pub name: String,
    pub logpush: bool,
    /// `<bundle>/<target>`; worker outputs go underneath.
    pub dir: PathBuf,
    pub worker_routes: Vec<WorkerRoute>,
}

/// Every enabled target of a bundle, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub root: PathBuf,
    pub targets: Vec<BundleTarget>,
}

/// Load the bundle rooted at `root`.
///
/// Disabled targets and targets of other types are skipped. A later entry
/// with the same name replaces an earlier one.
pub fn load_bundle(root: &Path) -> Result<Bundle, ManifestError> {
    let journeys_path = root.join("journeys.yaml");
    if !journeys_path.is_file() {
        return Err(ManifestError::BundleNotFound {
            path: root.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(&journeys_path).map_err(|e| io_err(&journeys_path, e))?;
    let journeys: Journeys =
        serde_yaml::from_str(&contents).map_err(|source| ManifestError::Yaml {
            path: journeys_path.clone(),
            source,
        })?;

    let mut enabled = BTreeMap::new();
    for entry in journeys.targets {
        if entry.kind != TARGET_TYPE || !entry.enabled {
            debug!("skipping target '{}' ({}, enabled={})", entry.name, entry.kind, entry.enabled);
            continue;
        }
        enabled.insert(entry.name.clone(), entry);
    }

    let mut targets = Vec::with_capacity(enabled.len());
    for (name, entry) in enabled {
        let dir = root.join(&name);
        let worker_routes = load_worker_routes(&dir.join("workers.json"))?;
        targets.push(BundleTarget {
            name,
            logpush: entry.logpush,
            dir,
            worker_routes,
        });
    }

    Ok(Bundle {
        root: root.to_path_buf(),
        targets,
    })
}

fn load_worker_routes(path: &Path) -> Result<Vec<WorkerRoute>, ManifestError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let file: WorkersFile =
        serde_json::from_str(&contents).map_err(|source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file.worker_routes)
}
