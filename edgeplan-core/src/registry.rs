//! Existing worker registry: discovery, load, and writeback.
//!
//! # Lifecycle
//!
//! ```text
//! discover_at(base, patterns)   glob -> sorted, de-duplicated file list
//! load_at(base, patterns)       parse -> restore -> snapshot, per file
//! resolver::resolve(...)        mutates units in place
//! writeback(&registry, dry_run) persist units that changed or were restored
//! ```
//!
//! Writes go through [`crate::persist`], like every other file edgeplan
//! persists.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{info, warn};

use crate::error::RegistryError;
use crate::persist::{self, WriteResult};
use crate::types::{ExistingUnit, WorkerConfig};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Every existing worker known to one run, in discovery order.
///
/// Owned by a single run; resolution mutates it sequentially.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    units: Vec<ExistingUnit>,
}

impl Registry {
    pub fn from_units(units: Vec<ExistingUnit>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[ExistingUnit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [ExistingUnit] {
        &mut self.units
    }

    /// Units writeback has to look at: modified or restored on load.
    pub fn pending_writeback(&self) -> impl Iterator<Item = &ExistingUnit> {
        self.units.iter().filter(|u| u.needs_writeback())
    }
}

// ---------------------------------------------------------------------------
// 1. Discovery
// ---------------------------------------------------------------------------

/// Expand `patterns` (relative to `base` unless absolute) into worker files.
///
/// `base` is taken literally: glob metacharacters in it (`deploy[prod]`)
/// are escaped. A pattern naming a plain file matches it directly. A pattern
/// matching nothing is logged and skipped.
pub fn discover_at(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, RegistryError> {
    let root = Pattern::escape(&base.to_string_lossy());
    let mut found = BTreeSet::new();
    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            format!("{}/{pattern}", root.trim_end_matches(['/', '\\']))
        };
        let paths = glob::glob(&full).map_err(|source| RegistryError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let before = found.len();
        for entry in paths {
            let path = entry.map_err(|e| RegistryError::Io(e.into()))?;
            if path.is_file() {
                found.insert(path);
            }
        }
        if found.len() == before {
            warn!("existing worker pattern matched no files: {pattern}");
        }
    }
    Ok(found.into_iter().collect())
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Parse one worker file and restore any previously pruned routes.
///
/// Returns `RegistryError::Parse` (with path) if the TOML is malformed or
/// has no `name`.
pub fn load_unit(path: &Path) -> Result<ExistingUnit, RegistryError> {
    let contents = std::fs::read_to_string(path)?;
    let config: WorkerConfig = toml::from_str(&contents).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ExistingUnit::new(path, config))
}

/// Discover and load every existing worker matched by `patterns`.
pub fn load_at(base: &Path, patterns: &[String]) -> Result<Registry, RegistryError> {
    let units = discover_at(base, patterns)?
        .iter()
        .map(|path| load_unit(path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Registry::from_units(units))
}

// ---------------------------------------------------------------------------
// 3. Writeback
// ---------------------------------------------------------------------------

/// Serialize a unit's working state as it would be persisted.
pub fn render_unit(unit: &ExistingUnit) -> Result<String, RegistryError> {
    toml::to_string(unit.config()).map_err(|source| RegistryError::Serialize {
        path: unit.source().to_path_buf(),
        source,
    })
}

/// Persist every unit that differs from its load snapshot or was restored
/// on load.
///
/// Other units are not even rendered. A candidate whose rendering matches the
/// file (re-pruned exactly as last run) is reported as `Unchanged`.
pub fn writeback(registry: &Registry, dry_run: bool) -> Result<Vec<WriteResult>, RegistryError> {
    let mut results = Vec::new();
    for unit in registry.pending_writeback() {
        let path = unit.source();
        let contents = render_unit(unit)?;
        let result = persist::write_if_changed(path, &contents, dry_run).map_err(|source| {
            RegistryError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if matches!(result, WriteResult::Written { .. }) {
            info!("modified existing worker: {}", path.display());
        }
        results.push(result);
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
