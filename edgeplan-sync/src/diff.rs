//! Unified diffs for `edgeplan diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use edgeplan_core::persist::{normalize_line_endings, read_or_empty};
use edgeplan_core::registry::render_unit;

use crate::error::io_err;
use crate::pipeline::{resolve_run, RunOptions};
use crate::SyncError;

/// What kind of file a diff is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// A new worker's deployment plan.
    Plan,
    /// An existing worker whose routes change.
    Existing,
}

/// A single file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub kind: DiffKind,
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Resolve like a run would and compare every output with what is on disk.
///
/// No files are written. Files that would not change are left out.
pub fn diff_run(options: &RunOptions) -> Result<Vec<FileDiff>, SyncError> {
    let resolved = resolve_run(options)?;

    let mut diffs = Vec::new();
    for worker in &resolved.workers {
        let path = worker.plan_path();
        let rendered = worker.plan.to_json()?;
        if let Some(unified) = unified(&path, &options.bundle, &rendered)? {
            diffs.push(FileDiff {
                kind: DiffKind::Plan,
                path,
                unified_diff: unified,
            });
        }
    }

    for unit in resolved.registry.pending_writeback() {
        let rendered = render_unit(unit)?;
        if let Some(unified) = unified(unit.source(), &resolved.base_dir, &rendered)? {
            diffs.push(FileDiff {
                kind: DiffKind::Existing,
                path: unit.source().to_path_buf(),
                unified_diff: unified,
            });
        }
    }

    Ok(diffs)
}

fn unified(path: &Path, base: &Path, rendered: &str) -> Result<Option<String>, SyncError> {
    let rendered = normalize_line_endings(rendered);
    let existing = read_or_empty(path).map_err(|e| io_err(path, e))?;
    if existing == rendered {
        return Ok(None);
    }

    let relative = path.strip_prefix(base).unwrap_or(path);
    let old_header = format!("a/{}", relative.display());
    let new_header = format!("b/{}", relative.display());
    Ok(Some(
        TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string(),
    ))
}
