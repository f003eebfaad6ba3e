//! Content-gated atomic file writes, shared by worker writeback and plan output.
//!
//! A file is rewritten only when its (LF-normalised) content would change.
//! Writes go through a `<file>.edgeplan.tmp` sibling and `rename`.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// What happened to one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The file was (re)written.
    Written { path: PathBuf },
    /// The file already holds exactly this content.
    Unchanged { path: PathBuf },
    /// Dry run: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Write `content` to `path` unless the file already holds it.
///
/// Parent directories are created as needed. Nothing touches the disk when
/// `dry_run` is set.
pub fn write_if_changed(path: &Path, content: &str, dry_run: bool) -> io::Result<WriteResult> {
    let content = normalize_line_endings(content);
    let path_buf = path.to_path_buf();

    if read_or_empty(path)? == content {
        debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged { path: path_buf });
    }
    if dry_run {
        info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite { path: path_buf });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    std::fs::write(&tmp, &content)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    info!("wrote: {}", path.display());
    Ok(WriteResult::Written { path: path_buf })
}

/// LF-normalised content of `path`, or empty when it does not exist.
pub fn read_or_empty(path: &Path) -> io::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err),
    }
}

pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.edgeplan.tmp", path.display()))
}
