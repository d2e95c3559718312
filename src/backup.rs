//! Backup file naming and atomic copies.
//!
//! A backup lives next to its target, named by appending a suffix to the
//! target's file name (`NieRAutomata.exe` → `NieRAutomata.exe.bak`).
//! Copies go through a temporary file in the destination directory and are
//! renamed into place, so a backup or restored target is never observed
//! half-written.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Default suffix appended to the target's file name.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// Prefix for the temporary files created during a copy.
const TEMP_PREFIX: &str = ".nierpatch-";

/// Get the backup path for a target file.
pub fn backup_path_for(target: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let mut path = target.as_ref().to_path_buf();
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    path.set_file_name(format!("{}{}", filename, suffix));
    path
}

/// Copy the contents of `source` to `dst` without ever exposing a partial
/// `dst`.
///
/// The caller opens `source`, so errors opening it can be attributed to the
/// right path. With `overwrite == false` the copy fails with
/// [`io::ErrorKind::AlreadyExists`] if `dst` appears in the meantime.
pub fn copy_atomic(source: &mut File, dst: &Path, overwrite: bool) -> io::Result<()> {
    let dir = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)?;

    let copied = io::copy(source, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), source.metadata()?.permissions())?;

    tracing::debug!(dst = %dst.display(), bytes = copied, "copied to temporary file");

    if overwrite {
        tmp.persist(dst).map_err(|e| e.error)?;
    } else {
        tmp.persist_noclobber(dst).map_err(|e| e.error)?;
    }
    Ok(())
}
