//! Locating known executables in a game directory.

use std::path::Path;

use nierpatch_targets::{self as targets, KNOWN_EXECUTABLES};

use crate::error::{Error, Result};
use crate::patch::PatchTarget;

/// Find every known executable present in `directory`, in table order.
pub fn find_executables(directory: &Path) -> Result<Vec<PatchTarget>> {
    let mut found = Vec::new();
    for known in KNOWN_EXECUTABLES {
        let path = directory.join(known.file_name);
        if path.is_file() {
            tracing::info!(
                name = known.file_name,
                description = known.description,
                "found executable"
            );
            found.push(PatchTarget::from_known(directory, known)?);
        } else {
            tracing::debug!(path = %path.display(), "not present");
        }
    }
    Ok(found)
}

/// Resolve the targets to operate on.
///
/// With `only` set, exactly that executable is returned (it must be a known
/// name and exist). Otherwise every known executable found in `directory`
/// is returned, and finding none is an error.
pub fn resolve_targets(directory: &Path, only: Option<&str>) -> Result<Vec<PatchTarget>> {
    if !directory.is_dir() {
        return Err(Error::FileNotFound {
            path: directory.to_path_buf(),
        });
    }

    if let Some(name) = only {
        let known =
            targets::lookup(name).ok_or_else(|| Error::UnknownExecutable(name.to_string()))?;
        let target = PatchTarget::from_known(directory, known)?;
        if !target.path().is_file() {
            return Err(Error::FileNotFound {
                path: target.path().to_path_buf(),
            });
        }
        return Ok(vec![target]);
    }

    let found = find_executables(directory)?;
    if found.is_empty() {
        return Err(Error::NoExecutablesFound {
            directory: directory.to_path_buf(),
        });
    }
    Ok(found)
}
