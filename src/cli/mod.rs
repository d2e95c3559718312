//! CLI command implementations.

use std::path::PathBuf;

use nierpatch::{discover, targets, Error, PatchExecutor, PatchTarget, PatcherConfig};

pub mod apply;
pub mod backup;
pub mod config;
pub mod list;
pub mod restore;
pub mod status;

/// Settings shared by every command, resolved from flags and config.
#[derive(Debug)]
pub struct Context {
    /// Loaded configuration.
    pub config: PatcherConfig,
    /// Config file location in effect, if any.
    pub config_path: Option<PathBuf>,
    /// Directory to scan for executables.
    pub directory: PathBuf,
    /// Restrict to a single executable name.
    pub target: Option<String>,
    /// Report instead of modify.
    pub dry_run: bool,
}

impl Context {
    /// Executor configured for this invocation.
    pub fn executor(&self) -> PatchExecutor {
        PatchExecutor::new(self.config.patch_options(self.dry_run))
    }

    /// Targets selected by `--directory` and `--target`.
    pub fn targets(&self) -> nierpatch::Result<Vec<PatchTarget>> {
        match discover::resolve_targets(&self.directory, self.target.as_deref()) {
            Err(e @ Error::NoExecutablesFound { .. }) | Err(e @ Error::UnknownExecutable(_)) => {
                let expected: Vec<_> = targets::file_names().collect();
                eprintln!("Expected files: {}", expected.join(", "));
                Err(e)
            }
            other => other,
        }
    }
}

/// "NieRAutomata.exe (DirectX 12 version)".
pub fn display_name(target: &PatchTarget) -> String {
    match target.description() {
        Some(desc) => format!("{} ({})", target.name(), desc),
        None => target.name(),
    }
}
