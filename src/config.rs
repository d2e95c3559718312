//! nierpatch configuration.
//!
//! Settings are read from an optional TOML file at
//! `<config dir>/nierpatch/config.toml` (e.g. `~/.config/nierpatch/config.toml`
//! on Linux, `%APPDATA%\nierpatch\config.toml` on Windows). Every field is
//! optional; a missing file means defaults.

use crate::backup::DEFAULT_BACKUP_SUFFIX;
use crate::error::{Error, Result};
use crate::patch::PatchOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name for config file storage.
const APP_NAME: &str = "nierpatch";

/// Config file name inside the application config directory.
const CONFIG_FILENAME: &str = "config.toml";

/// User-level nierpatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PatcherConfig {
    /// Suffix appended to an executable's file name for its backup.
    pub backup_suffix: String,

    /// Re-read the signature after writing it.
    pub verify: bool,

    /// Directory to scan when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_directory: Option<PathBuf>,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            verify: true,
            default_directory: None,
        }
    }
}

impl PatcherConfig {
    /// Default location of the config file, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join(CONFIG_FILENAME))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`.
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Check field values that the TOML schema can't express.
    pub fn validate(&self) -> Result<()> {
        if self.backup_suffix.is_empty() {
            return Err(Error::config(
                "backup_suffix must not be empty (the backup would overwrite the executable)",
            ));
        }
        if self.backup_suffix.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "backup_suffix must not contain path separators: {:?}",
                self.backup_suffix
            )));
        }
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Executor options for this configuration.
    pub fn patch_options(&self, dry_run: bool) -> PatchOptions {
        PatchOptions {
            dry_run,
            verify: self.verify,
            backup_suffix: self.backup_suffix.clone(),
        }
    }
}
