//! Error types for nierpatch.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using nierpatch's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while inspecting or patching an executable.
#[derive(Error, Debug)]
pub enum Error {
    // Target file errors
    /// Target file (or directory) does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Insufficient permissions to read or write the target.
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// Path that could not be accessed.
        path: PathBuf,
    },

    /// Signature window extends past the end of the file.
    #[error(
        "offset 0x{offset:X} (+{len} bytes) is outside file bounds of {} ({file_size} bytes)",
        path.display()
    )]
    OffsetOutOfBounds {
        /// Target file.
        path: PathBuf,
        /// Configured offset.
        offset: u64,
        /// Signature length.
        len: usize,
        /// Actual file size.
        file_size: u64,
    },

    /// Neither the original nor the patched signature is at the offset.
    #[error(
        "unexpected bytes at offset 0x{offset:X} in {}: expected {expected_original} or {expected_patched}, found {found}",
        path.display()
    )]
    UnexpectedBytes {
        /// Target file.
        path: PathBuf,
        /// Configured offset.
        offset: u64,
        /// Original signature, hex.
        expected_original: String,
        /// Patched signature, hex.
        expected_patched: String,
        /// Bytes actually found, hex.
        found: String,
    },

    /// Re-reading after the write did not show the patched signature.
    #[error(
        "patch verification failed at offset 0x{offset:X} in {}: expected {expected}, found {found}",
        path.display()
    )]
    VerificationFailed {
        /// Target file.
        path: PathBuf,
        /// Configured offset.
        offset: u64,
        /// Patched signature, hex.
        expected: String,
        /// Bytes read back, hex.
        found: String,
    },

    /// Signature pair is unusable (empty or mismatched lengths).
    #[error("invalid patch target: {0}")]
    InvalidTarget(String),

    // Backup errors
    /// Creating the backup copy failed.
    #[error("failed to create backup {}: {source}", path.display())]
    BackupFailed {
        /// Backup path that could not be written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// No backup exists to restore from.
    #[error("backup not found: {}", path.display())]
    BackupNotFound {
        /// Expected backup path.
        path: PathBuf,
    },

    // Discovery errors
    /// The requested executable name is not in the known table.
    #[error("unknown executable: {0}")]
    UnknownExecutable(String),

    /// No known executable exists in the scanned directory.
    #[error("no NieR: Automata executables found in {}", directory.display())]
    NoExecutablesFound {
        /// Directory that was scanned.
        directory: PathBuf,
    },

    /// A batch run finished without a single successful target.
    #[error("failed to process any executable ({attempted} attempted)")]
    NothingProcessed {
        /// Number of targets attempted.
        attempted: usize,
    },

    // Configuration errors
    /// Configuration file could not be parsed or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    // IO errors
    /// IO error on a specific file.
    #[error("io error on {}: {source}", path.display())]
    FileIo {
        /// File being accessed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Classify an IO error raised while accessing `path`.
    ///
    /// Missing files and permission problems get their own variants so the
    /// user sees which file is at fault.
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::FileIo { path, source: err },
        }
    }

    /// Create a config error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid target error with a message.
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    /// Short, stable name of the error kind for per-target reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "FileNotFound",
            Self::PermissionDenied { .. } => "PermissionDenied",
            Self::OffsetOutOfBounds { .. } => "OffsetOutOfBounds",
            Self::UnexpectedBytes { .. } => "UnexpectedBytes",
            Self::VerificationFailed { .. } => "VerificationFailed",
            Self::BackupFailed { .. } => "BackupFailed",
            Self::BackupNotFound { .. } => "BackupNotFound",
            Self::InvalidTarget(_) => "InvalidTarget",
            Self::UnknownExecutable(_) => "UnknownExecutable",
            Self::NoExecutablesFound { .. } => "NoExecutablesFound",
            Self::NothingProcessed { .. } => "NothingProcessed",
            Self::Config(_) => "Config",
            Self::FileIo { .. } | Self::Other(_) => "Other",
        }
    }
}
