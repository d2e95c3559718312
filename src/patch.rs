//! Signature inspection and patching.
//!
//! Every operation re-reads the file; nothing about a target's patch state
//! is cached between calls. Only the signature window
//! (`offset .. offset + len`) is ever mapped, so the rest of the
//! executable is neither read nor written.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::MmapOptions;
use nierpatch_targets::KnownExecutable;
use serde::Serialize;

use crate::backup::{self, DEFAULT_BACKUP_SUFFIX};
use crate::error::{Error, Result};

/// Render bytes as upper-case hex pairs separated by spaces (`33 C0 83`).
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Patch state of a target, derived from the bytes currently on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchStatus {
    /// The patched signature is present.
    Patched,
    /// The original signature is present.
    Unpatched,
    /// Neither signature is present.
    Unknown,
    /// The signature window extends past the end of the file.
    InvalidOffset,
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchStatus::Patched => write!(f, "patched"),
            PatchStatus::Unpatched => write!(f, "unpatched"),
            PatchStatus::Unknown => write!(f, "unknown"),
            PatchStatus::InvalidOffset => write!(f, "invalid_offset"),
        }
    }
}

/// A file on disk paired with the signature pair expected in it.
#[derive(Debug, Clone)]
pub struct PatchTarget {
    path: PathBuf,
    offset: u64,
    original: &'static [u8],
    patched: &'static [u8],
    description: Option<&'static str>,
}

impl PatchTarget {
    /// Create a target from an explicit signature pair.
    ///
    /// Both signatures must be non-empty and the same length.
    pub fn new(
        path: impl Into<PathBuf>,
        offset: u64,
        original: &'static [u8],
        patched: &'static [u8],
    ) -> Result<Self> {
        if original.is_empty() {
            return Err(Error::invalid_target("signature must not be empty"));
        }
        if original.len() != patched.len() {
            return Err(Error::invalid_target(format!(
                "original signature is {} bytes but patched signature is {} bytes",
                original.len(),
                patched.len()
            )));
        }
        if offset.checked_add(original.len() as u64).is_none() {
            return Err(Error::invalid_target(format!(
                "offset 0x{:X} overflows",
                offset
            )));
        }
        Ok(Self {
            path: path.into(),
            offset,
            original,
            patched,
            description: None,
        })
    }

    /// Bind a known executable to its file inside `directory`.
    pub fn from_known(directory: &Path, known: &'static KnownExecutable) -> Result<Self> {
        let mut target = Self::new(
            directory.join(known.file_name),
            known.offset,
            known.original,
            known.patched,
        )?;
        target.description = Some(known.description);
        Ok(target)
    }

    /// Path of the target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Build description, if this target came from the known table.
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// Signature offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Expected bytes of an unpatched file.
    pub fn original(&self) -> &'static [u8] {
        self.original
    }

    /// Bytes written by the patch.
    pub fn patched(&self) -> &'static [u8] {
        self.patched
    }

    /// Signature length.
    pub fn len(&self) -> usize {
        self.original.len()
    }

    /// True for an empty signature, which [`PatchTarget::new`] rejects.
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Classify the bytes found in the signature window.
    pub fn classify(&self, found: &[u8]) -> PatchStatus {
        if found == self.patched {
            PatchStatus::Patched
        } else if found == self.original {
            PatchStatus::Unpatched
        } else {
            PatchStatus::Unknown
        }
    }

    /// Read the signature window from disk.
    pub fn inspect(&self) -> Result<Inspection> {
        let file = File::open(&self.path).map_err(|e| Error::from_io(&self.path, e))?;
        let file_size = file
            .metadata()
            .map_err(|e| Error::from_io(&self.path, e))?
            .len();

        if !self.fits(file_size) {
            tracing::debug!(
                path = %self.path.display(),
                offset = self.offset,
                file_size,
                "signature window outside file"
            );
            return Ok(Inspection {
                status: PatchStatus::InvalidOffset,
                found: None,
                file_size,
            });
        }

        // SAFETY: the window lies inside the file (checked above) and the
        // mapping is dropped before this function returns. Concurrent
        // modification of the same file by another process is unsupported.
        let window = unsafe {
            MmapOptions::new()
                .offset(self.offset)
                .len(self.len())
                .map(&file)
        }
        .map_err(|e| Error::from_io(&self.path, e))?;

        let found = window.to_vec();
        let status = self.classify(&found);
        tracing::debug!(
            path = %self.path.display(),
            offset = self.offset,
            found = %hex_bytes(&found),
            %status,
            "read signature window"
        );

        Ok(Inspection {
            status,
            found: Some(found),
            file_size,
        })
    }

    /// Current patch status of the file.
    pub fn status(&self) -> Result<PatchStatus> {
        self.inspect().map(|i| i.status)
    }

    /// Overwrite the signature window with the patched signature.
    fn write_patched(&self) -> Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| Error::from_io(&self.path, e))?;
        let file_size = file
            .metadata()
            .map_err(|e| Error::from_io(&self.path, e))?
            .len();
        if !self.fits(file_size) {
            return Err(self.out_of_bounds(file_size));
        }

        // SAFETY: as in `inspect`; the window was bounds-checked against the
        // open file.
        let mut window = unsafe {
            MmapOptions::new()
                .offset(self.offset)
                .len(self.len())
                .map_mut(&file)
        }
        .map_err(|e| Error::from_io(&self.path, e))?;

        window.copy_from_slice(self.patched);
        window.flush().map_err(|e| Error::from_io(&self.path, e))?;
        Ok(())
    }

    fn fits(&self, file_size: u64) -> bool {
        self.offset
            .checked_add(self.len() as u64)
            .map_or(false, |end| end <= file_size)
    }

    fn out_of_bounds(&self, file_size: u64) -> Error {
        Error::OffsetOutOfBounds {
            path: self.path.clone(),
            offset: self.offset,
            len: self.len(),
            file_size,
        }
    }
}

/// Result of reading a target's signature window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Derived status.
    pub status: PatchStatus,
    /// Bytes in the window; `None` when the window is out of bounds.
    pub found: Option<Vec<u8>>,
    /// Size of the file at the time of the read.
    pub file_size: u64,
}

impl Inspection {
    /// Found bytes as hex, or `-` when out of bounds.
    pub fn found_hex(&self) -> String {
        self.found
            .as_deref()
            .map(hex_bytes)
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Options controlling how the executor touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Report what would happen without writing anything.
    pub dry_run: bool,
    /// Re-read the window after writing and fail unless it shows `patched`.
    pub verify: bool,
    /// Suffix appended to the target's file name for its backup.
    pub backup_suffix: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verify: true,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

/// Outcome of [`PatchExecutor::backup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A new backup was written.
    Created(PathBuf),
    /// A backup already existed and was left untouched.
    AlreadyPresent(PathBuf),
    /// Dry run: a backup would have been written.
    WouldCreate(PathBuf),
}

impl BackupOutcome {
    /// Path of the backup file.
    pub fn path(&self) -> &Path {
        match self {
            BackupOutcome::Created(p)
            | BackupOutcome::AlreadyPresent(p)
            | BackupOutcome::WouldCreate(p) => p,
        }
    }
}

impl fmt::Display for BackupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupOutcome::Created(p) => write!(f, "backup created: {}", p.display()),
            BackupOutcome::AlreadyPresent(p) => {
                write!(f, "backup already exists: {}", p.display())
            }
            BackupOutcome::WouldCreate(p) => {
                write!(f, "[dry run] would create backup: {}", p.display())
            }
        }
    }
}

/// Outcome of [`PatchExecutor::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The file already carried the patched signature; nothing was written.
    AlreadyPatched,
    /// The patch was written (and verified, if enabled).
    Patched {
        /// What happened to the backup.
        backup: BackupOutcome,
    },
    /// Dry run: the file is unpatched and would have been patched.
    WouldPatch {
        /// What would happen to the backup.
        backup: BackupOutcome,
    },
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyOutcome::AlreadyPatched => write!(f, "already patched"),
            ApplyOutcome::Patched { backup } => write!(f, "patch applied ({})", backup),
            ApplyOutcome::WouldPatch { backup } => {
                write!(f, "[dry run] would apply patch ({})", backup)
            }
        }
    }
}

/// Outcome of [`PatchExecutor::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The target was overwritten with its backup.
    Restored(PathBuf),
    /// Dry run: the target would have been overwritten.
    WouldRestore(PathBuf),
}

impl fmt::Display for RestoreOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreOutcome::Restored(p) => write!(f, "restored from {}", p.display()),
            RestoreOutcome::WouldRestore(p) => {
                write!(f, "[dry run] would restore from {}", p.display())
            }
        }
    }
}

/// Runs status/backup/apply/restore against patch targets.
#[derive(Debug, Clone, Default)]
pub struct PatchExecutor {
    options: PatchOptions,
}

impl PatchExecutor {
    /// Create an executor with the given options.
    pub fn new(options: PatchOptions) -> Self {
        Self { options }
    }

    /// Backup path for `target` under the configured suffix.
    pub fn backup_path(&self, target: &PatchTarget) -> PathBuf {
        backup::backup_path_for(target.path(), &self.options.backup_suffix)
    }

    /// Read-only status check.
    pub fn status(&self, target: &PatchTarget) -> Result<PatchStatus> {
        target.status()
    }

    /// Copy the target to its backup path unless a backup already exists.
    ///
    /// Only a regular file counts as an existing backup; anything else at
    /// the backup path is an error so that `apply` never writes without one.
    pub fn backup(&self, target: &PatchTarget) -> Result<BackupOutcome> {
        let backup_path = self.backup_path(target);

        let mut source = File::open(target.path()).map_err(|e| Error::from_io(target.path(), e))?;

        if fs::symlink_metadata(&backup_path).is_ok() {
            if !backup_path.is_file() {
                return Err(Error::BackupFailed {
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "path exists but is not a regular file",
                    ),
                    path: backup_path,
                });
            }
            tracing::info!(backup = %backup_path.display(), "backup already exists");
            return Ok(BackupOutcome::AlreadyPresent(backup_path));
        }

        if self.options.dry_run {
            return Ok(BackupOutcome::WouldCreate(backup_path));
        }

        backup::copy_atomic(&mut source, &backup_path, false).map_err(|e| Error::BackupFailed {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::info!(backup = %backup_path.display(), "backup created");

        Ok(BackupOutcome::Created(backup_path))
    }

    /// Patch the target if it carries the original signature.
    pub fn apply(&self, target: &PatchTarget) -> Result<ApplyOutcome> {
        let inspection = target.inspect()?;

        match inspection.status {
            PatchStatus::Patched => {
                tracing::info!(path = %target.path().display(), "already patched");
                return Ok(ApplyOutcome::AlreadyPatched);
            }
            PatchStatus::InvalidOffset => {
                return Err(target.out_of_bounds(inspection.file_size));
            }
            PatchStatus::Unknown => {
                return Err(Error::UnexpectedBytes {
                    path: target.path().to_path_buf(),
                    offset: target.offset(),
                    expected_original: hex_bytes(target.original()),
                    expected_patched: hex_bytes(target.patched()),
                    found: inspection.found_hex(),
                });
            }
            PatchStatus::Unpatched => {}
        }

        let backup = self.backup(target)?;

        if self.options.dry_run {
            return Ok(ApplyOutcome::WouldPatch { backup });
        }

        target.write_patched()?;
        tracing::info!(
            path = %target.path().display(),
            offset = target.offset(),
            bytes = %hex_bytes(target.patched()),
            "wrote patched signature"
        );

        if self.options.verify {
            self.verify(target)?;
        }

        Ok(ApplyOutcome::Patched { backup })
    }

    /// Re-read the target and fail unless it shows the patched signature.
    pub fn verify(&self, target: &PatchTarget) -> Result<()> {
        let after = target.inspect()?;
        if after.status != PatchStatus::Patched {
            return Err(Error::VerificationFailed {
                path: target.path().to_path_buf(),
                offset: target.offset(),
                expected: hex_bytes(target.patched()),
                found: after.found_hex(),
            });
        }
        Ok(())
    }

    /// Overwrite the target with its backup.
    pub fn restore(&self, target: &PatchTarget) -> Result<RestoreOutcome> {
        let backup_path = self.backup_path(target);
        if !backup_path.is_file() {
            return Err(Error::BackupNotFound { path: backup_path });
        }

        if self.options.dry_run {
            return Ok(RestoreOutcome::WouldRestore(backup_path));
        }

        let mut source = File::open(&backup_path).map_err(|e| Error::from_io(&backup_path, e))?;
        backup::copy_atomic(&mut source, target.path(), true)
            .map_err(|e| Error::from_io(target.path(), e))?;
        tracing::info!(
            path = %target.path().display(),
            backup = %backup_path.display(),
            "restored from backup"
        );

        Ok(RestoreOutcome::Restored(backup_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &[u8] = &[0x33, 0xC0, 0x83];
    const PATCHED: &[u8] = &[0xB0, 0x01, 0xC3];

    /// Write a file of `size` bytes filled with a non-repeating-ish pattern,
    /// with `signature` placed at `offset`.
    fn write_fixture(path: &Path, size: usize, offset: usize, signature: &[u8]) -> Vec<u8> {
        let mut data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        data[offset..offset + signature.len()].copy_from_slice(signature);
        fs::write(path, &data).unwrap();
        data
    }

    fn target_at(path: &Path, offset: u64) -> PatchTarget {
        PatchTarget::new(path, offset, ORIGINAL, PATCHED).unwrap()
    }

    #[test]
    fn test_new_rejects_mismatched_signatures() {
        let err = PatchTarget::new("x.exe", 0, &[1, 2, 3], &[1, 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
        let err = PatchTarget::new("x.exe", 0, &[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
        let err = PatchTarget::new("x.exe", u64::MAX, ORIGINAL, PATCHED).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
    }

    #[test]
    fn test_status_variants() {
        let dir = tempfile::tempdir().unwrap();

        let unpatched = dir.path().join("unpatched.exe");
        write_fixture(&unpatched, 64, 16, ORIGINAL);
        assert_eq!(target_at(&unpatched, 16).status().unwrap(), PatchStatus::Unpatched);

        let patched = dir.path().join("patched.exe");
        write_fixture(&patched, 64, 16, PATCHED);
        assert_eq!(target_at(&patched, 16).status().unwrap(), PatchStatus::Patched);

        let unknown = dir.path().join("unknown.exe");
        write_fixture(&unknown, 64, 16, &[0x90, 0x90, 0x90]);
        assert_eq!(target_at(&unknown, 16).status().unwrap(), PatchStatus::Unknown);

        // window ends exactly at EOF: still in bounds
        let edge = dir.path().join("edge.exe");
        write_fixture(&edge, 19, 16, ORIGINAL);
        assert_eq!(target_at(&edge, 16).status().unwrap(), PatchStatus::Unpatched);

        // one byte short
        let short = dir.path().join("short.exe");
        fs::write(&short, [0u8; 18]).unwrap();
        assert_eq!(target_at(&short, 16).status().unwrap(), PatchStatus::InvalidOffset);
    }

    #[test]
    fn test_status_of_empty_file_is_invalid_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.exe");
        fs::write(&path, b"").unwrap();
        assert_eq!(target_at(&path, 0).status().unwrap(), PatchStatus::InvalidOffset);
    }

    #[test]
    fn test_status_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.exe");
        let err = target_at(&path, 0).status().unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_inspect_reports_found_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unknown.exe");
        write_fixture(&path, 32, 4, &[0xDE, 0xAD, 0xBE]);
        let inspection = target_at(&path, 4).inspect().unwrap();
        assert_eq!(inspection.status, PatchStatus::Unknown);
        assert_eq!(inspection.found_hex(), "DE AD BE");
        assert_eq!(inspection.file_size, 32);
    }

    #[test]
    fn test_apply_unpatched_creates_backup_and_patches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 4096, 1000, ORIGINAL);
        let target = target_at(&path, 1000);
        let executor = PatchExecutor::default();

        let outcome = executor.apply(&target).unwrap();
        let backup_path = dir.path().join("game.exe.bak");
        assert_eq!(
            outcome,
            ApplyOutcome::Patched {
                backup: BackupOutcome::Created(backup_path.clone())
            }
        );

        assert_eq!(fs::read(&backup_path).unwrap(), before);
        assert_eq!(target.status().unwrap(), PatchStatus::Patched);

        // only the window changed
        let after = fs::read(&path).unwrap();
        assert_eq!(after.len(), before.len());
        assert_eq!(&after[..1000], &before[..1000]);
        assert_eq!(&after[1000..1003], PATCHED);
        assert_eq!(&after[1003..], &before[1003..]);
    }

    #[test]
    fn test_apply_already_patched_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 128, 10, PATCHED);
        let executor = PatchExecutor::default();

        let outcome = executor.apply(&target_at(&path, 10)).unwrap();
        assert_eq!(outcome, ApplyOutcome::AlreadyPatched);
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!dir.path().join("game.exe.bak").exists());
    }

    #[test]
    fn test_apply_unknown_bytes_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 128, 10, &[0x90, 0x90, 0x90]);
        let executor = PatchExecutor::default();

        let err = executor.apply(&target_at(&path, 10)).unwrap_err();
        match &err {
            Error::UnexpectedBytes {
                found,
                expected_original,
                expected_patched,
                ..
            } => {
                assert_eq!(found, "90 90 90");
                assert_eq!(expected_original, "33 C0 83");
                assert_eq!(expected_patched, "B0 01 C3");
            }
            other => panic!("expected UnexpectedBytes, got {:?}", other),
        }
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!dir.path().join("game.exe.bak").exists());
    }

    #[test]
    fn test_apply_short_file_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        fs::write(&path, [0x33u8, 0xC0]).unwrap();
        let target = target_at(&path, 0);
        let executor = PatchExecutor::default();

        assert_eq!(target.status().unwrap(), PatchStatus::InvalidOffset);
        let err = executor.apply(&target).unwrap_err();
        assert!(matches!(err, Error::OffsetOutOfBounds { file_size: 2, .. }));
        assert_eq!(fs::read(&path).unwrap(), [0x33u8, 0xC0]);
        assert!(!dir.path().join("game.exe.bak").exists());
    }

    #[test]
    fn test_apply_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PatchExecutor::default()
            .apply(&target_at(&dir.path().join("gone.exe"), 0))
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_apply_keeps_existing_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 64, 8, ORIGINAL);
        let backup_path = dir.path().join("game.exe.bak");
        fs::write(&backup_path, b"older backup").unwrap();

        let outcome = PatchExecutor::default().apply(&target_at(&path, 8)).unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::Patched {
                backup: BackupOutcome::AlreadyPresent(backup_path.clone())
            }
        );
        assert_eq!(fs::read(&backup_path).unwrap(), b"older backup");
    }

    #[test]
    fn test_backup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let original = write_fixture(&path, 64, 8, ORIGINAL);
        let target = target_at(&path, 8);
        let executor = PatchExecutor::default();

        let first = executor.backup(&target).unwrap();
        assert!(matches!(first, BackupOutcome::Created(_)));

        fs::write(&path, b"changed in between").unwrap();
        let second = executor.backup(&target).unwrap();
        assert_eq!(second, BackupOutcome::AlreadyPresent(first.path().to_path_buf()));
        assert_eq!(fs::read(first.path()).unwrap(), original);
    }

    #[test]
    fn test_backup_custom_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 16, 0, ORIGINAL);
        let executor = PatchExecutor::new(PatchOptions {
            backup_suffix: ".orig".to_string(),
            ..Default::default()
        });

        let outcome = executor.backup(&target_at(&path, 0)).unwrap();
        assert_eq!(outcome, BackupOutcome::Created(dir.path().join("game.exe.orig")));
    }

    #[test]
    fn test_apply_refuses_directory_at_backup_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 64, 8, ORIGINAL);
        let backup_path = dir.path().join("game.exe.bak");
        fs::create_dir(&backup_path).unwrap();

        let err = PatchExecutor::default()
            .apply(&target_at(&path, 8))
            .unwrap_err();
        assert!(matches!(err, Error::BackupFailed { ref path, .. } if *path == backup_path));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_refuses_dangling_symlink_at_backup_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 64, 8, ORIGINAL);
        let backup_path = dir.path().join("game.exe.bak");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &backup_path).unwrap();

        let err = PatchExecutor::default()
            .apply(&target_at(&path, 8))
            .unwrap_err();
        assert_eq!(err.kind(), "BackupFailed");
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_apply_backup_failure_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 64, 8, ORIGINAL);
        // parent directory of the backup does not exist
        let executor = PatchExecutor::new(PatchOptions {
            backup_suffix: ".d/x".to_string(),
            ..Default::default()
        });

        let err = executor.apply(&target_at(&path, 8)).unwrap_err();
        assert!(matches!(err, Error::BackupFailed { .. }));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!dir.path().join("game.exe.d").exists());
    }

    #[test]
    fn test_apply_without_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 64, 8, ORIGINAL);
        let target = target_at(&path, 8);
        let executor = PatchExecutor::new(PatchOptions {
            verify: false,
            ..Default::default()
        });

        let outcome = executor.apply(&target).unwrap();
        assert!(matches!(outcome, ApplyOutcome::Patched { .. }));
        assert_eq!(target.status().unwrap(), PatchStatus::Patched);
    }

    #[test]
    fn test_verify_rejects_unpatched_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 64, 8, ORIGINAL);

        let err = PatchExecutor::default()
            .verify(&target_at(&path, 8))
            .unwrap_err();
        match err {
            Error::VerificationFailed {
                offset,
                expected,
                found,
                ..
            } => {
                assert_eq!(offset, 8);
                assert_eq!(expected, "B0 01 C3");
                assert_eq!(found, "33 C0 83");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_verify_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        fs::write(&path, [0xB0u8, 0x01]).unwrap();

        let err = PatchExecutor::default()
            .verify(&target_at(&path, 0))
            .unwrap_err();
        assert!(matches!(err, Error::VerificationFailed { ref found, .. } if found == "-"));
        assert_eq!(err.kind(), "VerificationFailed");
    }

    #[test]
    fn test_verify_accepts_patched_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 64, 8, PATCHED);
        assert!(PatchExecutor::default().verify(&target_at(&path, 8)).is_ok());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 64, 8, ORIGINAL);
        let executor = PatchExecutor::new(PatchOptions {
            dry_run: true,
            ..Default::default()
        });

        let outcome = executor.apply(&target_at(&path, 8)).unwrap();
        let backup_path = dir.path().join("game.exe.bak");
        assert_eq!(
            outcome,
            ApplyOutcome::WouldPatch {
                backup: BackupOutcome::WouldCreate(backup_path.clone())
            }
        );
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!backup_path.exists());
    }

    #[test]
    fn test_dry_run_still_reports_unknown_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 64, 8, &[0, 0, 0]);
        let executor = PatchExecutor::new(PatchOptions {
            dry_run: true,
            ..Default::default()
        });
        let err = executor.apply(&target_at(&path, 8)).unwrap_err();
        assert_eq!(err.kind(), "UnexpectedBytes");
    }

    #[test]
    fn test_restore_after_apply_returns_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 2048, 512, ORIGINAL);
        let target = target_at(&path, 512);
        let executor = PatchExecutor::default();

        executor.apply(&target).unwrap();
        assert_ne!(fs::read(&path).unwrap(), before);

        let outcome = executor.restore(&target).unwrap();
        assert_eq!(outcome, RestoreOutcome::Restored(dir.path().join("game.exe.bak")));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(target.status().unwrap(), PatchStatus::Unpatched);
        // backup is never removed
        assert!(dir.path().join("game.exe.bak").exists());
    }

    #[test]
    fn test_restore_without_backup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 16, 0, PATCHED);

        let err = PatchExecutor::default()
            .restore(&target_at(&path, 0))
            .unwrap_err();
        assert!(matches!(err, Error::BackupNotFound { .. }));
        assert_eq!(err.kind(), "BackupNotFound");
    }

    #[test]
    fn test_restore_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        write_fixture(&path, 16, 0, PATCHED);
        fs::write(dir.path().join("game.exe.bak"), b"backup").unwrap();

        let executor = PatchExecutor::new(PatchOptions {
            dry_run: true,
            ..Default::default()
        });
        let outcome = executor.restore(&target_at(&path, 0)).unwrap();
        assert!(matches!(outcome, RestoreOutcome::WouldRestore(_)));
        assert_eq!(target_at(&path, 0).status().unwrap(), PatchStatus::Patched);
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_unreadable_backup_names_backup() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.exe");
        let before = write_fixture(&path, 16, 0, PATCHED);
        let backup_path = dir.path().join("game.exe.bak");
        fs::write(&backup_path, b"backup").unwrap();
        fs::set_permissions(&backup_path, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&backup_path).is_ok() {
            // permission bits are not enforced for this user (root)
            return;
        }

        let err = PatchExecutor::default()
            .restore(&target_at(&path, 0))
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied { ref path, .. } if *path == backup_path));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_nier_automata_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let known = nierpatch_targets::lookup("NieRAutomata.exe").unwrap();
        let path = dir.path().join(known.file_name);
        let before = write_fixture(&path, 0x90_0000, 0x8B_6000, &[0x33, 0xC0, 0x83]);

        let target = PatchTarget::from_known(dir.path(), known).unwrap();
        assert_eq!(target.description(), Some("DirectX 12 version"));
        assert_eq!(target.status().unwrap(), PatchStatus::Unpatched);

        PatchExecutor::default().apply(&target).unwrap();

        let after = fs::read(&path).unwrap();
        assert_eq!(after.len(), 0x90_0000);
        assert_eq!(&after[0x8B_6000..0x8B_6003], &[0xB0, 0x01, 0xC3]);
        let backup = fs::read(dir.path().join("NieRAutomata.exe.bak")).unwrap();
        assert_eq!(backup, before);
        assert_eq!(target.status().unwrap(), PatchStatus::Patched);
    }

    #[test]
    fn test_hex_bytes() {
        assert_eq!(hex_bytes(&[0x33, 0xC0, 0x83]), "33 C0 83");
        assert_eq!(hex_bytes(&[0x0A]), "0A");
        assert_eq!(hex_bytes(&[]), "");
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&PatchStatus::InvalidOffset).unwrap(),
            "\"invalid_offset\""
        );
        assert_eq!(PatchStatus::InvalidOffset.to_string(), "invalid_offset");
        assert_eq!(PatchStatus::Patched.to_string(), "patched");
    }
}
