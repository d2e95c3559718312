//! nierpatch - offline patch tool for NieR: Automata.
//!
//! The game gates Ending E behind an online check. Both shipped
//! executables keep that check at a fixed file offset; nierpatch verifies
//! the three bytes there, backs the executable up, and overwrites them so
//! the check always passes.
//!
//! ```no_run
//! use std::path::Path;
//! use nierpatch::{discover, PatchExecutor};
//!
//! let executor = PatchExecutor::default();
//! for target in discover::resolve_targets(Path::new("."), None)? {
//!     println!("{}: {}", target.name(), executor.apply(&target)?);
//! }
//! # Ok::<(), nierpatch::Error>(())
//! ```

#![deny(missing_docs)]

pub mod backup;
pub mod batch;
pub mod config;
pub mod discover;
pub mod error;
pub mod patch;

pub use config::PatcherConfig;
pub use error::{Error, Result};
pub use nierpatch_targets as targets;
pub use patch::{
    ApplyOutcome, BackupOutcome, Inspection, PatchExecutor, PatchOptions, PatchStatus,
    PatchTarget, RestoreOutcome,
};

/// nierpatch version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
