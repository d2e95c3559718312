//! Running one operation over several targets.
//!
//! A failure on one target is recorded and the next target is still
//! attempted. The caller decides the exit status from the report.

use crate::error::{Error, Result};
use crate::patch::PatchTarget;

/// Result of one operation on one target.
#[derive(Debug)]
pub struct TargetReport<T> {
    /// Target file name.
    pub name: String,
    /// Operation result.
    pub result: Result<T>,
}

/// Results of an operation over a list of targets, in input order.
#[derive(Debug)]
pub struct BatchReport<T> {
    entries: Vec<TargetReport<T>>,
}

impl<T> BatchReport<T> {
    /// All per-target results.
    pub fn entries(&self) -> &[TargetReport<T>] {
        &self.entries
    }

    /// Number of targets attempted.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Number of targets that succeeded.
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    /// Number of targets that failed.
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Error unless at least one target succeeded.
    pub fn ensure_any_succeeded(&self) -> Result<()> {
        if self.succeeded() == 0 {
            return Err(Error::NothingProcessed {
                attempted: self.total(),
            });
        }
        Ok(())
    }
}

/// Run `op` on every target in order, isolating failures.
pub fn run_batch<T, F>(targets: &[PatchTarget], mut op: F) -> BatchReport<T>
where
    F: FnMut(&PatchTarget) -> Result<T>,
{
    let mut entries = Vec::with_capacity(targets.len());
    for target in targets {
        let name = target.name();
        tracing::debug!(name = %name, "processing");
        let result = op(target);
        if let Err(e) = &result {
            tracing::warn!(name = %name, kind = e.kind(), error = %e, "target failed");
        }
        entries.push(TargetReport { name, result });
    }
    BatchReport { entries }
}
