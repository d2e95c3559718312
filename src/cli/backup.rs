//! Backup command implementation.

use clap::Args;
use nierpatch::batch::run_batch;

use super::{display_name, Context};

/// Create backups without patching.
#[derive(Args, Debug)]
pub struct BackupCmd {}

impl BackupCmd {
    /// Execute the backup command.
    pub fn run(&self, ctx: &Context) -> nierpatch::Result<()> {
        let targets = ctx.targets()?;
        let executor = ctx.executor();

        let report = run_batch(&targets, |target| {
            let outcome = executor.backup(target);
            match &outcome {
                Ok(o) => println!("{}: {}", display_name(target), o),
                Err(e) => eprintln!("{}: failed [{}]: {}", display_name(target), e.kind(), e),
            }
            outcome
        });

        println!(
            "Backed up {}/{} executable(s)",
            report.succeeded(),
            report.total()
        );
        report.ensure_any_succeeded()
    }
}
