//! Restore command implementation.

use clap::Args;
use nierpatch::batch::run_batch;

use super::{display_name, Context};

/// Restore executables from their backups.
#[derive(Args, Debug)]
pub struct RestoreCmd {}

impl RestoreCmd {
    /// Execute the restore command.
    pub fn run(&self, ctx: &Context) -> nierpatch::Result<()> {
        let targets = ctx.targets()?;
        let executor = ctx.executor();

        let report = run_batch(&targets, |target| {
            let outcome = executor.restore(target);
            match &outcome {
                Ok(o) => println!("{}: {}", display_name(target), o),
                Err(e) => eprintln!("{}: failed [{}]: {}", display_name(target), e.kind(), e),
            }
            outcome
        });

        println!(
            "Restored {}/{} executable(s) from backup",
            report.succeeded(),
            report.total()
        );
        report.ensure_any_succeeded()
    }
}
