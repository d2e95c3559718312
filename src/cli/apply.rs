//! Apply command implementation.

use clap::Args;
use nierpatch::batch::run_batch;

use super::{display_name, Context};

/// Patch every executable found.
#[derive(Args, Debug, Default)]
pub struct ApplyCmd {}

impl ApplyCmd {
    /// Execute the apply command.
    pub fn run(&self, ctx: &Context) -> nierpatch::Result<()> {
        let targets = ctx.targets()?;
        let executor = ctx.executor();

        let report = run_batch(&targets, |target| {
            println!("Processing {}...", display_name(target));
            let outcome = executor.apply(target);
            match &outcome {
                Ok(o) => println!("  {}", o),
                Err(e) => eprintln!("  Failed [{}]: {}", e.kind(), e),
            }
            outcome
        });

        println!();
        println!(
            "Successfully processed {}/{} executable(s)",
            report.succeeded(),
            report.total()
        );
        if report.failed() > 0 {
            eprintln!("{} executable(s) failed, see messages above", report.failed());
        }
        if report.succeeded() > 0 && !ctx.dry_run {
            println!("You can now enjoy NieR: Automata Ending E offline!");
        }

        report.ensure_any_succeeded()
    }
}
