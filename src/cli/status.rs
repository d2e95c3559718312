//! Status command implementation.

use clap::Args;
use nierpatch::batch::run_batch;
use nierpatch::Error;

use super::Context;

/// Show the patch status of every executable found.
#[derive(Args, Debug)]
pub struct StatusCmd {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusCmd {
    /// Execute the status command.
    pub fn run(&self, ctx: &Context) -> nierpatch::Result<()> {
        let targets = ctx.targets()?;
        let report = run_batch(&targets, |target| target.inspect());

        if self.json {
            let rows: Vec<_> = targets
                .iter()
                .zip(report.entries())
                .map(|(target, entry)| match &entry.result {
                    Ok(inspection) => serde_json::json!({
                        "name": entry.name,
                        "description": target.description(),
                        "path": target.path().display().to_string(),
                        "offset": format!("0x{:X}", target.offset()),
                        "status": inspection.status,
                        "found": inspection.found.as_deref().map(nierpatch::patch::hex_bytes),
                        "file_size": inspection.file_size,
                    }),
                    Err(e) => serde_json::json!({
                        "name": entry.name,
                        "description": target.description(),
                        "path": target.path().display().to_string(),
                        "offset": format!("0x{:X}", target.offset()),
                        "error": e.to_string(),
                        "kind": e.kind(),
                    }),
                })
                .collect();
            let text =
                serde_json::to_string_pretty(&rows).map_err(|e| Error::Other(e.to_string()))?;
            println!("{}", text);
            return Ok(());
        }

        println!(
            "{:<24} {:<34} {:<16} {}",
            "NAME", "DESCRIPTION", "STATUS", "FOUND"
        );
        println!("{}", "-".repeat(84));

        for (target, entry) in targets.iter().zip(report.entries()) {
            let description = target.description().unwrap_or("-");
            match &entry.result {
                Ok(inspection) => println!(
                    "{:<24} {:<34} {:<16} {}",
                    entry.name,
                    description,
                    inspection.status.to_string().to_uppercase(),
                    inspection.found_hex(),
                ),
                Err(e) => println!(
                    "{:<24} {:<34} {:<16} {}",
                    entry.name, description, "ERROR", e
                ),
            }
        }

        Ok(())
    }
}
