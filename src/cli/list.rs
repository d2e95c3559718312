//! List command implementation.

use clap::Args;
use nierpatch::patch::hex_bytes;
use nierpatch::targets::KNOWN_EXECUTABLES;
use nierpatch::Error;

/// List the executables nierpatch knows how to patch.
#[derive(Args, Debug)]
pub struct ListCmd {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListCmd {
    /// Execute the list command.
    pub fn run(&self) -> nierpatch::Result<()> {
        if self.json {
            let text = serde_json::to_string_pretty(KNOWN_EXECUTABLES)
                .map_err(|e| Error::Other(e.to_string()))?;
            println!("{}", text);
            return Ok(());
        }

        println!(
            "{:<24} {:<34} {:<10} {:<10} {}",
            "NAME", "DESCRIPTION", "OFFSET", "ORIGINAL", "PATCHED"
        );
        println!("{}", "-".repeat(90));

        for known in KNOWN_EXECUTABLES {
            println!(
                "{:<24} {:<34} {:<10} {:<10} {}",
                known.file_name,
                known.description,
                format!("0x{:X}", known.offset),
                hex_bytes(known.original),
                hex_bytes(known.patched),
            );
        }

        Ok(())
    }
}
