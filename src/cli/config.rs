//! Config command implementation.

use clap::Args;

use super::Context;

/// Show the effective configuration.
#[derive(Args, Debug)]
pub struct ConfigCmd {}

impl ConfigCmd {
    /// Execute the config command.
    pub fn run(&self, ctx: &Context) -> nierpatch::Result<()> {
        match &ctx.config_path {
            Some(path) if path.exists() => println!("# Config file: {}", path.display()),
            Some(path) => println!(
                "# Config file: {} (not present, using defaults)",
                path.display()
            ),
            None => println!("# No config directory available, using defaults"),
        }
        println!("# Scan directory: {}", ctx.directory.display());
        println!();
        print!("{}", ctx.config.to_toml()?);
        Ok(())
    }
}
