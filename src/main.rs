//! nierpatch CLI entry point.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use nierpatch::PatcherConfig;
use tracing_subscriber::EnvFilter;

mod cli;

/// nierpatch - NieR: Automata offline patch tool
#[derive(Parser, Debug)]
#[command(name = "nierpatch")]
#[command(about = "NieR: Automata offline patch tool - enable Ending E while offline")]
#[command(version)]
#[command(after_help = "Credits: Lance McDonald (@manfightdragon) for the original discovery")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory containing the executables (default: current directory).
    #[arg(short, long, global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Only operate on this executable (e.g. NieRAutomata.exe).
    #[arg(short, long, global = true, value_name = "EXECUTABLE")]
    target: Option<String>,

    /// Show what would be done without making changes.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable verbose output (repeat for debug output).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Use this config file instead of the default location.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Patch every executable found (default).
    Apply(cli::apply::ApplyCmd),

    /// Show the patch status of every executable found.
    Status(cli::status::StatusCmd),

    /// Create backups without patching.
    Backup(cli::backup::BackupCmd),

    /// Restore executables from their backups.
    Restore(cli::restore::RestoreCmd),

    /// List the executables nierpatch knows how to patch.
    #[command(alias = "ls")]
    List(cli::list::ListCmd),

    /// Show the effective configuration.
    Config(cli::config::ConfigCmd),
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    tracing::debug!(version = nierpatch::VERSION, "starting nierpatch");

    // Load configuration; an explicit --config must load, the default may not exist
    let config = match &cli.config {
        Some(path) => match PatcherConfig::load_from(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => match PatcherConfig::load() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                PatcherConfig::default()
            }
        },
    };

    let directory = cli
        .directory
        .or_else(|| config.default_directory.clone())
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let ctx = cli::Context {
        config,
        config_path: cli.config.or_else(PatcherConfig::default_path),
        directory,
        target: cli.target,
        dry_run: cli.dry_run,
    };

    if ctx.dry_run {
        println!("[dry run] no files will be modified");
    }

    // Execute command
    let result = match cli.command {
        Some(Commands::Apply(cmd)) => cmd.run(&ctx),
        Some(Commands::Status(cmd)) => cmd.run(&ctx),
        Some(Commands::Backup(cmd)) => cmd.run(&ctx),
        Some(Commands::Restore(cmd)) => cmd.run(&ctx),
        Some(Commands::List(cmd)) => cmd.run(),
        Some(Commands::Config(cmd)) => cmd.run(&ctx),
        None => cli::apply::ApplyCmd::default().run(&ctx),
    };

    // Handle errors
    if let Err(e) = result {
        tracing::error!(kind = e.kind(), error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `-v` raises the level from warn.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "nierpatch=warn",
        1 => "nierpatch=info",
        _ => "nierpatch=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
