//! cpplibhub - simple dependency management tool for C++ and C projects

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cpplibhub::cli::{self, Commands};
use cpplibhub::settings::{self, SettingsStore};

/// Simple dependency management tool for C++ and C projects.
#[derive(Parser)]
#[command(name = "cpplibhub")]
#[command(version)]
#[command(about = "Simple dependency management tool for C++ and C projects", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory holding user settings and data (default: ~/cpplibhub)
    #[arg(long, env = "CPPLIBHUB_HOME", global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Settings are checked on every start; a reset must not parse the old file
    let store = match &cli.command {
        Some(Commands::Settings { reset: true, .. }) => settings::reset(cli.home.as_deref())?,
        _ => SettingsStore::init(cli.home.as_deref())?,
    };

    cli::execute(cli.command, &store, cli.quiet)
}
