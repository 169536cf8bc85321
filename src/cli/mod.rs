//! Command-line interface for cpplibhub

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::settings::SettingsStore;

mod create;
mod settings;

pub use create::validate_project_name;

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project
    Create {
        /// Specify project name
        #[arg(long = "project_name", alias = "project-name", default_value = "")]
        project_name: String,

        /// Interactive project creation mode. User has to answer the questions.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Show the loaded settings
    Settings {
        /// Print settings as JSON
        #[arg(long)]
        json: bool,

        /// Rewrite the settings file with defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Execute a CLI command.
///
/// `store` is already loaded; for `settings --reset` it holds the fresh defaults.
pub fn execute(command: Option<Commands>, store: &SettingsStore, quiet: bool) -> Result<()> {
    let json = matches!(command, Some(Commands::Settings { json: true, .. }));
    if store.first_run() && !quiet && !json {
        println!(
            "{} Initialized cpplibhub home at {}",
            "✓".green(),
            store.settings().paths.home.display()
        );
    }

    match command {
        Some(Commands::Create {
            project_name,
            interactive,
        }) => create::run(&project_name, interactive, store),
        Some(Commands::Settings { json, reset }) => settings::run(json, reset, store),
        None => {
            if !quiet {
                println!("Run {} for usage.", "cpplibhub --help".bold());
            }
            Ok(())
        }
    }
}
