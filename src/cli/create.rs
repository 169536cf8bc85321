//! Project creation command

use std::io::{self, BufRead, IsTerminal};

use anyhow::{bail, Context, Result};
use regex::Regex;

use crate::settings::SettingsStore;

/// Check that `name` is usable as a project (and directory) name
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Project name is required (use --project_name NAME or --interactive)");
    }

    let pattern = Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$")?;
    if !pattern.is_match(name) {
        bail!(
            "Invalid project name '{}': use letters, digits, '_', '-' or '.', starting with a letter or '_'",
            name
        );
    }
    Ok(())
}

/// Ask for the project name, reading a plain line when stdin is not a terminal
fn prompt_project_name() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return inquire::Text::new("Enter project name:")
            .prompt()
            .context("Failed to read project name");
    }

    tracing::debug!("stdin is not a terminal, reading project name as a line");
    read_project_name(stdin.lock())
}

fn read_project_name<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read project name")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn run(project_name: &str, interactive: bool, store: &SettingsStore) -> Result<()> {
    let name = if interactive {
        prompt_project_name()?
    } else {
        project_name.to_string()
    };
    let name = name.trim();

    validate_project_name(name)?;

    tracing::debug!(
        "Project libraries will come from {}",
        store.settings().paths.libhub.display()
    );
    println!("* Creating project '{}'", name);

    Ok(())
}
