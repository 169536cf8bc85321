//! Settings display command

use anyhow::Result;
use colored::Colorize;

use crate::settings::SettingsStore;

/// Print the settings held by `store`.
///
/// With `reset` the store was already rebuilt from defaults by
/// [`crate::settings::reset`]; only the confirmation is printed here.
pub fn run(json: bool, reset: bool, store: &SettingsStore) -> Result<()> {
    if reset && !json {
        println!("{} Settings reset to defaults", "✓".green());
        println!();
    }

    if json {
        let output = serde_json::json!({
            "file": store.file(),
            "first_run": store.first_run(),
            "settings": store.settings(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}: {}", "Settings file".bold(), store.file().display());
    if store.recreated() && !reset {
        println!("  {}", "(recreated with defaults)".yellow());
    }

    let mut current_section = String::new();
    for (section, key, value) in store.entries() {
        if section != current_section {
            println!();
            println!("[{}]", section.cyan());
            current_section = section;
        }
        println!("  {} = {}", key.bold(), value);
    }

    Ok(())
}
