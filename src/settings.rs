//! Per-user settings for cpplibhub
//!
//! Settings live in `<home>/cpplibhub.ini`, where `<home>` defaults to
//! `~/cpplibhub`. The file uses INI layout (`[SECTION]` headers followed by
//! `key = "value"` lines) and is read with the TOML parser, which accepts that
//! layout as-is.
//!
//! [`SettingsStore::init`] runs on every start and brings the home directory
//! back into a usable state: it creates the directory on first run, rewrites
//! the default file if someone deleted it, and loads the result on top of the
//! built-in defaults so that keys missing from the file keep their default
//! values.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::files;

/// Name of the settings file inside the home directory
pub const SETTINGS_FILE: &str = "cpplibhub.ini";

/// Name of the home directory inside the user's home
pub const HOME_DIR_NAME: &str = "cpplibhub";

/// All settings, one field per file section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "PATHS")]
    pub paths: PathsSettings,

    #[serde(rename = "DOWNLOAD", default)]
    pub download: DownloadSettings,
}

/// `[PATHS]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsSettings {
    /// User settings and other per-user data
    pub home: PathBuf,

    /// Where fetched libraries are stored
    pub libhub: PathBuf,
}

impl PathsSettings {
    fn for_home(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            libhub: home.join("libhub"),
        }
    }
}

/// `[DOWNLOAD]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-transfer timeout in seconds (0 = no timeout)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts per download, at least one is always made
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

fn default_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            retries: default_retries(),
            show_progress: true,
        }
    }
}

impl Settings {
    /// Built-in defaults for the given home directory
    pub fn defaults(home: &Path) -> Self {
        Self {
            paths: PathsSettings::for_home(home),
            download: DownloadSettings::default(),
        }
    }

    /// Render the settings file contents
    pub fn to_file_contents(&self) -> Result<String> {
        let body = toml::to_string(self).context("Failed to serialize settings")?;
        Ok(format!(
            "; cpplibhub settings, generated {}\n\n{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            body
        ))
    }

    /// Overlay the values found in `contents` on top of `self`
    fn merged_with(&self, contents: &str) -> Result<Self> {
        let mut merged = toml::Value::try_from(self).context("Failed to serialize settings")?;
        let overlay: toml::Table = toml::from_str(&strip_ini_comments(contents))?;

        if let toml::Value::Table(base) = &mut merged {
            for (section, values) in overlay {
                match (base.get_mut(&section), values) {
                    (Some(toml::Value::Table(existing)), toml::Value::Table(values)) => {
                        existing.extend(values);
                    }
                    (_, values) => {
                        tracing::debug!("Keeping unknown settings entry: {}", section);
                        base.insert(section, values);
                    }
                }
            }
        }

        Ok(merged.try_into()?)
    }
}

/// Lines starting with `;` are INI comments; TOML only knows `#`
fn strip_ini_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim_start().starts_with(';'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default home directory, `~/cpplibhub`
pub fn default_home() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(HOME_DIR_NAME))
        .context("Could not determine the user's home directory")
}

fn resolve_home(home: Option<&Path>) -> Result<PathBuf> {
    let home = match home {
        Some(path) => path.to_path_buf(),
        None => default_home()?,
    };

    if home.exists() && !files::dir_exists(&home) {
        bail!("Settings home {} exists but is not a directory", home.display());
    }
    Ok(home)
}

/// Loaded settings together with where they came from
#[derive(Debug, Clone)]
pub struct SettingsStore {
    file: PathBuf,
    settings: Settings,
    first_run: bool,
    recreated: bool,
}

impl SettingsStore {
    /// Establish the home directory and settings file, then load the settings.
    ///
    /// `home` overrides the default `~/cpplibhub`.
    pub fn init(home: Option<&Path>) -> Result<Self> {
        let home = resolve_home(home)?;

        let first_run = !files::dir_exists(&home);
        if first_run {
            tracing::info!("First run, creating {}", home.display());
            files::create_path(&home, false)
                .with_context(|| format!("Failed to create settings home: {}", home.display()))?;
        }

        let file = home.join(SETTINGS_FILE);
        let defaults = Settings::defaults(&home);

        let mut recreated = false;
        if !files::file_exists(&file) {
            if !first_run {
                tracing::warn!("Settings file missing, recreating defaults: {}", file.display());
                recreated = true;
            }
            write_atomically(&file, &defaults.to_file_contents()?)?;
        }

        let contents = files::read_text_file(&file)
            .with_context(|| format!("Failed to read settings: {}", file.display()))?;
        let settings = defaults
            .merged_with(&contents)
            .with_context(|| format!("Failed to parse settings: {}", file.display()))?;

        files::create_path(&settings.paths.libhub, false).with_context(|| {
            format!(
                "Failed to create library directory: {}",
                settings.paths.libhub.display()
            )
        })?;

        tracing::debug!("Loaded settings from {}", file.display());

        Ok(Self {
            file,
            settings,
            first_run,
            recreated,
        })
    }

    /// Path of the settings file
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// True if the home directory did not exist before this run
    pub fn first_run(&self) -> bool {
        self.first_run
    }

    /// True if the settings file had gone missing and was rewritten
    pub fn recreated(&self) -> bool {
        self.recreated
    }

    /// Look up a single value by section and key
    pub fn value(&self, section: &str, key: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .find(|(s, k, _)| s == section && k == key)
            .map(|(_, _, v)| v)
    }

    /// Every `(section, key, value)` triple, sorted by section then key
    pub fn entries(&self) -> Vec<(String, String, String)> {
        let Ok(toml::Value::Table(root)) = toml::Value::try_from(&self.settings) else {
            return Vec::new();
        };

        let mut entries = Vec::new();
        for (section, values) in root {
            let toml::Value::Table(values) = values else {
                continue;
            };
            for (key, value) in values {
                let value = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                entries.push((section.clone(), key, value));
            }
        }
        entries.sort();
        entries
    }
}

/// Write via a temp file in the same directory, then rename into place
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    temp.write_all(contents.as_bytes())?;
    temp.persist(path)
        .with_context(|| format!("Failed to write settings: {}", path.display()))?;
    tracing::info!("Wrote default settings: {}", path.display());
    Ok(())
}

/// Discard the settings file under `home` and load freshly written defaults.
///
/// The old file is never parsed, so a malformed file can be reset too.
pub fn reset(home: Option<&Path>) -> Result<SettingsStore> {
    let file = resolve_home(home)?.join(SETTINGS_FILE);
    if files::file_exists(&file) {
        tracing::info!("Removing settings file {}", file.display());
        fs::remove_file(&file)
            .with_context(|| format!("Failed to remove settings: {}", file.display()))?;
    }
    SettingsStore::init(home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_run_creates_home_and_file() {
        let temp = tempdir().unwrap();
        let home = temp.path().join("cpplibhub");

        let store = SettingsStore::init(Some(&home)).unwrap();

        assert!(store.first_run());
        assert!(!store.recreated());
        assert!(files::dir_exists(&home));
        assert!(files::file_exists(&home.join(SETTINGS_FILE)));
        assert_eq!(store.file(), home.join(SETTINGS_FILE));
        assert_eq!(store.settings(), &Settings::defaults(&home));
        assert!(files::dir_exists(&home.join("libhub")));
    }

    #[test]
    fn test_second_run_is_not_first() {
        let temp = tempdir().unwrap();
        let home = temp.path().join("cpplibhub");

        SettingsStore::init(Some(&home)).unwrap();
        let store = SettingsStore::init(Some(&home)).unwrap();

        assert!(!store.first_run());
        assert!(!store.recreated());
    }

    #[test]
    fn test_missing_file_is_recreated() {
        let temp = tempdir().unwrap();
        let home = temp.path().join("cpplibhub");

        let store = SettingsStore::init(Some(&home)).unwrap();
        fs::remove_file(store.file()).unwrap();

        let store = SettingsStore::init(Some(&home)).unwrap();
        assert!(!store.first_run());
        assert!(store.recreated());
        assert!(files::file_exists(store.file()));
    }

    #[test]
    fn test_existing_home_without_file_counts_as_recreated() {
        let temp = tempdir().unwrap();

        let store = SettingsStore::init(Some(temp.path())).unwrap();
        assert!(!store.first_run());
        assert!(store.recreated());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let temp = tempdir().unwrap();
        let home = temp.path().join("cpplibhub");
        let libhub = temp.path().join("custom-libs");
        files::create_path(&home, false).unwrap();
        files::write_text_file(
            &home.join(SETTINGS_FILE),
            &format!(
                "; hand edited\n[PATHS]\nlibhub = \"{}\"\n\n[DOWNLOAD]\nretries = 7\n",
                libhub.display()
            ),
        )
        .unwrap();

        let store = SettingsStore::init(Some(&home)).unwrap();
        let settings = store.settings();

        assert_eq!(settings.paths.libhub, libhub);
        // Missing keys fall back to defaults
        assert_eq!(settings.paths.home, home);
        assert_eq!(settings.download.retries, 7);
        assert_eq!(settings.download.connect_timeout_secs, 30);
        assert!(files::dir_exists(&libhub));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp = tempdir().unwrap();
        files::write_text_file(&temp.path().join(SETTINGS_FILE), "[PATHS\nlibhub = ").unwrap();

        let err = SettingsStore::init(Some(temp.path())).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse settings"));
    }

    #[test]
    fn test_reset_replaces_malformed_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join(SETTINGS_FILE);
        files::write_text_file(&file, "[PATHS\nlibhub = ").unwrap();

        let store = reset(Some(temp.path())).unwrap();

        assert_eq!(store.file(), file);
        assert_eq!(store.settings(), &Settings::defaults(temp.path()));
        assert!(files::read_text_file(&file).unwrap().contains("[PATHS]"));
        SettingsStore::init(Some(temp.path())).unwrap();
    }

    #[test]
    fn test_reset_on_fresh_home() {
        let temp = tempdir().unwrap();
        let home = temp.path().join("cpplibhub");

        let store = reset(Some(&home)).unwrap();
        assert!(store.first_run());
        assert!(files::file_exists(store.file()));
    }

    #[test]
    fn test_home_is_a_file() {
        let temp = tempdir().unwrap();
        let home = temp.path().join("cpplibhub");
        files::write_text_file(&home, "not a dir").unwrap();

        let err = SettingsStore::init(Some(&home)).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_value_lookup_and_entries() {
        let temp = tempdir().unwrap();
        let home = temp.path().join("cpplibhub");
        let store = SettingsStore::init(Some(&home)).unwrap();

        assert_eq!(
            store.value("PATHS", "home"),
            Some(home.to_string_lossy().to_string())
        );
        assert_eq!(store.value("DOWNLOAD", "retries").as_deref(), Some("3"));
        assert_eq!(store.value("DOWNLOAD", "show_progress").as_deref(), Some("true"));
        assert_eq!(store.value("PATHS", "missing"), None);
        assert_eq!(store.value("MISSING", "home"), None);

        let entries = store.entries();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].0, "DOWNLOAD");
        assert_eq!(entries[0].1, "connect_timeout_secs");
        assert_eq!(entries.last().unwrap().1, "libhub");
    }

    #[test]
    fn test_file_contents_round_trip() {
        let home = PathBuf::from("/home/user/cpplibhub");
        let contents = Settings::defaults(&home).to_file_contents().unwrap();

        assert!(contents.starts_with("; cpplibhub settings"));
        assert!(contents.contains("[PATHS]"));
        assert!(contents.contains("[DOWNLOAD]"));

        let parsed = Settings::defaults(Path::new("/elsewhere"))
            .merged_with(&contents)
            .unwrap();
        assert_eq!(parsed, Settings::defaults(&home));
    }
}
