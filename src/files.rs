//! Filesystem helpers
//!
//! Thin wrappers over `std::fs` with a uniform contract: every fallible
//! operation returns [`Result`], nothing panics, and "already in the desired
//! state" is a success (removing a missing file, creating an existing path).

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Kind of a filesystem item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    File,
    Dir,
    Symlink,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::File => "file",
            ItemType::Dir => "dir",
            ItemType::Symlink => "symlink",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// True if the path exists and is not a directory (symlinks are followed)
pub fn file_exists(path: &Path) -> bool {
    path.exists() && !path.is_dir()
}

/// True if the path is a directory (symlinks are followed)
pub fn dir_exists(path: &Path) -> bool {
    path.is_dir()
}

/// True if the path itself is a symlink, dangling or not
pub fn symlink_exists(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Split a path into its parent and its last component.
///
/// A trailing separator is ignored: both `/a/b` and `/a/b/` give `("/a", "b")`.
pub fn path_base_and_leaf(path: &Path) -> (PathBuf, String) {
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf());
    let leaf = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    (base, leaf)
}

/// Create or overwrite a text file
pub fn write_text_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

/// Read a whole text file
pub fn read_text_file(path: &Path) -> Result<String> {
    if !file_exists(path) {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Create a directory and all missing parents.
///
/// An existing directory is left alone unless `overwrite` is set, in which
/// case it is removed with its contents and created empty.
pub fn create_path(path: &Path, overwrite: bool) -> Result<()> {
    if dir_exists(path) {
        if !overwrite {
            return Ok(());
        }
        tracing::debug!("Recreating directory: {}", path.display());
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Remove a file; succeeds if there is no such file
pub fn remove_file(path: &Path) -> Result<()> {
    if file_exists(path) {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Remove a symlink (not its target); succeeds if the path is not a symlink
pub fn remove_symlink(path: &Path) -> Result<()> {
    if !symlink_exists(path) {
        return Ok(());
    }
    #[cfg(windows)]
    {
        if path.is_dir() {
            fs::remove_dir(path)?;
            return Ok(());
        }
    }
    fs::remove_file(path)?;
    Ok(())
}

/// Remove a directory tree; succeeds if there is no such directory
pub fn remove_dir(path: &Path) -> Result<()> {
    if dir_exists(path) {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Create a symlink at `link` pointing to `target`
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)?;
        } else {
            std::os::windows::fs::symlink_file(target, link)?;
        }
    }

    Ok(())
}

fn clear_file_destination(dest: &Path) -> Result<()> {
    remove_file(dest).map_err(|e| match e {
        Error::Io(source) => Error::DestinationNotRemovable {
            path: dest.to_path_buf(),
            source,
        },
        other => other,
    })
}

fn clear_dir_destination(dest: &Path) -> Result<()> {
    remove_dir(dest).map_err(|e| match e {
        Error::Io(source) => Error::DestinationNotRemovable {
            path: dest.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Target of a file copy or move: an existing directory receives the file
/// under its own name
fn file_destination(origin: &Path, dest: &Path) -> PathBuf {
    match origin.file_name() {
        Some(name) if dir_exists(dest) => dest.join(name),
        _ => dest.to_path_buf(),
    }
}

/// Copy a file, replacing any existing file at `dest`.
///
/// When `dest` is a directory the file is copied into it.
pub fn copy_file(origin: &Path, dest: &Path) -> Result<()> {
    if !file_exists(origin) {
        return Err(Error::OriginNotFound(origin.to_path_buf()));
    }
    let dest = file_destination(origin, dest);
    clear_file_destination(&dest)?;
    fs::copy(origin, &dest)?;
    Ok(())
}

/// Move a file, replacing any existing file at `dest`.
///
/// When `dest` is a directory the file is moved into it.
pub fn move_file(origin: &Path, dest: &Path) -> Result<()> {
    if !file_exists(origin) {
        return Err(Error::OriginNotFound(origin.to_path_buf()));
    }
    let dest = file_destination(origin, dest);
    clear_file_destination(&dest)?;
    if let Err(e) = fs::rename(origin, &dest) {
        // Rename fails across filesystems
        tracing::debug!("Rename failed ({}), copying instead", e);
        fs::copy(origin, &dest)?;
        fs::remove_file(origin)?;
    }
    Ok(())
}

/// Copy a directory tree, replacing any existing directory at `dest`
pub fn copy_dir(origin: &Path, dest: &Path) -> Result<()> {
    if !dir_exists(origin) {
        return Err(Error::OriginNotFound(origin.to_path_buf()));
    }
    clear_dir_destination(dest)?;
    copy_tree(origin, dest)
}

fn copy_tree(origin: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(origin).follow_links(true) {
        let entry = entry?;
        let Ok(rel_path) = entry.path().strip_prefix(origin) else {
            continue;
        };
        let target = dest.join(rel_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Move (rename) a directory tree, replacing any existing directory at `dest`
pub fn move_dir(origin: &Path, dest: &Path) -> Result<()> {
    if !dir_exists(origin) {
        return Err(Error::OriginNotFound(origin.to_path_buf()));
    }
    clear_dir_destination(dest)?;
    if let Err(e) = fs::rename(origin, dest) {
        tracing::debug!("Rename failed ({}), copying tree instead", e);
        copy_tree(origin, dest)?;
        fs::remove_dir_all(origin)?;
    }
    Ok(())
}

fn child_names(path: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>> {
    if !dir_exists(path) {
        return Err(Error::PathNotFound(path.to_path_buf()));
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if keep(&entry.path()) {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Names of the immediate subdirectories, sorted
pub fn subdirs(path: &Path) -> Result<Vec<String>> {
    child_names(path, |p| p.is_dir())
}

/// Names of the files directly inside `path`, sorted.
///
/// Symlinks to files count as files.
pub fn file_list(path: &Path) -> Result<Vec<String>> {
    child_names(path, |p| p.is_file())
}

/// Number of entries directly inside `path`
pub fn dir_item_count(path: &Path) -> Result<usize> {
    Ok(child_names(path, |_| true)?.len())
}

/// True if the directory has no entries or does not exist
pub fn dir_empty(path: &Path) -> bool {
    dir_item_count(path).map(|n| n == 0).unwrap_or(true)
}

/// Kind of the item at `path`, `None` if nothing is there
pub fn item_type(path: &Path) -> Option<ItemType> {
    if symlink_exists(path) {
        Some(ItemType::Symlink)
    } else if file_exists(path) {
        Some(ItemType::File)
    } else if dir_exists(path) {
        Some(ItemType::Dir)
    } else {
        None
    }
}
