//! Path utilities

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::utils::config::VCS_METADATA_DIRS;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Relative path as a `/`-separated string, the form exclude patterns and patch labels use.
pub fn path_to_slash_string(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Key used to pick a formatter: the lowercased extension with its leading dot
/// (`src/Main.CPP` -> `.cpp`), or the bare file name when there is no extension (`BUILD`).
pub fn selector_key(path: &Path) -> Option<String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => Some(format!(".{}", ext.to_lowercase())),
        _ => path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string),
    }
}

/// Normalize a selector claimed by a formatter or named in a mapping so it compares equal
/// to what [`selector_key`] produces. Extensions get lowercased; bare names are kept.
pub fn normalize_selector(selector: &str) -> String {
    if selector.starts_with('.') {
        selector.to_lowercase()
    } else {
        selector.to_string()
    }
}

/// True for `.git`, `.hg` and friends.
pub fn is_vcs_metadata_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| VCS_METADATA_DIRS.contains(&name))
}

/// Fail unless `root` is an absolute path to an existing directory.
pub fn check_root(root: &Path) -> Result<()> {
    if !root.is_absolute() {
        bail!(
            "root directory should be an absolute path: '{}'",
            root.display()
        );
    }
    let meta = std::fs::metadata(root)
        .with_context(|| format!("read root directory {}", root.display()))?;
    if !meta.is_dir() {
        bail!("root is not a directory: '{}'", root.display());
    }
    Ok(())
}

/// Make a user-supplied directory absolute without resolving symlinks.
pub fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    std::path::absolute(dir).with_context(|| format!("resolve directory {}", dir.display()))
}
