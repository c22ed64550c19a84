//! Locate external executables under a directory tree

use crate::error::{BridgeError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File name of an executable on the current platform
pub fn platform_executable(stem: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", stem)
    } else {
        stem.to_string()
    }
}

/// Find the first file named `name` anywhere below `root`
pub fn find_executable(name: &str, root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| !e.file_type().is_dir() && e.file_name() == name)
        .map(|e| e.path().to_path_buf())
}

/// Like [`find_executable`] but fails with `MissingExecutable`
pub fn locate(name: &str, root: &Path) -> Result<PathBuf> {
    let found = find_executable(name, root).ok_or_else(|| BridgeError::MissingExecutable {
        name: name.to_string(),
        root: root.to_path_buf(),
    })?;
    debug!("Located {} at {}", name, found.display());
    Ok(found)
}
