//! Filesystem helpers for workspace and package staging.

use std::fs;
use std::io;
use std::path::Path;

/// Delete a directory tree if it exists.
///
/// Returns true if the directory existed and was removed.
pub fn rmtree_if_exists(path: &Path) -> io::Result<bool> {
    if path.exists() {
        fs::remove_dir_all(path)?;
        return Ok(true);
    }
    Ok(false)
}

/// Recursively copy a file or directory to `dst`.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        fs::create_dir(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dst)?;
    }
    Ok(())
}

/// List the names of the direct children of a directory, sorted.
pub fn list_dir_names(path: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    Ok(names)
}
