//! File system helpers shared by record and version writes

use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::Path;

use crate::error::{LibraryError, Result};

/// Replace `path` with `contents` through a sibling temp file.
///
/// Readers see either the old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let write_failed = |reason: String| LibraryError::FileWriteFailed {
        path: path.display().to_string(),
        reason,
    };
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| write_failed(e.to_string()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
    temp.write_all(contents)
        .map_err(|e| write_failed(e.to_string()))?;
    temp.persist(path)
        .map_err(|e| write_failed(e.error.to_string()))?;
    Ok(())
}

/// Remove a file; returns false if it was already gone
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LibraryError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Convert path separators to forward slashes
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
