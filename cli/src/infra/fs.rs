//! Filesystem infrastructure: resolves input file paths.

use std::path::{Path, PathBuf};

use crate::domain::InputError;

/// Resolve `path` relative to the working directory (the checked-out
/// repository in CI) and confirm it names a regular file.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the path does not exist or is not a file.
pub fn resolve_file_path(path: &Path) -> Result<PathBuf, InputError> {
    let not_found = || InputError::FileNotFound(path.display().to_string());
    let resolved = std::fs::canonicalize(path).map_err(|_| not_found())?;
    if !resolved.is_file() {
        return Err(not_found());
    }
    Ok(resolved)
}
