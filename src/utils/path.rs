//! Path utilities for cross-platform compatibility.
//!
//! [`expand_home`] resolves the `~` shorthand before a run starts, and
//! [`safe_path`] lifts Windows' `MAX_PATH` limit for every filesystem call
//! the executor makes.

use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` to the current user's home directory.
///
/// Only a bare `~` or a path starting with `~/` (or `~\` on Windows) is
/// expanded. `~user` forms and paths without a leading tilde are returned
/// unchanged, as is everything when no home directory can be determined.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use treecopy::expand_home;
///
/// assert_eq!(expand_home(Path::new("/tmp/data")), Path::new("/tmp/data"));
/// if let Some(home) = dirs::home_dir() {
///     assert_eq!(expand_home(Path::new("~/data")), home.join("data"));
/// }
/// ```
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Convert a path to an extended-length path format on Windows.
///
/// Absolute paths like `C:\path` become `\\?\C:\path` and UNC paths like
/// `\\server\share` become `\\?\UNC\server\share`. Relative paths are made
/// absolute first.
#[cfg(windows)]
fn to_extended_length_path(path: &Path) -> PathBuf {
    let path_str = path.as_os_str().to_string_lossy();
    if path_str.starts_with(r"\\?\") {
        return path.to_path_buf();
    }

    if let Some(unc) = path_str.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"\\?\UNC\{unc}"));
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        // The path may not exist yet, so no canonicalize.
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => return path.to_path_buf(),
        }
    };
    PathBuf::from(format!(r"\\?\{}", absolute.display()))
}

/// Convert a path for safe use with file operations.
///
/// On Windows the path is always converted to extended-length form, since
/// temp file names appended later can push an otherwise short path past
/// `MAX_PATH`.
#[cfg(windows)]
pub(crate) fn safe_path(path: &Path) -> PathBuf {
    to_extended_length_path(path)
}

/// Convert a path for safe use with file operations.
///
/// On non-Windows platforms, this simply returns a clone of the input path.
#[cfg(not(windows))]
pub(crate) fn safe_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
