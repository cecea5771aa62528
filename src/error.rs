//! Error types for treecopy.
//!
//! Errors come in two layers:
//!
//! | Layer | Type | Effect |
//! |-------|------|--------|
//! | Whole run | [`Error`] | Aborts before any entry is dispatched |
//! | Single entry | [`EntryError`] | Logged and counted in [`CopyResult::errors`](crate::CopyResult::errors) |
//!
//! [`copy_directory`](crate::copy_directory) only returns [`Error`] for fatal
//! conditions (missing source, bad configuration, unusable destination root).
//! A locked file or a permission problem deep in the tree never fails the run.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for treecopy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | All | [`io::ErrorKind::StorageFull`] |
/// | Unix | `ENOSPC` (errno 28) |
/// | Windows | `ERROR_DISK_FULL` (112) |
///
/// # Example
///
/// ```
/// use std::io;
/// use treecopy::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    const NO_SPACE_CODE: i32 = 28;
    #[cfg(windows)]
    const NO_SPACE_CODE: i32 = 112;

    #[cfg(any(unix, windows))]
    {
        if let Some(raw) = error.raw_os_error() {
            return raw == NO_SPACE_CODE;
        }
    }

    false
}

/// Stable, machine-readable error classification.
///
/// Used by the CLI for `error[code]` prefixes and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Source root is missing
    SourceNotFound,
    /// Options or arguments are unusable
    InvalidInput,
    /// Access was denied by the filesystem
    PermissionDenied,
    /// Destination ran out of space
    NoSpace,
    /// Any other IO failure
    IoError,
}

impl ErrorCode {
    /// The snake_case identifier for this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceNotFound => "source_not_found",
            Self::InvalidInput => "invalid_input",
            Self::PermissionDenied => "permission_denied",
            Self::NoSpace => "no_space",
            Self::IoError => "io_error",
        }
    }

    fn from_io(error: &io::Error) -> Self {
        EntryErrorKind::classify(error).code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal errors that abort a copy run before any work is done.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source is not a directory
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Source is a directory, use `copy_directory` instead
    #[error("Source is a directory, use copy_directory instead: {0}")]
    IsADirectory(PathBuf),

    /// Options conflict or are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An exclusion pattern could not be compiled
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as given by the caller
        pattern: String,
        /// Underlying glob error
        source: globset::Error,
    },

    /// The destination root could not be created
    #[error("Failed to prepare destination {path}: {source}")]
    Destination {
        /// Destination root
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// A single-file copy failed (only returned by [`copy_file`](crate::copy_file))
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// IO error while opening the source tree
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify this error into a stable [`ErrorCode`].
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SourceNotFound(_) => ErrorCode::SourceNotFound,
            Self::NotADirectory(_)
            | Self::IsADirectory(_)
            | Self::InvalidConfiguration(_)
            | Self::InvalidPattern { .. } => ErrorCode::InvalidInput,
            Self::Destination { source, .. } | Self::Io(source) => ErrorCode::from_io(source),
            Self::Entry(entry) => entry.kind.code(),
        }
    }
}

/// Classification of a per-entry failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryErrorKind {
    /// The filesystem refused access
    PermissionDenied,
    /// The destination is full
    NoSpace,
    /// Locked files, type conflicts, symlink loops and everything else
    IoFailure,
}

impl EntryErrorKind {
    /// Classify an IO error.
    pub fn classify(error: &io::Error) -> Self {
        if is_no_space_error(error) {
            Self::NoSpace
        } else if error.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied
        } else {
            Self::IoFailure
        }
    }

    fn code(self) -> ErrorCode {
        match self {
            Self::PermissionDenied => ErrorCode::PermissionDenied,
            Self::NoSpace => ErrorCode::NoSpace,
            Self::IoFailure => ErrorCode::IoError,
        }
    }
}

impl fmt::Display for EntryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PermissionDenied => "permission denied",
            Self::NoSpace => "no space left",
            Self::IoFailure => "io failure",
        })
    }
}

/// A failure confined to one tree entry.
#[derive(Error, Debug)]
#[error("{kind} at {}: {source}", .path.display())]
pub struct EntryError {
    /// Path the failure happened at (source or destination side)
    pub path: PathBuf,
    /// Classification of `source`
    pub kind: EntryErrorKind,
    /// Underlying error
    #[source]
    pub source: io::Error,
}

impl EntryError {
    /// Wrap an IO error that occurred at `path`.
    pub fn new(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind: EntryErrorKind::classify(&source),
            source,
        }
    }
}
