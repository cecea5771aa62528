//! Per-entry conflict resolution.
//!
//! [`resolve`] is a pure function of the source entry, what is already at
//! the destination and the [`UpdateMode`]. The only outside input it ever
//! consults is the optional [`ConflictPrompter`] for [`UpdateMode::Prompt`].

use crate::error::EntryError;
use crate::options::UpdateMode;
use crate::walk::{EntryKind, TreeEntry};
use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Interactive decision capability for [`UpdateMode::Prompt`].
///
/// Implementations must return promptly; a prompter that cannot ask anyone
/// (for example without a terminal) should return `false`.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use treecopy::ConflictPrompter;
///
/// /// Replace only log files.
/// struct LogsOnly;
///
/// impl ConflictPrompter for LogsOnly {
///     fn confirm(&self, destination: &Path) -> bool {
///         destination.extension().is_some_and(|ext| ext == "log")
///     }
/// }
/// ```
pub trait ConflictPrompter: Send + Sync {
    /// Whether the existing file at `destination` should be replaced.
    fn confirm(&self, destination: &Path) -> bool;
}

impl fmt::Debug for dyn ConflictPrompter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConflictPrompter")
    }
}

/// What to do with one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing exists at the destination; write it
    Create,
    /// Replace the existing destination file
    Overwrite,
    /// Leave the destination alone
    Skip,
    /// Prune a directory and everything beneath it
    ExcludeDirectory,
}

/// A resolved entry, ready for a [`Sink`](crate::Sink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The source entry this decision is about
    pub entry: TreeEntry,
    /// The resolved action
    pub action: Action,
}

impl Decision {
    /// A decision that prunes `entry`.
    pub fn exclude(entry: TreeEntry) -> Self {
        Self {
            entry,
            action: Action::ExcludeDirectory,
        }
    }

    /// Whether executing this decision writes to the destination.
    pub fn writes(&self) -> bool {
        matches!(self.action, Action::Create | Action::Overwrite)
    }
}

/// What is currently at the destination path of an entry.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// Destination path (shown to the prompter)
    pub path: &'a Path,
    /// Kind of the existing entry, `None` when nothing is there
    pub kind: Option<EntryKind>,
    /// Its last-modified time, when known
    pub modified: Option<SystemTime>,
}

impl<'a> Target<'a> {
    /// Nothing exists at `path`.
    pub fn absent(path: &'a Path) -> Self {
        Self {
            path,
            kind: None,
            modified: None,
        }
    }

    /// An existing entry at `path`. Anything that is not a directory counts
    /// as a file, since a file write replaces it.
    pub fn existing(path: &'a Path, meta: &Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Self {
            path,
            kind: Some(kind),
            modified: meta.modified().ok(),
        }
    }

    /// Whether anything exists at the destination.
    pub fn exists(&self) -> bool {
        self.kind.is_some()
    }

    /// The failure for writing an entry of `kind` here, when the
    /// destination already holds the other kind.
    ///
    /// A file never replaces a directory and a directory is never created
    /// over a file, whatever the update mode.
    pub fn conflict(&self, kind: EntryKind) -> Option<EntryError> {
        let source = match (kind, self.kind?) {
            (EntryKind::File, EntryKind::Directory) => {
                io::Error::new(io::ErrorKind::IsADirectory, "destination is a directory")
            }
            (EntryKind::Directory, EntryKind::File) => io::Error::new(
                io::ErrorKind::NotADirectory,
                "destination exists and is not a directory",
            ),
            _ => return None,
        };
        Some(EntryError::new(self.path, source))
    }
}

/// Decide what to do with `entry`.
///
/// | destination | mode | condition | action |
/// |---|---|---|---|
/// | absent | any | | `Create` |
/// | present | `Skip` | | `Skip` |
/// | present | `Overwrite` | | `Overwrite` |
/// | present | `IfNewer` | source mtime > destination mtime | `Overwrite` |
/// | present | `IfNewer` | otherwise | `Skip` |
/// | present | `Prompt` | prompter confirms | `Overwrite` |
/// | present | `Prompt` | declined, or no prompter | `Skip` |
///
/// Directories are `Create` when absent and `Skip` when present, whatever
/// the mode. When either timestamp is unknown, `IfNewer` overwrites.
///
/// The kind of the existing entry is not consulted; callers reject
/// mismatches with [`Target::conflict`] first.
pub fn resolve(
    entry: TreeEntry,
    target: Target<'_>,
    mode: UpdateMode,
    prompter: Option<&dyn ConflictPrompter>,
) -> Decision {
    let action = match (entry.kind, target.exists()) {
        (_, false) => Action::Create,
        (EntryKind::Directory, true) => Action::Skip,
        (EntryKind::File, true) => match mode {
            UpdateMode::Skip => Action::Skip,
            UpdateMode::Overwrite => Action::Overwrite,
            UpdateMode::IfNewer => {
                if is_source_newer(entry.modified, target.modified) {
                    Action::Overwrite
                } else {
                    Action::Skip
                }
            }
            UpdateMode::Prompt => match prompter {
                Some(p) if p.confirm(target.path) => Action::Overwrite,
                _ => Action::Skip,
            },
        },
    };
    Decision { entry, action }
}

/// Strict greater-than on modification times.
#[inline]
fn is_source_newer(source: Option<SystemTime>, destination: Option<SystemTime>) -> bool {
    match (source, destination) {
        (Some(src), Some(dst)) => src > dst,
        _ => true,
    }
}
