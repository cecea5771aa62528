//! Lazy source-tree traversal.
//!
//! [`TreeWalker`] is a depth-first iterator over the source root. It holds
//! one open `ReadDir` per directory level, so memory grows with depth rather
//! than with the number of entries.

use crate::error::EntryError;
use crate::matcher::ExclusionSet;
use std::fs::{self, Metadata, ReadDir};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Whether an entry is copied as bytes or created as a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    /// Regular file, or a symlink resolving to one
    File,
    /// Directory, or a symlink resolving to one
    Directory,
}

/// One entry of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the source root
    pub relative: PathBuf,
    /// Entry kind
    pub kind: EntryKind,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last-modified time, if the platform reports one
    pub modified: Option<SystemTime>,
}

impl TreeEntry {
    fn from_metadata(relative: PathBuf, meta: &Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Self {
            relative,
            kind,
            size: if meta.is_dir() { 0 } else { meta.len() },
            modified: meta.modified().ok(),
        }
    }

    /// Whether this entry is a file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// An item produced by [`TreeWalker`].
#[derive(Debug)]
pub enum WalkItem {
    /// A file or directory to consider
    Entry(TreeEntry),
    /// A directory pruned by the exclusion set; nothing beneath it follows
    Excluded(TreeEntry),
    /// A special file (socket, device, fifo) that is never copied
    Unsupported(PathBuf),
    /// An entry that could not be read; the walk continues with siblings
    Failed(EntryError),
}

struct Frame {
    entries: ReadDir,
    relative: PathBuf,
    key: DirKey,
}

/// Depth-first iterator over a source tree.
///
/// # Example
///
/// ```no_run
/// use treecopy::{ExclusionSet, TreeWalker, WalkItem};
/// use std::path::Path;
///
/// let exclusions = ExclusionSet::empty();
/// for item in TreeWalker::new(Path::new("src"), &exclusions, true)? {
///     if let WalkItem::Entry(entry) = item {
///         println!("{}", entry.relative.display());
///     }
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct TreeWalker<'a> {
    root: PathBuf,
    exclusions: &'a ExclusionSet,
    recurse: bool,
    stack: Vec<Frame>,
    pending: Option<WalkItem>,
    skipped: Option<DirKey>,
}

impl<'a> TreeWalker<'a> {
    /// Open `root` for walking.
    ///
    /// # Errors
    ///
    /// Fails when the root itself cannot be read. Failures below the root
    /// are reported as [`WalkItem::Failed`] instead.
    pub fn new(root: &Path, exclusions: &'a ExclusionSet, recurse: bool) -> io::Result<Self> {
        let meta = fs::metadata(root)?;
        let frame = Frame {
            entries: fs::read_dir(root)?,
            relative: PathBuf::new(),
            key: dir_key(root, &meta),
        };
        Ok(Self {
            root: root.to_path_buf(),
            exclusions,
            recurse,
            stack: vec![frame],
            pending: None,
            skipped: None,
        })
    }

    /// Leave the directory at `path` out of the walk, wherever it shows up
    /// below the root. Directories are matched by identity, so a link to it
    /// is left out as well.
    ///
    /// Returns `false` when `path` is not an existing directory, in which
    /// case nothing changes.
    pub fn skip_directory(&mut self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                self.skipped = Some(dir_key(path, &meta));
                true
            }
            _ => false,
        }
    }

    fn visit(&mut self, entry: fs::DirEntry, relative: PathBuf) -> Option<WalkItem> {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => return Some(WalkItem::Failed(EntryError::new(&path, e))),
        };

        // Symlinks pass through to whatever they point at.
        let meta = if file_type.is_symlink() {
            fs::metadata(&path)
        } else {
            entry.metadata()
        };
        let meta = match meta {
            Ok(m) => m,
            Err(e) => return Some(WalkItem::Failed(EntryError::new(&path, e))),
        };

        if meta.is_file() {
            return Some(WalkItem::Entry(TreeEntry::from_metadata(relative, &meta)));
        }
        if !meta.is_dir() {
            return Some(WalkItem::Unsupported(path));
        }

        let key = dir_key(&path, &meta);
        if self.skipped == Some(key) {
            return None;
        }

        let tree_entry = TreeEntry::from_metadata(relative, &meta);
        if self.exclusions.matches(&entry.file_name()) {
            return Some(WalkItem::Excluded(tree_entry));
        }

        if self.recurse {
            if self.stack.iter().any(|frame| frame.key == key) {
                return Some(WalkItem::Failed(EntryError::new(
                    &path,
                    io::Error::other("symlink loop detected"),
                )));
            }
            match fs::read_dir(&path) {
                Ok(entries) => self.stack.push(Frame {
                    entries,
                    relative: tree_entry.relative.clone(),
                    key,
                }),
                // The directory itself is still created at the destination.
                Err(e) => self.pending = Some(WalkItem::Failed(EntryError::new(&path, e))),
            }
        }

        Some(WalkItem::Entry(tree_entry))
    }

    /// The root this walker was opened on.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }
        loop {
            let frame = self.stack.last_mut()?;
            let Some(next) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };
            match next {
                Ok(entry) => {
                    let relative = frame.relative.join(entry.file_name());
                    if let Some(item) = self.visit(entry, relative) {
                        return Some(item);
                    }
                }
                Err(e) => {
                    let dir = self.root.join(&frame.relative);
                    return Some(WalkItem::Failed(EntryError::new(dir, e)));
                }
            }
        }
    }
}

type DirKey = (u64, u64);

/// Identity of a directory, used to detect symlink cycles.
///
/// On Unix this is `(dev, ino)`. Elsewhere it falls back to a hash of the
/// canonical path.
#[cfg(unix)]
fn dir_key(_path: &Path, meta: &Metadata) -> DirKey {
    use std::os::unix::fs::MetadataExt;
    (meta.dev(), meta.ino())
}

#[cfg(not(unix))]
fn dir_key(path: &Path, _meta: &Metadata) -> DirKey {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    (0, hasher.finish())
}
