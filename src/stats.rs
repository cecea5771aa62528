//! Run statistics.
//!
//! [`RunStatistics`] is the only state shared between workers. Every counter
//! is an atomic, so increments from different threads never need a lock and
//! their order is irrelevant to the final [`CopyResult`].

use crate::copy::CopyOutcome;
use crate::resolve::{Action, Decision};
use crate::walk::EntryKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Summary of a finished copy run.
///
/// Returned by [`copy_directory`](crate::copy_directory).
///
/// # Example
///
/// ```no_run
/// use treecopy::{copy_directory, CopyOptions};
/// use std::path::Path;
///
/// let result = copy_directory(Path::new("src"), Path::new("dst"), &CopyOptions::default())?;
/// println!("{} files written, {} skipped", result.total_files, result.files_skipped);
/// if result.errors > 0 {
///     eprintln!("{} entries failed", result.errors);
/// }
/// # Ok::<(), treecopy::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyResult {
    /// Files written, new or overwritten
    pub total_files: u64,
    /// Directories created
    pub total_directories: u64,
    /// Files left alone because of the update mode
    pub files_skipped: u64,
    /// Files that replaced an existing destination file (subset of `total_files`)
    pub files_overwritten: u64,
    /// Directory subtrees pruned by exclusion patterns
    pub excluded_directories: u64,
    /// Entries that failed
    pub errors: u64,
    /// Bytes written (informational)
    pub bytes_copied: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl CopyResult {
    /// Whether every entry succeeded.
    pub fn is_complete(&self) -> bool {
        self.errors == 0
    }
}

/// Concurrency-safe counters for one run.
#[derive(Debug, Default)]
pub struct RunStatistics {
    total_files: AtomicU64,
    total_directories: AtomicU64,
    files_skipped: AtomicU64,
    files_overwritten: AtomicU64,
    excluded_directories: AtomicU64,
    errors: AtomicU64,
    bytes_copied: AtomicU64,
}

impl RunStatistics {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a decision that was executed (or would have been).
    pub fn record(&self, decision: &Decision, outcome: &CopyOutcome) {
        let kind = decision.entry.kind;
        match outcome {
            CopyOutcome::Failed(_) => self.record_error(),
            CopyOutcome::Skipped => self.record_not_written(decision),
            CopyOutcome::Copied { bytes } => match (kind, decision.action) {
                (EntryKind::Directory, _) => bump(&self.total_directories),
                (EntryKind::File, action) => {
                    bump(&self.total_files);
                    if action == Action::Overwrite {
                        bump(&self.files_overwritten);
                    }
                    self.bytes_copied.fetch_add(*bytes, Ordering::Relaxed);
                }
            },
        }
    }

    /// Account for a decision that never reaches a sink.
    pub fn record_not_written(&self, decision: &Decision) {
        match (decision.action, decision.entry.kind) {
            (Action::ExcludeDirectory, _) => bump(&self.excluded_directories),
            (_, EntryKind::File) => bump(&self.files_skipped),
            // Directories that already exist are neither created nor skipped.
            (_, EntryKind::Directory) => {}
        }
    }

    /// Account for an entry that failed before a decision was made.
    pub fn record_error(&self) {
        bump(&self.errors);
    }

    /// Freeze the counters into a [`CopyResult`].
    pub fn finish(&self, duration: Duration) -> CopyResult {
        CopyResult {
            total_files: self.total_files.load(Ordering::Relaxed),
            total_directories: self.total_directories.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_overwritten: self.files_overwritten.load(Ordering::Relaxed),
            excluded_directories: self.excluded_directories.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            duration,
        }
    }
}

#[inline]
fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}
