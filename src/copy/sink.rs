//! Where resolved decisions go.
//!
//! The engine hands every writing [`Decision`] to exactly one [`Sink`],
//! chosen once per run. [`FsSink`] touches the filesystem; [`DryRunSink`]
//! reports what would have happened.

use crate::error::EntryError;
use crate::options::CopyOptions;
use crate::resolve::{Action, Decision};
use crate::walk::EntryKind;
use std::path::Path;

use super::file::write_file;
use super::utils::ensure_dir;

/// Result of executing one decision.
#[derive(Debug)]
pub enum CopyOutcome {
    /// Written (or would have been); `bytes` is zero for directories
    Copied { bytes: u64 },
    /// Lost a race: the destination appeared after the decision was made
    Skipped,
    /// The entry failed
    Failed(EntryError),
}

/// Executes resolved decisions.
///
/// Called concurrently from pool workers, so implementations must be
/// [`Sync`]. Only [`Action::Create`] and [`Action::Overwrite`] decisions
/// are ever passed in.
pub trait Sink: Send + Sync {
    /// Execute `decision` for the entry at `source`, writing to `destination`.
    fn execute(&self, decision: &Decision, source: &Path, destination: &Path) -> CopyOutcome;
}

/// Writes to the destination filesystem.
#[derive(Debug, Clone, Copy)]
pub struct FsSink {
    pub(crate) preserve_timestamps: bool,
    pub(crate) fsync: bool,
}

impl FsSink {
    /// Sink configured from the timestamp and fsync settings of `options`.
    pub fn from_options(options: &CopyOptions) -> Self {
        Self {
            preserve_timestamps: options.preserve_timestamps,
            fsync: options.fsync,
        }
    }
}

impl Default for FsSink {
    fn default() -> Self {
        Self::from_options(&CopyOptions::default())
    }
}

impl Sink for FsSink {
    fn execute(&self, decision: &Decision, source: &Path, destination: &Path) -> CopyOutcome {
        match decision.entry.kind {
            EntryKind::Directory => match ensure_dir(destination) {
                Ok(()) => CopyOutcome::Copied { bytes: 0 },
                Err(e) => CopyOutcome::Failed(EntryError::new(destination, e)),
            },
            EntryKind::File => write_file(
                source,
                destination,
                decision.action == Action::Overwrite,
                self,
            ),
        }
    }
}

/// Touches nothing and reports every decision as done.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

impl Sink for DryRunSink {
    fn execute(&self, decision: &Decision, _source: &Path, _destination: &Path) -> CopyOutcome {
        let bytes = match decision.entry.kind {
            EntryKind::File => decision.entry.size,
            EntryKind::Directory => 0,
        };
        CopyOutcome::Copied { bytes }
    }
}
