//! # treecopy
//!
//! Parallel, deterministic directory-tree copying for Rust.
//!
//! ## Core Features
//!
//! - **Conflict policies**: skip, overwrite, overwrite-if-newer or ask, per
//!   existing destination file ([`UpdateMode`])
//! - **Directory exclusions**: prune subtrees by exact name or glob
//!   ([`ExclusionSet`])
//! - **Bounded parallelism**: up to `throttle` concurrent workers on a
//!   rayon pool; `throttle == 1` copies sequentially
//! - **Deterministic statistics**: the returned [`CopyResult`] does not
//!   depend on the worker count or on scheduling order
//! - **Dry run**: the same decisions and counters, with nothing written
//! - **Atomic writes**: temp file + rename, so a destination file is never
//!   left half written
//! - **Error isolation**: a failing entry is counted and logged, the rest
//!   of the tree is still copied
//!
//! ## Quick Start
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! let result = CopyBuilder::new("src", "dst").run()?;
//! println!(
//!     "Copied {} files and {} directories in {:?}",
//!     result.total_files, result.total_directories, result.duration
//! );
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use treecopy::{copy_directory, CopyOptions, UpdateMode};
//! use std::path::Path;
//!
//! let options = CopyOptions::default()
//!     .with_throttle(8)
//!     .with_update_mode(UpdateMode::Overwrite)
//!     .with_exclude(".git")
//!     .with_exclude("*.cache");
//!
//! let result = copy_directory(Path::new("src"), Path::new("dst"), &options)?;
//! println!("{} overwritten, {} errors", result.files_overwritten, result.errors);
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## How a run works
//!
//! 1. The [`TreeWalker`] enumerates the source lazily, pruning excluded
//!    directories.
//! 2. Each entry's destination is probed and [`resolve`]d into a
//!    [`Decision`]. This happens on one thread at a time, which also keeps
//!    interactive prompts from overlapping.
//! 3. Decisions that write are executed by a [`Sink`] on the worker pool:
//!    [`FsSink`] normally, [`DryRunSink`] in a dry run.
//! 4. Outcomes are folded into atomic [`RunStatistics`] and frozen into a
//!    [`CopyResult`].
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Log warnings and per-entry progress with the tracing crate |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] and [`CopyResult`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod matcher;
mod options;
mod resolve;
mod stats;
mod utils;
mod walk;

pub use builder::CopyBuilder;
pub use copy::{CopyOutcome, DryRunSink, FsSink, Sink, copy_directory, copy_file};
pub use error::{EntryError, EntryErrorKind, Error, ErrorCode, Result, is_no_space_error};
pub use matcher::ExclusionSet;
pub use options::{CaseSensitivity, CopyOptions, UpdateMode};
pub use resolve::{Action, ConflictPrompter, Decision, Target, resolve};
pub use stats::{CopyResult, RunStatistics};
pub use utils::path::expand_home;
pub use walk::{EntryKind, TreeEntry, TreeWalker, WalkItem};
