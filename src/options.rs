//! Configuration options for copy runs.
//!
//! This module provides [`CopyOptions`] for configuring a run,
//! [`UpdateMode`] for handling destination conflicts and
//! [`CaseSensitivity`] for exclusion matching.
//!
//! # Example
//!
//! ```
//! use treecopy::{CopyOptions, UpdateMode};
//!
//! let options = CopyOptions::default()
//!     .with_throttle(8)
//!     .with_update_mode(UpdateMode::IfNewer)
//!     .with_exclude("node_modules")
//!     .with_exclude(".git");
//! ```

use crate::error::{Error, Result};
use crate::resolve::ConflictPrompter;
use std::sync::Arc;

/// Policy for destination files that already exist.
///
/// The default is [`UpdateMode::Skip`], which makes interrupted runs
/// resumable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateMode {
    /// Never touch existing destination files (default).
    #[default]
    Skip,
    /// Always replace existing destination files.
    Overwrite,
    /// Replace only when the source mtime is strictly greater than the
    /// destination mtime. Equal timestamps skip.
    IfNewer,
    /// Ask the configured [`ConflictPrompter`] for every conflict.
    ///
    /// Without a prompter every conflict is skipped.
    Prompt,
}

/// How exclusion patterns compare against entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseSensitivity {
    /// Insensitive on Windows and macOS, sensitive elsewhere (default).
    #[default]
    Platform,
    /// Always compare case-sensitively.
    Sensitive,
    /// Always compare case-insensitively.
    Insensitive,
}

impl CaseSensitivity {
    /// Whether names should be folded before comparison.
    pub fn is_insensitive(self) -> bool {
        match self {
            Self::Platform => cfg!(any(windows, target_os = "macos")),
            Self::Sensitive => false,
            Self::Insensitive => true,
        }
    }
}

/// Options for a copy run.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the `with_*` methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `throttle` | 1 | Concurrent copy workers (1 = sequential) |
/// | `update_mode` | `Skip` | Leave existing files alone |
/// | `exclude` | empty | Directory-name patterns to prune |
/// | `recurse` | `true` | Descend into subdirectories |
/// | `dry_run` | `false` | Compute statistics without writing |
/// | `preserve_timestamps` | `true` | Copy mtime/atime onto written files |
/// | `fsync` | `false` | Sync file data before the final rename |
/// | `case_sensitivity` | `Platform` | Exclusion matching rule |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct CopyOptions {
    /// Maximum number of concurrent copy workers (default: 1)
    pub throttle: usize,

    /// Behavior when a destination file already exists
    pub update_mode: UpdateMode,

    /// Directory-name patterns (exact names or `*`/`?` globs) to prune
    pub exclude: Vec<String>,

    /// Whether to descend into subdirectories (default: true)
    ///
    /// When false only the entries directly under the source root are
    /// considered; subdirectories are created empty.
    pub recurse: bool,

    /// Preview mode: decide everything, write nothing (default: false)
    pub dry_run: bool,

    /// Whether to copy source timestamps onto written files (default: true)
    ///
    /// When false, written files keep the time they were written at.
    pub preserve_timestamps: bool,

    /// Whether to sync file data to disk before renaming into place
    /// (default: false)
    pub fsync: bool,

    /// How exclusion patterns treat letter case
    pub case_sensitivity: CaseSensitivity,

    /// Decision capability for [`UpdateMode::Prompt`]
    #[cfg_attr(feature = "serde", serde(skip))]
    pub prompter: Option<Arc<dyn ConflictPrompter>>,

    /// Callback for warnings (optional)
    ///
    /// If not set and the `tracing` feature is enabled, warnings are logged
    /// via tracing. Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,

    /// Callback for per-entry progress messages (optional)
    ///
    /// Falls back to `tracing::debug!` like `warn_handler` does.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub verbose_handler: Option<fn(&str)>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            throttle: 1,
            update_mode: UpdateMode::Skip,
            exclude: Vec::new(),
            recurse: true,
            dry_run: false,
            preserve_timestamps: true,
            fsync: false,
            case_sensitivity: CaseSensitivity::Platform,
            prompter: None,
            warn_handler: None,
            verbose_handler: None,
        }
    }
}

impl CopyOptions {
    /// Set the maximum number of concurrent workers
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_throttle(mut self, n: usize) -> Self {
        self.throttle = n.max(1);
        self
    }

    /// Set the conflict policy
    #[must_use]
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Add a directory-name exclusion pattern
    #[must_use]
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Only consider entries directly under the source root
    #[must_use]
    pub fn without_recursion(mut self) -> Self {
        self.recurse = false;
        self
    }

    /// Compute statistics without touching the destination
    #[must_use]
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Let written files carry the time they were written instead of the
    /// source timestamps
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }

    /// Sync each written file before renaming it into place
    #[must_use]
    pub fn with_fsync(mut self) -> Self {
        self.fsync = true;
        self
    }

    /// Override exclusion case handling
    #[must_use]
    pub fn with_case_sensitivity(mut self, case: CaseSensitivity) -> Self {
        self.case_sensitivity = case;
        self
    }

    /// Provide the decision capability used by [`UpdateMode::Prompt`]
    #[must_use]
    pub fn with_prompter(mut self, prompter: Arc<dyn ConflictPrompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Create options with a progress message handler
    #[must_use]
    pub fn with_verbose_handler(mut self, handler: fn(&str)) -> Self {
        self.verbose_handler = Some(handler);
        self
    }

    /// Reject configurations that cannot run.
    ///
    /// Called by the engine before the source tree is touched. Glob syntax
    /// is checked when the exclusion set is compiled.
    pub fn validate(&self) -> Result<()> {
        if self.throttle == 0 {
            return Err(Error::InvalidConfiguration(
                "throttle must be at least 1".to_owned(),
            ));
        }
        for pattern in &self.exclude {
            if pattern.trim().is_empty() {
                return Err(Error::InvalidConfiguration(
                    "exclusion patterns must not be empty".to_owned(),
                ));
            }
            if pattern.contains('/') || pattern.contains(std::path::MAIN_SEPARATOR) {
                return Err(Error::InvalidConfiguration(format!(
                    "exclusion pattern '{pattern}' must be a single name, not a path"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    pub(crate) fn verbose(&self, msg: &str) {
        if let Some(handler) = self.verbose_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("{}", msg);
        }
    }
}
