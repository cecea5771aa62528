//! Builder API for configuring and running a copy.
//!
//! The builder is a fluent front end over [`CopyOptions`] and
//! [`copy_directory`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! let result = CopyBuilder::new("src", "dst").run()?;
//! println!("Copied {} files", result.total_files);
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## Incremental Backup
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! let result = CopyBuilder::new("~/project", "/backup/project")
//!     .if_newer()
//!     .exclude("node_modules")
//!     .exclude("target")
//!     .throttle(8)
//!     .run()?;
//!
//! println!(
//!     "{} updated, {} up to date, {} pruned",
//!     result.files_overwritten, result.files_skipped, result.excluded_directories
//! );
//! # Ok::<(), treecopy::Error>(())
//! ```

use crate::copy::{copy_directory, copy_file};
use crate::error::Result;
use crate::options::{CaseSensitivity, CopyOptions, UpdateMode};
use crate::resolve::ConflictPrompter;
use crate::stats::CopyResult;
use crate::utils::path::expand_home;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A builder for configuring and executing a copy.
///
/// Source and destination paths have a leading `~` expanded when the
/// builder is created.
///
/// # Example
///
/// ```no_run
/// use treecopy::CopyBuilder;
///
/// let preview = CopyBuilder::new("/data/project", "/backup/project")
///     .overwrite()
///     .dry_run()
///     .run()?;
/// println!("would write {} files", preview.total_files);
/// # Ok::<(), treecopy::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: CopyOptions,
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` with default options (sequential, skip
    /// existing, preserve timestamps).
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: expand_home(src.as_ref()),
            dst: expand_home(dst.as_ref()),
            options: CopyOptions::default(),
        }
    }

    /// Maximum number of concurrent workers. 1 (the default) copies
    /// sequentially.
    #[must_use]
    pub fn throttle(mut self, workers: usize) -> Self {
        self.options = self.options.with_throttle(workers);
        self
    }

    /// Leave existing destination files alone (default behavior).
    #[must_use]
    pub fn skip_existing(mut self) -> Self {
        self.options = self.options.with_update_mode(UpdateMode::Skip);
        self
    }

    /// Replace existing destination files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use treecopy::CopyBuilder;
    ///
    /// let result = CopyBuilder::new("src", "dst").overwrite().run()?;
    /// println!("replaced {} files", result.files_overwritten);
    /// # Ok::<(), treecopy::Error>(())
    /// ```
    #[must_use]
    pub fn overwrite(mut self) -> Self {
        self.options = self.options.with_update_mode(UpdateMode::Overwrite);
        self
    }

    /// Replace existing destination files only when the source is strictly
    /// newer.
    #[must_use]
    pub fn if_newer(mut self) -> Self {
        self.options = self.options.with_update_mode(UpdateMode::IfNewer);
        self
    }

    /// Ask `prompter` about every existing destination file.
    #[must_use]
    pub fn prompt(mut self, prompter: Arc<dyn ConflictPrompter>) -> Self {
        self.options = self
            .options
            .with_update_mode(UpdateMode::Prompt)
            .with_prompter(prompter);
        self
    }

    /// Prune directories whose name matches `pattern`. May be repeated.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.options = self.options.with_exclude(pattern);
        self
    }

    /// Only copy entries directly under the source root.
    #[must_use]
    pub fn no_recurse(mut self) -> Self {
        self.options = self.options.without_recursion();
        self
    }

    /// Compute the result without writing anything.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.options = self.options.with_dry_run();
        self
    }

    /// Do not carry source timestamps over to written files.
    #[must_use]
    pub fn refresh_timestamps(mut self) -> Self {
        self.options = self.options.without_timestamps();
        self
    }

    /// Sync every written file to disk before it is renamed into place.
    #[must_use]
    pub fn fsync(mut self) -> Self {
        self.options = self.options.with_fsync();
        self
    }

    /// Force case-sensitive (`true`) or case-insensitive (`false`)
    /// exclusion matching instead of the platform default.
    #[must_use]
    pub fn case_sensitive(mut self, sensitive: bool) -> Self {
        let case = if sensitive {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        };
        self.options = self.options.with_case_sensitivity(case);
        self
    }

    /// Set a warning handler.
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Set a per-entry progress handler.
    #[must_use]
    pub fn verbose(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_verbose_handler(handler);
        self
    }

    /// Get a reference to the current options.
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Copy the source tree into the destination.
    ///
    /// # Errors
    ///
    /// See [`copy_directory`].
    pub fn run(self) -> Result<CopyResult> {
        copy_directory(&self.src, &self.dst, &self.options)
    }

    /// Copy a single source file to the destination path.
    ///
    /// Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// See [`copy_file`].
    pub fn run_file(self) -> Result<bool> {
        copy_file(&self.src, &self.dst, &self.options)
    }
}
