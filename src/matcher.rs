//! Directory-name exclusion matching.

use crate::error::{Error, Result};
use crate::options::CaseSensitivity;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;

/// Compiled set of directory-name exclusion patterns.
///
/// A name is excluded when it equals one of the patterns literally or
/// matches one of them as a shell glob (`*`, `?`, `[...]`). Leading and
/// trailing whitespace of a pattern is ignored. Patterns are
/// compiled once and are read-only afterwards, so a single set is shared by
/// every worker.
///
/// # Example
///
/// ```
/// use std::ffi::OsStr;
/// use treecopy::{CaseSensitivity, ExclusionSet};
///
/// let set = ExclusionSet::new(["node_modules", "*.cache"], CaseSensitivity::Sensitive)?;
/// assert!(set.matches(OsStr::new("node_modules")));
/// assert!(set.matches(OsStr::new("build.cache")));
/// assert!(!set.matches(OsStr::new("src")));
/// # Ok::<(), treecopy::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<String>,
    literals: Vec<String>,
    globs: GlobSet,
    fold_case: bool,
}

impl ExclusionSet {
    /// Compile `patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when a pattern is not valid glob
    /// syntax.
    pub fn new<I, S>(patterns: I, case: CaseSensitivity) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fold_case = case.is_insensitive();
        let mut builder = GlobSetBuilder::new();
        let mut originals = Vec::new();
        let mut literals = Vec::new();

        for pattern in patterns {
            // Surrounding whitespace is a typo, not part of a name.
            let pattern = pattern.as_ref().trim();
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(fold_case)
                .literal_separator(true)
                .build()
                .map_err(|source| Error::InvalidPattern {
                    pattern: pattern.to_owned(),
                    source,
                })?;
            builder.add(glob);
            literals.push(fold(pattern, fold_case));
            originals.push(pattern.to_owned());
        }

        let globs = builder.build().map_err(|source| Error::InvalidPattern {
            pattern: originals.join(", "),
            source,
        })?;

        Ok(Self {
            patterns: originals,
            literals,
            globs,
            fold_case,
        })
    }

    /// A set that excludes nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            literals: Vec::new(),
            globs: GlobSet::empty(),
            fold_case: false,
        }
    }

    /// Whether no patterns were given.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The patterns in the order they were given.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a single path component matches any pattern.
    pub fn matches(&self, name: &OsStr) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let lossy = name.to_string_lossy();
        let candidate = fold(&lossy, self.fold_case);
        self.literals.iter().any(|literal| *literal == candidate) || self.globs.is_match(name)
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::empty()
    }
}

fn fold(name: &str, fold_case: bool) -> String {
    if fold_case {
        name.to_lowercase()
    } else {
        name.to_owned()
    }
}
