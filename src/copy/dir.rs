//! Directory tree copies.
//!
//! A run is a pipeline: the [`TreeWalker`] yields entries, the calling side
//! probes the destination and resolves each entry into a [`Decision`], and
//! writing decisions are handed to a [`Sink`] on the worker pool. Everything
//! up to the decision happens on one thread at a time, so the set of
//! decisions (and with it every counter) does not depend on the throttle.

use crate::error::{EntryError, Error, Result};
use crate::matcher::ExclusionSet;
use crate::options::CopyOptions;
use crate::resolve::{Action, Decision, Target, resolve};
use crate::stats::{CopyResult, RunStatistics};
use crate::walk::{EntryKind, TreeEntry, TreeWalker, WalkItem};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use super::sink::{CopyOutcome, DryRunSink, FsSink, Sink};
use super::utils::ensure_dir;

/// Copy the tree under `src` into `dst`.
///
/// Every file and directory below `src` is considered once. Existing
/// destination files are handled according to
/// [`options.update_mode`](CopyOptions::update_mode), directories whose name
/// matches an exclusion pattern are pruned with their whole subtree, and up
/// to [`options.throttle`](CopyOptions::throttle) entries are written
/// concurrently.
///
/// Failures of individual entries do not stop the run. They are counted in
/// [`CopyResult::errors`] and reported through the warn handler.
///
/// # Errors
///
/// Only failures that prevent the run from starting are returned:
/// - Invalid options ([`Error::InvalidConfiguration`], [`Error::InvalidPattern`])
/// - Source does not exist ([`Error::SourceNotFound`])
/// - Source is not a directory ([`Error::NotADirectory`])
/// - Destination root cannot be created ([`Error::Destination`])
/// - Source root cannot be read ([`Error::Io`])
///
/// # Example
///
/// ```no_run
/// use treecopy::{copy_directory, CopyOptions, UpdateMode};
/// use std::path::Path;
///
/// let options = CopyOptions::default()
///     .with_update_mode(UpdateMode::IfNewer)
///     .with_exclude("node_modules")
///     .with_throttle(8);
///
/// let result = copy_directory(Path::new("project"), Path::new("backup"), &options)?;
/// println!(
///     "{} files, {} directories in {:?}",
///     result.total_files, result.total_directories, result.duration
/// );
/// # Ok::<(), treecopy::Error>(())
/// ```
pub fn copy_directory(src: &Path, dst: &Path, options: &CopyOptions) -> Result<CopyResult> {
    let start_time = Instant::now();

    options.validate()?;
    let exclusions = ExclusionSet::new(&options.exclude, options.case_sensitivity)?;

    match fs::metadata(src) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(Error::NotADirectory(src.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(src.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    }

    let mut walker = TreeWalker::new(src, &exclusions, options.recurse)?;

    // The root is a precondition of the run, not one of its entries.
    if !options.dry_run {
        ensure_dir(dst).map_err(|source| Error::Destination {
            path: dst.to_path_buf(),
            source,
        })?;
    }
    // A destination inside the source is not part of the input tree.
    walker.skip_directory(dst);

    let stats = RunStatistics::new();

    let fs_sink;
    let sink: &dyn Sink = if options.dry_run {
        &DryRunSink
    } else {
        fs_sink = FsSink::from_options(options);
        &fs_sink
    };

    let decisions = walker.filter_map(|item| plan(item, src, dst, options, &stats));
    let dispatch = |decision: Decision| execute(&decision, sink, src, dst, options, &stats);

    if options.throttle <= 1 {
        decisions.for_each(dispatch);
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.throttle)
            .build();
        match pool {
            Ok(pool) => pool.install(|| decisions.par_bridge().for_each(dispatch)),
            Err(e) => {
                options.warn(&format!(
                    "Failed to create thread pool ({e}), using global pool"
                ));
                decisions.par_bridge().for_each(dispatch);
            }
        }
    }

    let result = stats.finish(start_time.elapsed());
    options.verbose(&format!(
        "finished: {} files, {} directories, {} skipped, {} errors",
        result.total_files, result.total_directories, result.files_skipped, result.errors
    ));
    Ok(result)
}

/// Turn a walk item into a writing decision, accounting for everything else.
fn plan(
    item: WalkItem,
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    stats: &RunStatistics,
) -> Option<Decision> {
    let entry = match item {
        WalkItem::Entry(entry) => entry,
        WalkItem::Excluded(entry) => {
            options.verbose(&format!("excluded {}", src.join(&entry.relative).display()));
            stats.record_not_written(&Decision::exclude(entry));
            return None;
        }
        WalkItem::Unsupported(path) => {
            options.warn(&format!("Skipping special file: {}", path.display()));
            return None;
        }
        WalkItem::Failed(e) => {
            options.warn(&format!("Failed to read {e}"));
            stats.record_error();
            return None;
        }
    };

    let target_path = dst.join(&entry.relative);
    let target = match probe(&entry, &target_path) {
        Ok(target) => target,
        Err(e) => {
            options.warn(&format!("Failed to inspect {e}"));
            stats.record_error();
            return None;
        }
    };
    if let Some(e) = target.conflict(entry.kind) {
        options.warn(&format!(
            "Failed to copy {}: {e}",
            src.join(&entry.relative).display()
        ));
        stats.record_error();
        return None;
    }

    let decision = resolve(
        entry,
        target,
        options.update_mode,
        options.prompter.as_deref(),
    );
    if decision.writes() {
        Some(decision)
    } else {
        if decision.entry.is_file() {
            options.verbose(&format!(
                "skipped {} (already exists)",
                target_path.display()
            ));
        }
        stats.record_not_written(&decision);
        None
    }
}

/// Look at what currently occupies the destination of `entry`.
///
/// Directory entries follow a link at the destination, so a link to a
/// directory counts as a directory. File entries look at the link itself,
/// which a file write replaces.
fn probe<'a>(
    entry: &TreeEntry,
    path: &'a Path,
) -> std::result::Result<Target<'a>, EntryError> {
    let meta = match entry.kind {
        EntryKind::Directory => fs::metadata(path),
        EntryKind::File => fs::symlink_metadata(path),
    };
    match meta {
        Ok(meta) => Ok(Target::existing(path, &meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Target::absent(path)),
        Err(e) => Err(EntryError::new(path, e)),
    }
}

fn execute(
    decision: &Decision,
    sink: &dyn Sink,
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    stats: &RunStatistics,
) {
    let source = src.join(&decision.entry.relative);
    let destination = dst.join(&decision.entry.relative);
    let outcome = sink.execute(decision, &source, &destination);

    match &outcome {
        CopyOutcome::Copied { bytes } => match (decision.entry.kind, decision.action) {
            (EntryKind::Directory, _) => {
                options.verbose(&format!("created {}", destination.display()));
            }
            (EntryKind::File, Action::Overwrite) => options.verbose(&format!(
                "overwrote {} -> {} ({bytes} bytes)",
                source.display(),
                destination.display()
            )),
            (EntryKind::File, _) => options.verbose(&format!(
                "copied {} -> {} ({bytes} bytes)",
                source.display(),
                destination.display()
            )),
        },
        CopyOutcome::Skipped => options.verbose(&format!(
            "skipped {} (appeared during copy)",
            destination.display()
        )),
        CopyOutcome::Failed(e) => {
            options.warn(&format!("Failed to copy {}: {e}", source.display()));
        }
    }

    stats.record(decision, &outcome);
}
