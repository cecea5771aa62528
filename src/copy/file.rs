//! Single file writes.
//!
//! Bytes are written to a temporary file next to the destination and then
//! renamed into place, so the destination name never holds a partial file.

use crate::error::{EntryError, Error, Result};
use crate::options::CopyOptions;
use crate::resolve::{Action, Target, resolve};
use crate::utils::path::safe_path;
use crate::walk::TreeEntry;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use super::sink::{CopyOutcome, DryRunSink, FsSink, Sink};
use super::utils::{check_replaceable, copy_file_contents, ensure_dir, preserve_timestamps};

/// Write `src` to `dst`.
///
/// With `replace == false` the final rename refuses to clobber, and a
/// destination that appeared since the decision was made yields
/// [`CopyOutcome::Skipped`].
pub(crate) fn write_file(src: &Path, dst: &Path, replace: bool, sink: &FsSink) -> CopyOutcome {
    match write_file_inner(src, dst, replace, sink) {
        Ok(outcome) => outcome,
        Err(e) => CopyOutcome::Failed(e),
    }
}

fn write_file_inner(
    src: &Path,
    dst: &Path,
    replace: bool,
    sink: &FsSink,
) -> std::result::Result<CopyOutcome, EntryError> {
    let at_src = |e: io::Error| EntryError::new(src, e);
    let at_dst = |e: io::Error| EntryError::new(dst, e);

    let src_file = File::open(src).map_err(at_src)?;
    let src_meta = src_file.metadata().map_err(at_src)?;

    let parent = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    ensure_dir(parent).map_err(at_dst)?;

    if replace {
        check_replaceable(dst).map_err(at_dst)?;
    }

    let temp_file = new_temp_file(&safe_path(parent)).map_err(at_dst)?;
    let bytes = copy_file_contents(&src_file, temp_file.as_file(), src_meta.len())
        .map_err(at_dst)?;

    if sink.fsync {
        temp_file.as_file().sync_all().map_err(at_dst)?;
    }

    let safe_dst = safe_path(dst);
    if replace {
        temp_file
            .persist(&safe_dst)
            .map_err(|e| EntryError::new(dst, e.error))?;
    } else if let Err(e) = temp_file.persist_noclobber(&safe_dst) {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            return Ok(CopyOutcome::Skipped);
        }
        return Err(EntryError::new(dst, e.error));
    }

    if sink.preserve_timestamps {
        // The bytes are in place; a timestamp failure is not worth failing
        // the entry over.
        let _ = preserve_timestamps(&src_meta, dst);
    }

    Ok(CopyOutcome::Copied { bytes })
}

/// Temp file that ends up with ordinary umask-derived permissions.
fn new_temp_file(dir: &Path) -> io::Result<tempfile::NamedTempFile> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tempfile::Builder::new()
            .prefix(".treecopy")
            .permissions(fs::Permissions::from_mode(0o666))
            .tempfile_in(dir)
    }
    #[cfg(not(unix))]
    {
        tempfile::Builder::new().prefix(".treecopy").tempfile_in(dir)
    }
}

/// Copy a single file under the same rules as [`copy_directory`](crate::copy_directory).
///
/// The update mode, prompter, dry-run flag and timestamp settings of
/// `options` apply. Exclusions and throttle do not.
///
/// # Returns
///
/// `Ok(true)` if the file was written (or would be, in a dry run),
/// `Ok(false)` if it was skipped.
///
/// # Errors
///
/// - Source does not exist ([`Error::SourceNotFound`])
/// - Source is a directory ([`Error::IsADirectory`])
/// - The copy itself failed ([`Error::Entry`])
///
/// # Example
///
/// ```no_run
/// use treecopy::{copy_file, CopyOptions, UpdateMode};
/// use std::path::Path;
///
/// let options = CopyOptions::default().with_update_mode(UpdateMode::IfNewer);
/// if copy_file(Path::new("notes.txt"), Path::new("backup/notes.txt"), &options)? {
///     println!("updated");
/// }
/// # Ok::<(), treecopy::Error>(())
/// ```
#[must_use = "returns false if the file was skipped, check the result"]
pub fn copy_file(src: &Path, dst: &Path, options: &CopyOptions) -> Result<bool> {
    let src_meta = match fs::metadata(src) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(src.to_path_buf()));
        }
        Err(e) => return Err(EntryError::new(src, e).into()),
    };
    if src_meta.is_dir() {
        return Err(Error::IsADirectory(src.to_path_buf()));
    }

    let entry = TreeEntry {
        relative: dst.file_name().map(Into::into).unwrap_or_default(),
        kind: crate::walk::EntryKind::File,
        size: src_meta.len(),
        modified: src_meta.modified().ok(),
    };
    let target = match fs::symlink_metadata(dst) {
        Ok(meta) => Target::existing(dst, &meta),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Target::absent(dst),
        Err(e) => return Err(EntryError::new(dst, e).into()),
    };
    if let Some(e) = target.conflict(entry.kind) {
        return Err(e.into());
    }

    let decision = resolve(entry, target, options.update_mode, options.prompter.as_deref());
    if decision.action == Action::Skip {
        return Ok(false);
    }

    let outcome = if options.dry_run {
        DryRunSink.execute(&decision, src, dst)
    } else {
        FsSink::from_options(options).execute(&decision, src, dst)
    };
    match outcome {
        CopyOutcome::Copied { .. } => Ok(true),
        CopyOutcome::Skipped => Ok(false),
        CopyOutcome::Failed(e) => Err(e.into()),
    }
}
