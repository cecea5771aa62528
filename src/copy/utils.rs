//! Filesystem helpers shared by the executor.

use crate::utils::path::safe_path;
use filetime::{FileTime, set_file_times};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

/// Create `dir` and any missing ancestors.
///
/// Succeeds when the directory already exists, including when another
/// worker created it a moment earlier. Fails when something other than a
/// directory is in the way.
pub(crate) fn ensure_dir(dir: &Path) -> io::Result<()> {
    let safe = safe_path(dir);
    match fs::create_dir_all(&safe) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && safe.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Refuse to replace a directory with a file.
///
/// Returns the existing entry's metadata when there is one.
pub(crate) fn check_replaceable(dst: &Path) -> io::Result<Option<Metadata>> {
    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.is_dir() => Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            "destination is a directory",
        )),
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Copy mtime and atime from the source onto `dst`.
pub(crate) fn preserve_timestamps(src_meta: &Metadata, dst: &Path) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(src_meta);
    let atime = FileTime::from_last_access_time(src_meta);
    set_file_times(dst, atime, mtime)
}

/// Copy the full contents of `src` into `dst`.
///
/// On Linux this goes through `copy_file_range(2)` so the bytes stay in the
/// kernel, falling back to a userspace copy when the filesystem pair does
/// not support it.
pub(crate) fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    if let Some(copied) = copy_in_kernel(src, dst, len)? {
        return Ok(copied);
    }
    #[cfg(not(target_os = "linux"))]
    let _ = len;

    io::copy(&mut io::BufReader::new(src), &mut &*dst)
}

/// `Ok(None)` means the kernel path is unavailable and nothing was written.
#[cfg(target_os = "linux")]
fn copy_in_kernel(src: &File, dst: &File, len: u64) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: u64 = 64 * 1024 * 1024;
    let mut copied: u64 = 0;

    while copied < len {
        let chunk = (len - copied).min(CHUNK) as usize;
        // SAFETY: both descriptors are open for the duration of the call and
        // null offsets make the kernel use and advance the file positions.
        let n = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            let unsupported = matches!(
                err.raw_os_error(),
                Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
            );
            if copied == 0 && unsupported {
                return Ok(None);
            }
            return Err(err);
        }
        if n == 0 {
            // Source shrank while copying.
            break;
        }
        copied += n as u64;
    }

    Ok(Some(copied))
}
