//! Filesystem queries and directory helpers
//!
//! Free-space and usage figures come from `statvfs` on the test directory, so
//! they describe the filesystem actually receiving the files even when test
//! directories live on different mounts.

use crate::error::BenchError;
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

fn query(path: &Path) -> Result<libc::statvfs, BenchError> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        BenchError::syscall(
            "statvfs",
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"),
        )
    })?;

    // SAFETY: c_path is NUL-terminated and buf points to a properly sized,
    // writable statvfs that the call fills in.
    let mut buf: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut buf) };
    if rc != 0 {
        return Err(BenchError::last_os_error("statvfs", path));
    }
    Ok(buf)
}

/// Bytes available to unprivileged writers on the filesystem backing `path`.
pub fn bytes_free(path: &Path) -> Result<u64, BenchError> {
    let st = query(path)?;
    Ok(st.f_bavail as u64 * st.f_frsize as u64)
}

/// Percentage of the filesystem in use, truncated to an integer the way `df`
/// reports it.
pub fn fs_use_percent(path: &Path) -> Result<u32, BenchError> {
    let st = query(path)?;
    if st.f_blocks == 0 {
        return Ok(0);
    }
    let used = (st.f_blocks - st.f_bavail) as f64;
    Ok((100.0 * used / st.f_blocks as f64) as u32)
}

/// Flush all filesystem buffers.
pub fn sync_filesystem() {
    // SAFETY: sync() takes no arguments and has no failure mode.
    unsafe { libc::sync() };
}

/// Create `path` as a directory, treating "already exists" as success.
///
/// Workers race to create shared subdirectories; whichever thread loses the
/// race must carry on as if it had won.
pub fn ensure_dir(path: &Path) -> Result<(), BenchError> {
    match std::fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(BenchError::syscall("mkdir", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_free_nonzero_on_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let free = bytes_free(dir.path()).unwrap();
        assert!(free > 0);
    }

    #[test]
    fn test_fs_use_percent_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let pct = fs_use_percent(dir.path()).unwrap();
        assert!(pct <= 100);
    }

    #[test]
    fn test_query_missing_path_fails() {
        let err = bytes_free(Path::new("/no/such/filepulse/path")).unwrap_err();
        match err {
            BenchError::Syscall { op, .. } => assert_eq!(op, "statvfs"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ensure_dir_tolerates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("aa");
        ensure_dir(&sub).unwrap();
        ensure_dir(&sub).unwrap();
        assert!(sub.is_dir());
    }

    #[test]
    fn test_ensure_dir_missing_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("missing").join("leaf");
        assert!(ensure_dir(&nested).is_err());
    }
}
