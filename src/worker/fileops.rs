//! Raw file operations
//!
//! Thin wrappers over the libc calls the benchmark measures. Each wrapper
//! does exactly one syscall so a stopwatch around it times that call and
//! nothing else; failures carry the operation name, the path, and the OS
//! error for the terminal diagnostic.

use crate::error::BenchError;
use std::ffi::CString;
use std::io;
use std::path::Path;

pub type RawFd = libc::c_int;

fn c_path(op: &'static str, path: &Path) -> Result<CString, BenchError> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        BenchError::syscall(
            op,
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"),
        )
    })
}

/// Open with create/truncate/read-write semantics, mode 0666.
pub fn create(path: &Path) -> Result<RawFd, BenchError> {
    let c = c_path("create", path)?;
    // SAFETY: c is a valid NUL-terminated path for the duration of the call.
    let fd = unsafe {
        libc::open(
            c.as_ptr(),
            libc::O_CREAT | libc::O_RDWR | libc::O_TRUNC,
            0o666,
        )
    };
    if fd < 0 {
        return Err(BenchError::last_os_error("create", path));
    }
    Ok(fd)
}

/// Reopen an existing file read-only (post-write fsync passes).
pub fn open_readonly(path: &Path) -> Result<RawFd, BenchError> {
    let c = c_path("open", path)?;
    // SAFETY: c is a valid NUL-terminated path for the duration of the call.
    let fd = unsafe { libc::open(c.as_ptr(), libc::O_RDONLY) };
    if fd < 0 {
        return Err(BenchError::last_os_error("open", path));
    }
    Ok(fd)
}

/// Write the whole buffer with one write() call; a short write is an error.
pub fn write_fd(fd: RawFd, buf: &[u8], path: &Path) -> Result<(), BenchError> {
    // SAFETY: buf is valid for buf.len() bytes for the duration of the call.
    let n = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
    if n < 0 {
        return Err(BenchError::last_os_error("write", path));
    }
    if n as usize != buf.len() {
        return Err(BenchError::syscall(
            "write",
            path,
            io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", n, buf.len()),
            ),
        ));
    }
    Ok(())
}

pub fn fsync_fd(fd: RawFd, path: &Path) -> Result<(), BenchError> {
    // SAFETY: fd is a file descriptor owned by the caller.
    if unsafe { libc::fsync(fd) } != 0 {
        return Err(BenchError::last_os_error("fsync", path));
    }
    Ok(())
}

pub fn close_fd(fd: RawFd, path: &Path) -> Result<(), BenchError> {
    // SAFETY: fd is a file descriptor owned by the caller and not used again.
    if unsafe { libc::close(fd) } != 0 {
        return Err(BenchError::last_os_error("close", path));
    }
    Ok(())
}

pub fn unlink(path: &Path) -> Result<(), BenchError> {
    let c = c_path("unlink", path)?;
    // SAFETY: c is a valid NUL-terminated path for the duration of the call.
    if unsafe { libc::unlink(c.as_ptr()) } != 0 {
        return Err(BenchError::last_os_error("unlink", path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_write_close_unlink_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycle");

        let fd = create(&path).unwrap();
        write_fd(fd, b"abcd", &path).unwrap();
        fsync_fd(fd, &path).unwrap();
        close_fd(fd, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"abcd");

        let fd = open_readonly(&path).unwrap();
        fsync_fd(fd, &path).unwrap();
        close_fd(fd, &path).unwrap();

        unlink(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_create_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trunc");
        std::fs::write(&path, b"previous contents").unwrap();

        let fd = create(&path).unwrap();
        close_fd(fd, &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        unlink(&path).unwrap();
    }

    #[test]
    fn test_zero_length_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        let fd = create(&path).unwrap();
        write_fd(fd, &[], &path).unwrap();
        close_fd(fd, &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_open_missing_file_reports_operation() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_readonly(&dir.path().join("missing")).unwrap_err();
        match err {
            BenchError::Syscall { op, .. } => assert_eq!(op, "open"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unlink_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(unlink(&dir.path().join("missing")).is_err());
    }
}
