//! Error taxonomy for the measurement core
//!
//! Two conditions can abort a run: the filesystem cannot hold the files the
//! next iteration would create, or a syscall fails outright. Neither is
//! recoverable at the point of detection; phase code propagates the value and
//! only the top-level driver converts it into process termination.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal conditions surfaced by the measurement core.
///
/// `OutOfSpace` is the expected terminator for fill runs and is matched by
/// the iteration loop; every other condition ends the run with a nonzero
/// exit status.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Not enough free space on the target filesystem for one iteration.
    #[error("insufficient free space in {dir}: {needed_bytes} bytes needed, {free_bytes} available")]
    OutOfSpace {
        dir: PathBuf,
        needed_bytes: u64,
        free_bytes: u64,
    },

    /// A file or filesystem operation failed. "Directory already exists" is
    /// never reported through this variant; it is treated as success.
    #[error("{op} failed on {path}: {source}")]
    Syscall {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BenchError {
    /// Capture the current OS error for a failed operation on `path`.
    pub fn last_os_error(op: &'static str, path: &Path) -> Self {
        BenchError::Syscall {
            op,
            path: path.to_path_buf(),
            source: io::Error::last_os_error(),
        }
    }

    pub fn syscall(op: &'static str, path: &Path, source: io::Error) -> Self {
        BenchError::Syscall {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}
