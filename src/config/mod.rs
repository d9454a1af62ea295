//! Run configuration
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! The measurement core consumes an immutable [`RunConfig`]; everything in
//! this module runs before the first worker thread starts.

pub mod cli;
pub mod policy;
pub mod toml;
pub mod validator;

use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use policy::{DirPolicy, PostFsyncOrder, SyncPolicy};

/// Complete run configuration, immutable once built.
///
/// `dirs` holds one entry per worker thread; threads sharing a test directory
/// simply repeat the same path. [`RunConfig::normalize`] performs that
/// expansion from the user-supplied directory list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Test directory per thread (pre-normalize: the user-supplied list)
    pub dirs: Vec<PathBuf>,
    /// Files created per thread per iteration
    #[serde(default = "default_num_files")]
    pub num_files: usize,
    /// Size in bytes of each file
    #[serde(default = "default_file_size")]
    pub file_size: u64,
    /// Bytes per write() syscall
    #[serde(default = "default_io_buffer_size")]
    pub io_buffer_size: usize,
    /// Total length of generated file names
    #[serde(default = "default_name_len")]
    pub name_len: usize,
    /// Number of random characters at the end of each file name
    #[serde(default = "default_rand_len")]
    pub rand_len: usize,
    /// Subdirectory layout policy
    #[serde(default)]
    pub dir_policy: DirPolicy,
    /// Number of subdirectories to rotate across
    #[serde(default)]
    pub num_subdirs: usize,
    /// Files per subdirectory before a round-robin rotation
    #[serde(default)]
    pub files_per_subdir: usize,
    /// Seconds between time-hash rotations
    #[serde(default = "default_secs_per_subdir")]
    pub secs_per_subdir: u64,
    /// Durability mode
    #[serde(default)]
    pub sync_policy: SyncPolicy,
    /// Keep files after each iteration instead of unlinking them
    #[serde(default)]
    pub keep_files: bool,
    /// Repeat iterations until the filesystem is full
    #[serde(default)]
    pub fill_fs: bool,
    /// Number of iterations to run (ignored while `fill_fs` keeps looping)
    #[serde(default = "default_loop_count")]
    pub loop_count: u32,
    /// Log file receiving a copy of every report line
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Report per-phase min/avg/max latency columns
    #[serde(default)]
    pub verbose_stats: bool,
}

fn default_threads() -> usize {
    1
}

fn default_num_files() -> usize {
    1000
}

fn default_file_size() -> u64 {
    51200
}

fn default_io_buffer_size() -> usize {
    16384
}

fn default_name_len() -> usize {
    40
}

fn default_rand_len() -> usize {
    16
}

fn default_secs_per_subdir() -> u64 {
    180
}

fn default_loop_count() -> u32 {
    1
}

fn default_log_file() -> PathBuf {
    PathBuf::from("filepulse.log")
}

impl RunConfig {
    /// Expand the directory list to one entry per thread.
    ///
    /// A thread count of zero means one thread per CPU. When fewer threads
    /// than directories are requested the thread count is raised to match;
    /// when more are requested they must divide evenly so each directory
    /// receives the same number of threads.
    pub fn normalize(&mut self) -> crate::Result<()> {
        ensure!(
            !self.dirs.is_empty(),
            "at least one test directory is required"
        );

        if self.threads == 0 {
            self.threads = num_cpus::get();
        }
        let num_dirs = self.dirs.len();
        if self.threads < num_dirs {
            self.threads = num_dirs;
        }
        ensure!(
            self.threads % num_dirs == 0,
            "thread count ({}) must be an even multiple of the directory count ({})",
            self.threads,
            num_dirs
        );

        // Interleave so directory k serves threads k, k + num_dirs, ...
        self.dirs = (0..self.threads)
            .map(|i| self.dirs[i % num_dirs].clone())
            .collect();
        Ok(())
    }

    /// Bytes one iteration of one thread will write.
    pub fn bytes_per_iteration(&self) -> u64 {
        self.file_size.saturating_mul(self.num_files as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(dirs: &[&str], threads: usize) -> RunConfig {
        RunConfig {
            threads,
            dirs: dirs.iter().map(PathBuf::from).collect(),
            num_files: 10,
            file_size: 0,
            io_buffer_size: 4096,
            name_len: 16,
            rand_len: 8,
            dir_policy: DirPolicy::NoSubdirs,
            num_subdirs: 0,
            files_per_subdir: 0,
            secs_per_subdir: 180,
            sync_policy: SyncPolicy::NoSync,
            keep_files: false,
            fill_fs: false,
            loop_count: 1,
            log_file: PathBuf::from("test.log"),
            verbose_stats: false,
        }
    }

    #[test]
    fn test_normalize_expands_dirs_per_thread() {
        let mut config = base_config(&["/a", "/b"], 4);
        config.normalize().unwrap();
        assert_eq!(config.threads, 4);
        let expanded: Vec<_> = config.dirs.iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(expanded, ["/a", "/b", "/a", "/b"]);
    }

    #[test]
    fn test_normalize_raises_threads_to_dir_count() {
        let mut config = base_config(&["/a", "/b", "/c"], 1);
        config.normalize().unwrap();
        assert_eq!(config.threads, 3);
        assert_eq!(config.dirs.len(), 3);
    }

    #[test]
    fn test_normalize_rejects_uneven_split() {
        let mut config = base_config(&["/a", "/b"], 3);
        assert!(config.normalize().is_err());
    }

    #[test]
    fn test_normalize_rejects_empty_dirs() {
        let mut config = base_config(&[], 1);
        assert!(config.normalize().is_err());
    }

    #[test]
    fn test_bytes_per_iteration_saturates() {
        let mut config = base_config(&["/a"], 1);
        config.file_size = u64::MAX;
        config.num_files = 2;
        assert_eq!(config.bytes_per_iteration(), u64::MAX);
    }
}
