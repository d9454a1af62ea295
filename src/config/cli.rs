//! CLI argument parsing using clap

use crate::config::{DirPolicy, RunConfig, SyncPolicy};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

/// FilePulse - file creation benchmarking tool
#[derive(Parser, Debug)]
#[command(name = "filepulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Test directory; repeat for one directory per group of threads
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short = 't', long, default_value_t = 1)]
    pub threads: usize,

    /// Number of files per thread per iteration
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub num_files: usize,

    /// Size in bytes of each file
    #[arg(short = 's', long, default_value_t = 51200)]
    pub file_size: u64,

    /// Bytes per write() syscall
    #[arg(short = 'w', long, default_value_t = 16384)]
    pub io_buffer_size: usize,

    /// Total length of generated file names
    #[arg(short = 'p', long, default_value_t = 40)]
    pub name_len: usize,

    /// Number of random characters at the end of each file name
    #[arg(short = 'r', long, default_value_t = 16)]
    pub rand_len: usize,

    /// Sync mode: 0 none, 1 fsync-before-close, 2 = 1 + sync after loop,
    /// 3 post-loop fsync, 4 = 3 + sync, 5 reverse post-loop fsync,
    /// 6 = 5 + sync, 7 first-file fsync only
    #[arg(short = 'S', long = "sync-mode", default_value_t = 1)]
    pub sync_mode: u8,

    /// Number of subdirectories to rotate across (enables time-hash layout)
    #[arg(short = 'D', long, value_name = "N")]
    pub num_subdirs: Option<usize>,

    /// Files per subdirectory (switches the layout to round-robin)
    #[arg(short = 'N', long, value_name = "N")]
    pub files_per_subdir: Option<usize>,

    /// Seconds between time-hash subdirectory rotations
    #[arg(long, default_value_t = 180)]
    pub secs_per_subdir: u64,

    /// Keep files after each iteration
    #[arg(short = 'k', long)]
    pub keep_files: bool,

    /// Repeat iterations until the filesystem is full (implies --keep-files)
    #[arg(short = 'F', long)]
    pub fill_fs: bool,

    /// Number of iterations (implies --keep-files)
    #[arg(short = 'L', long, value_name = "N")]
    pub loops: Option<u32>,

    /// Log file receiving a copy of every report line
    #[arg(short = 'l', long, default_value = "filepulse.log")]
    pub log_file: PathBuf,

    /// Report per-phase min/avg/max latency columns
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Load the run configuration from a TOML file instead of flags
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build a normalized [`RunConfig`] from the parsed flags.
    pub fn to_config(&self) -> crate::Result<RunConfig> {
        let sync_policy = SyncPolicy::from_mode(self.sync_mode)
            .with_context(|| format!("sync mode {} is out of range (0..=7)", self.sync_mode))?;

        // A files-per-subdirectory count selects round-robin; a bare
        // subdirectory count selects time-hash rotation.
        let dir_policy = if self.files_per_subdir.is_some() {
            DirPolicy::RoundRobin
        } else if self.num_subdirs.is_some() {
            DirPolicy::TimeHash
        } else {
            DirPolicy::NoSubdirs
        };

        let mut config = RunConfig {
            threads: self.threads,
            dirs: self.dirs.clone(),
            num_files: self.num_files,
            file_size: self.file_size,
            io_buffer_size: self.io_buffer_size,
            name_len: self.name_len,
            rand_len: self.rand_len,
            dir_policy,
            num_subdirs: self.num_subdirs.unwrap_or(0),
            files_per_subdir: self.files_per_subdir.unwrap_or(0),
            secs_per_subdir: self.secs_per_subdir,
            sync_policy,
            // An iteration count or a fill run leaves the files in place;
            // unlinking them would defeat both.
            keep_files: self.keep_files || self.fill_fs || self.loops.is_some(),
            fill_fs: self.fill_fs,
            loop_count: self.loops.unwrap_or(1),
            log_file: self.log_file.clone(),
            verbose_stats: self.verbose,
        };
        config.normalize()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("filepulse").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_match_classic_tool() {
        let cli = parse(&["-d", "/tmp/a"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.num_files, 1000);
        assert_eq!(config.file_size, 51200);
        assert_eq!(config.io_buffer_size, 16384);
        assert_eq!(config.name_len, 40);
        assert_eq!(config.sync_policy, SyncPolicy::FsyncBeforeClose);
        assert_eq!(config.loop_count, 1);
        assert!(!config.keep_files);
    }

    #[test]
    fn test_files_per_subdir_selects_round_robin() {
        let cli = parse(&["-d", "/tmp/a", "-D", "4", "-N", "100"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.dir_policy, DirPolicy::RoundRobin);
        assert_eq!(config.num_subdirs, 4);
        assert_eq!(config.files_per_subdir, 100);
    }

    #[test]
    fn test_subdirs_alone_selects_time_hash() {
        let cli = parse(&["-d", "/tmp/a", "-D", "8"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.dir_policy, DirPolicy::TimeHash);
        assert_eq!(config.num_subdirs, 8);
    }

    #[test]
    fn test_loops_and_fill_imply_keep_files() {
        let config = parse(&["-d", "/tmp/a", "-L", "5"]).to_config().unwrap();
        assert!(config.keep_files);
        assert_eq!(config.loop_count, 5);

        let config = parse(&["-d", "/tmp/a", "-F"]).to_config().unwrap();
        assert!(config.keep_files);
        assert!(config.fill_fs);
    }

    #[test]
    fn test_sync_mode_out_of_range() {
        let cli = parse(&["-d", "/tmp/a", "-S", "8"]);
        assert!(cli.to_config().is_err());
    }

    #[test]
    fn test_multiple_dirs_expand() {
        let cli = parse(&["-d", "/tmp/a", "-d", "/tmp/b", "-t", "4"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.dirs.len(), 4);
    }
}
