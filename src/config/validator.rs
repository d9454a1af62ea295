//! Configuration validation
//!
//! Every rule here guards an assumption the measurement core relies on, so
//! validation runs after normalization regardless of whether the config came
//! from flags or a TOML file.

use crate::config::{DirPolicy, RunConfig};
use anyhow::{bail, Result};

/// Validate a normalized [`RunConfig`].
pub fn validate(config: &RunConfig) -> Result<()> {
    if config.threads == 0 {
        bail!("at least one worker thread is required");
    }
    if config.dirs.len() != config.threads {
        bail!(
            "configuration must carry one directory per thread ({} directories, {} threads)",
            config.dirs.len(),
            config.threads
        );
    }
    if config.num_files == 0 {
        bail!("files per iteration must be at least 1");
    }
    if config.io_buffer_size == 0 {
        bail!("write buffer size must be at least 1 byte");
    }
    if config.name_len == 0 {
        bail!("file name length must be at least 1");
    }
    if config.rand_len > config.name_len {
        bail!(
            "random suffix ({} chars) cannot exceed the file name length ({})",
            config.rand_len,
            config.name_len
        );
    }
    // Names differing only in their wall-clock-second prefix repeat within a
    // second; the random suffix is what keeps names in one iteration unique.
    if config.rand_len == 0 && config.num_files > 1 {
        bail!("at least one random file name character is required when creating more than one file per iteration");
    }

    match config.dir_policy {
        DirPolicy::NoSubdirs => {}
        DirPolicy::RoundRobin => {
            if config.num_subdirs < 2 {
                bail!("round-robin layout needs at least 2 subdirectories");
            }
            if config.files_per_subdir == 0 {
                bail!("round-robin layout needs a files-per-subdirectory count");
            }
        }
        DirPolicy::TimeHash => {
            if config.num_subdirs < 2 {
                bail!("time-hash layout needs at least 2 subdirectories");
            }
            if config.secs_per_subdir == 0 {
                bail!("time-hash layout needs a nonzero seconds-per-subdirectory");
            }
        }
    }

    if !config.fill_fs && config.loop_count == 0 {
        bail!("iteration count must be at least 1 unless running until the filesystem is full");
    }

    Ok(())
}
