//! Directory rotation and file name generation
//!
//! Each worker owns one [`NameGenerator`]; rotation state is never shared
//! between threads, so two workers pointed at the same test directory rotate
//! independently (and race only on the tolerated mkdir of a shared
//! subdirectory).
//!
//! File names mix a sequential prefix with a random suffix. The prefix is the
//! lowercase-hex wall-clock second, truncated to its least-significant digits
//! when too long and right-padded with `~` when too short, which lets a name
//! listing show roughly when each file landed. The suffix keeps names within
//! the same second distinct.

use crate::config::{DirPolicy, RunConfig};
use crate::error::BenchError;
use crate::util::fs::ensure_dir;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Where one file goes: its directory (or directories) and name.
///
/// `write_dir` is the directory the file is created in; `target_dir` is where
/// post-write passes and the unlink pass look for it. Current layouts keep
/// them identical.
#[derive(Debug, Clone, Default)]
pub struct NameEntry {
    pub target_dir: PathBuf,
    pub write_dir: PathBuf,
    pub name: String,
}

/// Mutable layout state: which subdirectory receives files right now.
#[derive(Debug, Clone)]
pub struct RotationState {
    /// Index of the subdirectory currently receiving files
    pub current_subdir: usize,
    /// Files placed into the current subdirectory since the last rotation
    pub files_in_subdir: usize,
    /// Wall-clock second of the last time-hash rotation
    pub last_rotation_sec: u64,
}

/// Per-worker file path generator.
pub struct NameGenerator {
    policy: DirPolicy,
    num_subdirs: usize,
    files_per_subdir: usize,
    secs_per_subdir: u64,
    name_len: usize,
    rand_len: usize,
    rotation: RotationState,
}

impl NameGenerator {
    /// Build a generator for one worker.
    ///
    /// The starting subdirectory is derived from `start_sec` so short runs do
    /// not always hammer the first few subdirectories.
    pub fn new(config: &RunConfig, start_sec: u64) -> Self {
        let current_subdir = if config.num_subdirs > 0 {
            (start_sec % config.num_subdirs as u64) as usize
        } else {
            0
        };
        Self {
            policy: config.dir_policy,
            num_subdirs: config.num_subdirs,
            files_per_subdir: config.files_per_subdir,
            secs_per_subdir: config.secs_per_subdir,
            name_len: config.name_len,
            rand_len: config.rand_len,
            rotation: RotationState {
                current_subdir,
                files_in_subdir: 0,
                last_rotation_sec: start_sec,
            },
        }
    }

    /// Produce the next file path under `base_dir`, creating the target
    /// directory if needed ("already exists" is success).
    pub fn next_entry<R: Rng>(
        &mut self,
        base_dir: &Path,
        rng: &mut R,
        now_sec: u64,
    ) -> Result<NameEntry, BenchError> {
        let target_dir = match self.pick_subdir(now_sec) {
            None => base_dir.to_path_buf(),
            Some(index) => base_dir.join(format!("{:02x}", index)),
        };
        ensure_dir(&target_dir)?;

        let name = compose_name(now_sec, self.name_len, self.rand_len, rng);
        Ok(NameEntry {
            write_dir: target_dir.clone(),
            target_dir,
            name,
        })
    }

    /// Advance rotation state and return the subdirectory index for the next
    /// file, or `None` for a flat layout.
    fn pick_subdir(&mut self, now_sec: u64) -> Option<usize> {
        match self.policy {
            DirPolicy::NoSubdirs => None,
            DirPolicy::RoundRobin => {
                if self.files_per_subdir > 0 {
                    if self.rotation.files_in_subdir >= self.files_per_subdir {
                        self.rotation.current_subdir += 1;
                        self.rotation.files_in_subdir = 0;
                    }
                    self.rotation.current_subdir %= self.num_subdirs;
                    self.rotation.files_in_subdir += 1;
                }
                Some(self.rotation.current_subdir)
            }
            DirPolicy::TimeHash => {
                // Strictly more than the configured window must elapse
                if now_sec.saturating_sub(self.rotation.last_rotation_sec) > self.secs_per_subdir {
                    self.rotation.current_subdir =
                        (self.rotation.current_subdir + 1) % self.num_subdirs;
                    self.rotation.last_rotation_sec = now_sec;
                }
                Some(self.rotation.current_subdir)
            }
        }
    }
}

/// Compose one file name of exactly `name_len` characters:
/// `name_len - rand_len` sequential characters from the hex wall-clock
/// second, then `rand_len` random characters from {A-Z, 0-9}.
pub fn compose_name<R: Rng>(now_sec: u64, name_len: usize, rand_len: usize, rng: &mut R) -> String {
    let seq_len = name_len.saturating_sub(rand_len);
    let seq = format!("{:x}", now_sec);

    let mut name = String::with_capacity(name_len);
    if seq.len() > seq_len {
        // The most significant digits barely change; keep the least
        name.push_str(&seq[seq.len() - seq_len..]);
    } else {
        name.push_str(&seq);
        for _ in 0..seq_len - seq.len() {
            name.push('~');
        }
    }
    for _ in 0..rand_len {
        name.push(random_name_char(rng));
    }
    name
}

/// Draw one random name character by rejection sampling: offset a random
/// 7-bit value from `'0'` and retry until it lands on an uppercase letter or
/// a digit.
fn random_name_char<R: Rng>(rng: &mut R) -> char {
    loop {
        let candidate = b'0' + (rng.gen::<u32>() & 0x7f) as u8;
        if candidate.is_ascii_uppercase() || candidate.is_ascii_digit() {
            return candidate as char;
        }
    }
}
