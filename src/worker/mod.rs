//! Worker engine
//!
//! One worker drives the full file lifecycle for one thread:
//! create, write in chunks, optional fsync, close, an optional post-write
//! fsync pass, and finally unlink, with every syscall timed individually.
//! A worker owns everything it touches during an iteration (buffers, the
//! name table, its RNG, its rotation state), so the only cross-thread state
//! is the fill-run stop latch it may set.
//!
//! # Lifecycle
//!
//! 1. **Creation**: [`WorkerTask::new`] allocates the write buffer and the
//!    name table once; both persist across iterations.
//! 2. **Execution**: [`run_iteration`] performs one measured iteration.
//! 3. **Completion**: returns a [`ThreadStats`] record for aggregation.

pub mod fileops;

use crate::config::{PostFsyncOrder, RunConfig};
use crate::error::BenchError;
use crate::naming::{compose_name, NameEntry, NameGenerator};
use crate::stats::{PhaseStats, ThreadStats};
use crate::util::fs as fsutil;
use crate::util::time::{monotonic_nanos, wall_clock_secs, Stopwatch};
use fileops::RawFd;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-thread state that persists across iterations.
pub struct WorkerTask {
    pub id: usize,
    dir: PathBuf,
    io_buffer: Vec<u8>,
    names: Vec<NameEntry>,
    namer: NameGenerator,
    rng: Xoshiro256PlusPlus,
}

impl WorkerTask {
    /// Set up one worker: create its test directory, allocate its write
    /// buffer and name table, and seed its RNG from its own start time.
    pub fn new(id: usize, dir: PathBuf, config: &RunConfig) -> Result<Self, BenchError> {
        fsutil::ensure_dir(&dir)?;
        Ok(Self {
            id,
            dir,
            io_buffer: vec![0u8; config.io_buffer_size],
            names: vec![NameEntry::default(); config.num_files],
            namer: NameGenerator::new(config, wall_clock_secs()),
            rng: Xoshiro256PlusPlus::seed_from_u64(monotonic_nanos()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entries generated by the most recent iteration.
    pub fn names(&self) -> &[NameEntry] {
        &self.names
    }
}

/// Refuse to start an iteration the filesystem cannot hold.
fn check_space(task: &WorkerTask, config: &RunConfig, stop: &AtomicBool) -> Result<(), BenchError> {
    let needed = config.bytes_per_iteration();
    let free = fsutil::bytes_free(&task.dir)?;
    if free < needed {
        // The iteration loop consumes this between barriers; during a fill
        // run it is the expected end of the benchmark.
        stop.store(true, Ordering::Relaxed);
        return Err(BenchError::OutOfSpace {
            dir: task.dir.clone(),
            needed_bytes: needed,
            free_bytes: free,
        });
    }
    Ok(())
}

/// Write `file_size` bytes in chunks of at most the buffer size, one timed
/// sample per chunk. Returns this file's mean chunk latency; the true sum of
/// chunk latencies accumulates in `write_stats`.
///
/// A zero-byte file still issues exactly one zero-length write, so every
/// file contributes at least one chunk sample.
fn write_file(
    fd: RawFd,
    path: &Path,
    file_size: u64,
    buffer: &[u8],
    write_stats: &mut PhaseStats,
) -> Result<u64, BenchError> {
    let mut remaining = file_size;
    let mut file_total_usec = 0u64;
    let mut chunks = 0u64;

    loop {
        let chunk = (buffer.len() as u64).min(remaining) as usize;

        let sw = Stopwatch::start();
        fileops::write_fd(fd, &buffer[..chunk], path)?;
        let delta = sw.elapsed_usec();

        write_stats.record(delta);
        file_total_usec += delta;
        chunks += 1;

        remaining -= chunk as u64;
        if remaining == 0 {
            break;
        }
    }

    Ok(file_total_usec / chunks)
}

/// Reopen written files read-only and fsync them in the order the policy
/// demands. Open, fsync, and close count as one combined fsync sample.
fn post_fsync_pass(
    names: &[NameEntry],
    order: PostFsyncOrder,
    fsync_stats: &mut PhaseStats,
) -> Result<(), BenchError> {
    let indices: Vec<usize> = match order {
        PostFsyncOrder::Forward => (0..names.len()).collect(),
        PostFsyncOrder::Reverse => (0..names.len()).rev().collect(),
        PostFsyncOrder::FirstOnly => (0..names.len().min(1)).collect(),
    };

    for i in indices {
        let path = names[i].target_dir.join(&names[i].name);
        let sw = Stopwatch::start();
        let fd = fileops::open_readonly(&path)?;
        fileops::fsync_fd(fd, &path)?;
        fileops::close_fd(fd, &path)?;
        fsync_stats.record(sw.elapsed_usec());
    }
    Ok(())
}

/// Run one measured iteration for one thread.
///
/// Phase sequencing: for each file, create then write then (policy) fsync
/// then close; after the loop a policy-driven global sync and post-write
/// fsync pass; the unlink pass runs outside the timed loop window.
pub fn run_iteration(
    task: &mut WorkerTask,
    config: &RunConfig,
    stop: &AtomicBool,
) -> Result<ThreadStats, BenchError> {
    check_space(task, config, stop)?;

    let mut stats = ThreadStats::new();
    // Running sum of per-file average chunk latencies; the reported write
    // average is the mean of these, not the mean of all chunks.
    let mut per_file_avg_sum = 0u64;

    let loop_sw = Stopwatch::start();

    for i in 0..config.num_files {
        let mut entry = task
            .namer
            .next_entry(&task.dir, &mut task.rng, wall_clock_secs())?;
        // Names must be unique within this thread's iteration; redraw the
        // random suffix if the same directory already holds this name.
        while task.names[..i]
            .iter()
            .any(|n| n.name == entry.name && n.target_dir == entry.target_dir)
        {
            entry.name = compose_name(
                wall_clock_secs(),
                config.name_len,
                config.rand_len,
                &mut task.rng,
            );
        }
        task.names[i] = entry;

        let write_path = task.names[i].write_dir.join(&task.names[i].name);

        let sw = Stopwatch::start();
        let fd = fileops::create(&write_path)?;
        stats.create.record(sw.elapsed_usec());

        per_file_avg_sum += write_file(
            fd,
            &write_path,
            config.file_size,
            &task.io_buffer,
            &mut stats.write,
        )?;

        if config.sync_policy.fsync_before_close() {
            let sw = Stopwatch::start();
            fileops::fsync_fd(fd, &write_path)?;
            stats.fsync.record(sw.elapsed_usec());
        }

        let sw = Stopwatch::start();
        fileops::close_fd(fd, &write_path)?;
        stats.close.record(sw.elapsed_usec());
    }

    if config.sync_policy.global_sync() {
        let sw = Stopwatch::start();
        fsutil::sync_filesystem();
        stats.sync.record(sw.elapsed_usec());
    }

    if let Some(order) = config.sync_policy.post_pass() {
        post_fsync_pass(&task.names, order, &mut stats.fsync)?;
    }

    // Loop time covers creation through the sync passes; the unlink pass
    // below is deliberately outside it.
    let loop_usec = loop_sw.elapsed_usec().max(1);

    if !config.keep_files {
        for entry in &task.names {
            let path = entry.target_dir.join(&entry.name);
            let sw = Stopwatch::start();
            fileops::unlink(&path)?;
            stats.unlink.record(sw.elapsed_usec());
        }
    }

    let num_files = config.num_files as u64;
    stats.file_count = num_files;
    stats.files_per_sec = config.num_files as f64 / (loop_usec as f64 / 1_000_000.0);

    let syscall_usec = stats.create.total_usec
        + stats.write.total_usec
        + stats.fsync.total_usec
        + stats.sync.total_usec
        + stats.close.total_usec;
    stats.app_overhead_usec = loop_usec.saturating_sub(syscall_usec);

    stats.create.avg_usec = stats.create.total_usec / num_files;
    stats.write.avg_usec = per_file_avg_sum / num_files;
    stats.fsync.avg_usec = stats.fsync.total_usec / num_files;
    stats.sync.avg_usec = stats.sync.total_usec;
    stats.close.avg_usec = stats.close.total_usec / num_files;
    stats.unlink.avg_usec = stats.unlink.total_usec / num_files;

    Ok(stats)
}
