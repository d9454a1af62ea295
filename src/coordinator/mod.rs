//! Scheduling and the iteration loop
//!
//! One iteration forks exactly one OS thread per worker task and joins them
//! all before anything else happens: aggregation only ever sees records from
//! fully finished workers. There is no per-thread timeout and no cancellation
//! of siblings; a failing worker's error is picked up after the join barrier
//! and propagated, and only the binary's top level turns it into process
//! termination.

use crate::config::RunConfig;
use crate::error::BenchError;
use crate::output::text;
use crate::output::ReportSink;
use crate::stats::aggregator::aggregate;
use crate::stats::ThreadStats;
use crate::util::fs as fsutil;
use crate::worker::{self, WorkerTask};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run one iteration across all worker tasks with a join-all barrier.
pub fn run_iteration_across_threads(
    tasks: &mut [WorkerTask],
    config: &RunConfig,
    stop: &AtomicBool,
) -> Result<Vec<ThreadStats>, BenchError> {
    let results: Vec<Result<ThreadStats, BenchError>> = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = tasks
            .iter_mut()
            .map(|task| scope.spawn(move |_| worker::run_iteration(task, config, stop)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker thread panicked"))
            .collect()
    })
    .expect("worker scope panicked");

    // All workers have finished; now surface the first failure, if any.
    let mut stats = Vec::with_capacity(results.len());
    for result in results {
        stats.push(result?);
    }
    Ok(stats)
}

/// The main loop: repeats iterations until the termination condition holds.
pub struct Runner {
    config: RunConfig,
    tasks: Vec<WorkerTask>,
    stop: Arc<AtomicBool>,
    cumulative_files: u64,
    iterations_done: u32,
}

impl Runner {
    /// Create one worker task per configured thread.
    pub fn new(config: RunConfig) -> Result<Self, BenchError> {
        let tasks = config
            .dirs
            .iter()
            .enumerate()
            .map(|(id, dir)| WorkerTask::new(id, dir.clone(), &config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            config,
            tasks,
            stop: Arc::new(AtomicBool::new(false)),
            cumulative_files: 0,
            iterations_done: 0,
        })
    }

    /// Files created since the run started.
    pub fn cumulative_files(&self) -> u64 {
        self.cumulative_files
    }

    pub fn iterations_done(&self) -> u32 {
        self.iterations_done
    }

    /// Repeat iterations, reporting each, until the loop count is reached or
    /// a fill run exhausts the filesystem.
    pub fn run(&mut self, sink: &mut ReportSink) -> crate::Result<()> {
        loop {
            match run_iteration_across_threads(&mut self.tasks, &self.config, &self.stop) {
                Ok(per_thread) => {
                    let iteration = aggregate(&per_thread);
                    self.cumulative_files += iteration.file_count;
                    self.iterations_done += 1;

                    let fs_use = fsutil::fs_use_percent(&self.config.dirs[0])?;
                    sink.emit(&text::iteration_line(
                        fs_use,
                        self.cumulative_files,
                        self.config.file_size,
                        &iteration,
                        self.config.verbose_stats,
                    ))?;
                }
                // The expected end of a fill run: a worker found too little
                // space for the next iteration and latched the stop signal.
                Err(BenchError::OutOfSpace { dir, .. }) if self.config.fill_fs => {
                    sink.emit(&format!(
                        "Insufficient free space in {} to create {} new files, exiting",
                        dir.display(),
                        self.config.num_files
                    ))?;
                    break;
                }
                Err(err) => return Err(err.into()),
            }

            let fill_active = self.config.fill_fs && !self.stop.load(Ordering::Relaxed);
            if !(fill_active || self.config.loop_count > self.iterations_done) {
                break;
            }
        }
        Ok(())
    }
}
