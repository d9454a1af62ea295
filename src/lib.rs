//! FilePulse - file creation benchmarking tool
//!
//! FilePulse measures file-creation throughput and per-syscall latency under
//! configurable concurrency, directory layout, and sync-durability policies.
//!
//! # Architecture
//!
//! - **Worker engine**: per-thread create/write/fsync/close/unlink driver with
//!   microsecond phase timing
//! - **Naming policies**: flat, round-robin, and time-hashed subdirectory
//!   rotation with mixed sequential/random file names
//! - **Sync policies**: eight mutually exclusive durability modes covering
//!   per-file fsync, post-loop fsync passes, and filesystem-wide sync
//! - **Statistics**: per-phase min/avg/max latency records aggregated across
//!   threads into one report line per iteration

pub mod config;
pub mod coordinator;
pub mod error;
pub mod naming;
pub mod output;
pub mod stats;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::RunConfig;
pub use error::BenchError;

/// Result type used throughout FilePulse
pub type Result<T> = anyhow::Result<T>;
