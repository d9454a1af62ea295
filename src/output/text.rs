//! Report formatting
//!
//! The run header describes the configuration once; after that each
//! iteration contributes exactly one line. Column widths are fixed so
//! successive lines align into a table that can be fed to awk or a plotting
//! script without further parsing.

use crate::config::{DirPolicy, RunConfig};
use crate::stats::aggregator::IterationStats;
use crate::stats::PhaseStats;

/// Multi-line run description printed before the first iteration.
pub fn run_header(config: &RunConfig) -> String {
    let mut header = String::new();

    header.push_str(&format!(
        "#\tfilepulse {}, {} thread(s) starting at {}\n",
        env!("CARGO_PKG_VERSION"),
        config.threads,
        chrono::Local::now().format("%a %b %e %T %Y"),
    ));
    header.push_str(&format!("#\tSync method: {}\n", config.sync_policy));

    if config.num_subdirs > 1 {
        let (amount, unit) = match config.dir_policy {
            DirPolicy::RoundRobin => (config.files_per_subdir as u64, "files per subdirectory"),
            _ => (config.secs_per_subdir, "seconds per subdirectory"),
        };
        header.push_str(&format!(
            "#\tDirectories: {} across {} subdirectories with {} {}.\n",
            config.dir_policy, config.num_subdirs, amount, unit
        ));
    } else {
        header.push_str("#\tDirectories: no subdirectories used\n");
    }

    header.push_str(&format!(
        "#\tFile names: {} bytes long, ({} initial bytes of time stamp with {} random bytes at end of name)\n",
        config.name_len,
        config.name_len - config.rand_len,
        config.rand_len
    ));
    header.push_str(&format!(
        "#\tFiles info: size {} bytes, written with an IO size of {} bytes per write\n",
        config.file_size, config.io_buffer_size
    ));
    header.push_str(
        "#\tApp overhead is time in microseconds spent in the test not doing file writing related system calls.\n",
    );
    header.push('\n');
    header.push_str(&column_headers(config.verbose_stats));
    header
}

/// Column header line matching [`iteration_line`].
pub fn column_headers(verbose: bool) -> String {
    let mut line = format!(
        "{:>6} {:>12} {:>12} {:>12} {:>16}",
        "FSUse%", "Count", "Size", "Files/sec", "App Overhead"
    );
    if verbose {
        for phase in [
            "CREAT (Min/Avg/Max)",
            "WRITE (Min/Avg/Max)",
            "FSYNC (Min/Avg/Max)",
            "SYNC (Min/Avg/Max)",
            "CLOSE (Min/Avg/Max)",
            "UNLINK (Min/Avg/Max)",
        ] {
            line.push_str(&format!(" {:>26}", phase));
        }
    }
    line
}

fn push_phase(line: &mut String, phase: &PhaseStats) {
    line.push_str(&format!(
        " {:>8} {:>8} {:>8}",
        phase.min_for_display(),
        phase.avg_usec,
        phase.max_usec
    ));
}

/// One iteration's report line, compact or verbose.
pub fn iteration_line(
    fs_use_percent: u32,
    cumulative_files: u64,
    file_size: u64,
    stats: &IterationStats,
    verbose: bool,
) -> String {
    let mut line = format!(
        "{:>6} {:>12} {:>12} {:>12.1} {:>16}",
        fs_use_percent, cumulative_files, file_size, stats.files_per_sec, stats.app_overhead_usec
    );
    if verbose {
        push_phase(&mut line, &stats.create);
        push_phase(&mut line, &stats.write);
        push_phase(&mut line, &stats.fsync);
        push_phase(&mut line, &stats.sync);
        push_phase(&mut line, &stats.close);
        push_phase(&mut line, &stats.unlink);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncPolicy;
    use std::path::PathBuf;

    fn sample_stats() -> IterationStats {
        let mut stats = IterationStats::default();
        stats.file_count = 100;
        stats.files_per_sec = 2412.7;
        stats.app_overhead_usec = 3456;
        stats.create.min_usec = 3;
        stats.create.avg_usec = 12;
        stats.create.max_usec = 97;
        stats
    }

    #[test]
    fn test_compact_line_has_five_fields() {
        let line = iteration_line(42, 1000, 51200, &sample_stats(), false);
        let fields: Vec<_> = line.split_whitespace().collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "42");
        assert_eq!(fields[1], "1000");
        assert_eq!(fields[2], "51200");
        assert_eq!(fields[3], "2412.7");
        assert_eq!(fields[4], "3456");
    }

    #[test]
    fn test_verbose_line_has_all_phase_triples() {
        let line = iteration_line(0, 100, 0, &sample_stats(), true);
        let fields: Vec<_> = line.split_whitespace().collect();
        // 5 summary fields + 6 phases x 3 values
        assert_eq!(fields.len(), 23);
        assert_eq!(fields[5], "3");
        assert_eq!(fields[6], "12");
        assert_eq!(fields[7], "97");
    }

    #[test]
    fn test_unset_minimum_prints_zero() {
        let stats = sample_stats();
        let line = iteration_line(0, 100, 0, &stats, true);
        let fields: Vec<_> = line.split_whitespace().collect();
        // The sync phase recorded nothing; its triple reads 0 0 0
        assert_eq!(&fields[14..17], &["0", "0", "0"]);
    }

    #[test]
    fn test_headers_match_line_shape() {
        assert_eq!(column_headers(false).split_whitespace().count(), 6);
        assert!(column_headers(true).contains("UNLINK"));
    }

    #[test]
    fn test_run_header_mentions_policies() {
        let config = RunConfig {
            threads: 2,
            dirs: vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")],
            num_files: 100,
            file_size: 4096,
            io_buffer_size: 4096,
            name_len: 40,
            rand_len: 16,
            dir_policy: DirPolicy::RoundRobin,
            num_subdirs: 4,
            files_per_subdir: 10,
            secs_per_subdir: 180,
            sync_policy: SyncPolicy::ReverseFsyncSync,
            keep_files: false,
            fill_fs: false,
            loop_count: 1,
            log_file: PathBuf::from("test.log"),
            verbose_stats: true,
        };
        let header = run_header(&config);
        assert!(header.contains("2 thread(s)"));
        assert!(header.contains("post-loop fsync in reverse order"));
        assert!(header.contains("Round Robin across 4 subdirectories"));
        assert!(header.contains("FSUse%"));
    }
}
