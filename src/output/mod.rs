//! Report output
//!
//! Every report line goes to two places at once: standard output and an
//! append-mode log file, so interrupted runs still leave a complete record
//! of the iterations that finished.

pub mod text;

use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Console plus log file sink.
pub struct ReportSink {
    log: File,
}

impl ReportSink {
    /// Open (appending) or create the log file.
    pub fn open(log_path: &Path) -> crate::Result<Self> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("failed to open log file {}", log_path.display()))?;
        Ok(Self { log })
    }

    /// Write one block of text to stdout and the log.
    pub fn emit(&mut self, text: &str) -> crate::Result<()> {
        println!("{text}");
        writeln!(self.log, "{text}").context("failed to write to log file")?;
        self.log.flush().context("failed to flush log file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_appends_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");

        let mut sink = ReportSink::open(&path).unwrap();
        sink.emit("first line").unwrap();
        drop(sink);

        let mut sink = ReportSink::open(&path).unwrap();
        sink.emit("second line").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first line\nsecond line\n");
    }
}
