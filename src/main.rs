//! FilePulse CLI entry point

use anyhow::Context;
use filepulse::config::{cli::Cli, toml, validator};
use filepulse::coordinator::Runner;
use filepulse::output::{text, ReportSink};

fn main() {
    if let Err(err) = run() {
        eprintln!("filepulse: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> filepulse::Result<()> {
    let cli = Cli::parse_args();

    let config = match &cli.config {
        Some(path) => toml::load(path)?,
        None => cli.to_config()?,
    };
    validator::validate(&config).context("invalid configuration")?;

    let mut sink = ReportSink::open(&config.log_file)?;
    sink.emit(&text::run_header(&config))?;

    let mut runner = Runner::new(config)?;
    runner.run(&mut sink)
}
