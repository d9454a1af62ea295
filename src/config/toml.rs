//! TOML configuration file loading

use crate::config::RunConfig;
use anyhow::Context;
use std::path::Path;

/// Load a [`RunConfig`] from a TOML file and normalize it.
///
/// Fields left out of the file take the same defaults as the CLI flags.
pub fn load(path: &Path) -> crate::Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut config: RunConfig = ::toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.normalize()?;
    Ok(config)
}
