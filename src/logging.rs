use std::str::FromStr;

use tracing::Level;

use crate::error::{ItemCfError, Result};

/// Installs the fmt subscriber for the binaries. `level` is one of
/// `trace`, `debug`, `info`, `warn` or `error`.
pub fn init(level: &str) -> Result<()> {
    let log_level = Level::from_str(level.trim())
        .map_err(|error| ItemCfError::Config(format!("log.level '{}': {}", level, error)))?;
    tracing_subscriber::fmt().with_max_level(log_level).init();
    Ok(())
}
