//! Tracing setup. Output goes to a file so it never draws over the TUI.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TASKLIST_LOG";
const DEFAULT_FILTER: &str = "tasklist=info";

pub fn init(path: &Path) -> Result<()> {
    crate::storage::ensure_parent(path)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init tracing: {e}"))?;
    Ok(())
}
