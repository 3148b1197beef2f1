use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Where `--debug` writes its log; stdout belongs to the terminal UI
pub fn debug_log_path() -> PathBuf {
    std::env::temp_dir().join("servicefinder-debug.log")
}

/// Install the tracing subscriber when `--debug` is given
///
/// Respects `RUST_LOG`, falling back to `servicefinder=debug`. Without
/// `--debug` no subscriber is installed and events are dropped.
pub fn init_logging(debug: bool) -> Result<()> {
    if !debug {
        return Ok(());
    }

    let path = debug_log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open debug log {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("servicefinder=debug"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
