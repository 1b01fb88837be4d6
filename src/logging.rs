//! Logging setup for the dashboard.
//!
//! Everything goes to the console and to daily-rotated files in the platform
//! data directory:
//!
//! - `pokedash.<date>.log`: every event allowed by `RUST_LOG` (default `info`)
//! - `error.<date>.log`: warnings and errors only
//!
//! ```no_run
//! pokedash::logging::init().expect("logging");
//! tracing::info!("dashboard started");
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const APP_DIR: &str = "pokedash";
const MAX_LOG_FILES: usize = 10;

/// Returns `<data_dir>/pokedash/logs`, creating it if needed.
///
/// - Windows: `%APPDATA%/pokedash/logs`
/// - macOS: `~/Library/Application Support/pokedash/logs`
/// - Linux: `~/.local/share/pokedash/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let log_dir = dirs::data_dir()
        .context("Failed to determine data directory")?
        .join(APP_DIR)
        .join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

fn file_appender(log_dir: &std::path::Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} file appender"))
}

/// Installs the global subscriber. Call once, before anything logs.
///
/// # Errors
///
/// Fails if the log directory or the file appenders cannot be created.
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;
    let all_logs_appender = file_appender(&log_dir, APP_DIR)?;
    let error_logs_appender = file_appender(&log_dir, "error")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .pretty();

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("A global subscriber is already installed")?;

    tracing::info!(log_dir = %log_dir.display(), "Logging initialized");

    Ok(())
}
