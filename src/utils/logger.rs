//! Logging initialization and configuration.
//!
//! Logs are written to files under `~/.rusty-guard/logs/` so they never
//! interleave with the confirmation prompts on the terminal.
//!
//! # Configuration
//!
//! The log level can be controlled via the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - Show classification details
//! - `RUST_LOG=info` - Show confirmations and cache hits (default)
//! - `RUST_LOG=warn` - Show denials and faults only

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::security::home_dir;

/// `~/.rusty-guard/logs`
pub fn default_log_dir() -> PathBuf {
    home_dir().join("logs")
}

/// Name of the log file for a run started now, e.g.
/// `rusty-guard.2024-12-06-14-30-25.log`.
pub fn log_file_name() -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    format!("rusty-guard.{}.log", timestamp)
}

/// Initialize file logging in `log_dir`.
///
/// Returns the writer guard, which must be kept alive for as long as logs
/// should be flushed. Returns `None` (after a warning on stderr) if the log
/// file cannot be created; the program keeps working without logs.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
        return None;
    }

    let log_path = log_dir.join(log_file_name());
    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {}", e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: Logging already initialized: {}", e);
        return None;
    }

    tracing::info!("Logging initialized - writing to {}", log_path.display());
    Some(guard)
}
