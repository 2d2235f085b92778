//! Structured JSONL logging plus human-readable stderr output.
//!
//! Dual-output logging:
//! - **JSONL to file** (`<data dir>/logs/quicknotes.jsonl`) - structured, greppable
//! - **Compact to stderr** - human-readable for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use quicknotes::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! tracing::info!(event_type = "app_start", "Application started");
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::default_data_dir;

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// Dropping the guard will flush remaining logs and close the file.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join("quicknotes.jsonl");

    // Open log file with append mode
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .unwrap_or_else(|e| {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            OpenOptions::new()
                .write(true)
                .open("/dev/null")
                .expect("Failed to open /dev/null")
        });

    // Non-blocking writer so a slow disk never stalls the UI thread
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    // Environment filter - default to info, allow override via RUST_LOG
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ureq=warn"));

    // JSONL layer for file output
    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    // Compact layer for stderr
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (`<data dir>/logs/`)
fn get_log_dir() -> PathBuf {
    default_data_dir().join("logs")
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join("quicknotes.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_points_into_logs_dir() {
        let path = log_path();
        assert!(path.to_string_lossy().contains("logs"));
        assert!(path.to_string_lossy().ends_with("quicknotes.jsonl"));
    }
}
