//! Tracing Utilities Module
//!
//! Logging setup for the daemon: console output plus a log file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the non-blocking writer flushing for the whole process lifetime
static WORKER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static INIT: Once = Once::new();

/// `RUST_LOG` if set, `info` otherwise
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes the tracing subscriber with file and console output.
///
/// Only the first call has an effect. If `log_path` cannot be opened the
/// subscriber logs to stdout alone.
pub fn setup_tracing(log_path: &Path) {
    INIT.call_once(|| {
        let stdout_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_filter(env_filter());

        let file = OpenOptions::new().append(true).create(true).open(log_path);
        let file_layer = match file {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                let _ = WORKER_GUARD.set(guard);
                Some(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_filter(env_filter()),
                )
            }
            Err(e) => {
                eprintln!("Cannot open log file {}: {}", log_path.display(), e);
                None
            }
        };

        if let Err(e) = tracing_subscriber::registry()
            .with(file_layer)
            .with(stdout_layer)
            .try_init()
        {
            eprintln!("Tracing already initialized: {}", e);
        }
    });
}

/// Console-only logging for short-lived tools
pub fn setup_console_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_filter(env_filter()))
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that repeated setup calls are harmless
    #[test]
    fn test_setup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispmodesd.log");
        setup_tracing(&path);
        setup_tracing(&path);
        setup_console_tracing();
        tracing::info!("written after setup");
    }
}
