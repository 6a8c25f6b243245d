use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, TableError};

const LOG_FILE_PREFIX: &str = "rating_table.log";

/// Initializes console logging and, when `log_dir` is set, a daily JSON log file.
///
/// The returned guard flushes the file writer on drop, so the caller keeps it
/// alive until the run is over. A log directory that cannot be created only
/// costs the file layer; console logging still comes up.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rating_table=info"));

    // Warnings and progress go to stderr; stdout only carries the summary line
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let mut file_error = None;
    let (file_layer, guard) = match log_dir.map(open_log_appender) {
        Some(Ok(file_appender)) => {
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().json().with_writer(non_blocking_writer)), Some(guard))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    if let Some(e) = file_error {
        warn!("File logging disabled: {}", e);
    }

    guard
}

/// Creates `dir` if needed and opens a daily-rotated log file inside it.
pub fn open_log_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir).map_err(|e| TableError::io(dir, e))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .map_err(|e| TableError::io(dir, io::Error::new(io::ErrorKind::Other, e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_dir_under_a_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();
        let log_dir = blocker.join("logs");

        let err = open_log_appender(&log_dir).unwrap_err();
        assert!(matches!(err, TableError::Io { ref path, .. } if *path == log_dir));
    }

    #[test]
    fn test_unusable_log_dir_skips_file_layer() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        assert!(init_logging(Some(&blocker.join("logs"))).is_none());
    }

    #[test]
    fn test_log_dir_is_created() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("nested/logs");

        open_log_appender(&log_dir).unwrap();
        assert!(log_dir.is_dir());
    }
}
