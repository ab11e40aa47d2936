//! Timestamped log files
//!
//! [`init_file_logging`] installs a `tracing` subscriber that writes to
//! `<dir>/<%m_%d_%Y_%H_%M_%S>.log` for as long as the returned [`LogGuard`]
//! lives. The subscriber is the thread's default, so nothing is installed
//! globally and tests can open and close log files freely.

use crate::error::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "scorecast=info";

/// Keeps the file subscriber installed; dropping it uninstalls the subscriber
#[must_use = "logging stops when the guard is dropped"]
pub struct LogGuard {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl LogGuard {
    /// File receiving the log lines
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard").field("path", &self.path).finish()
    }
}

/// Log file name for the current local time
pub fn log_file_name() -> String {
    format!("{}.log", Local::now().format("%m_%d_%Y_%H_%M_%S"))
}

/// Create `dir`, open a timestamped log file in it and route this thread's
/// `tracing` events there until the guard is dropped
pub fn init_file_logging(dir: impl AsRef<Path>) -> Result<LogGuard> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(log_file_name());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    Ok(LogGuard {
        path,
        _guard: tracing::subscriber::set_default(subscriber),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_name_format() {
        let name = log_file_name();
        assert!(name.ends_with(".log"));
        // MM_DD_YYYY_HH_MM_SS
        assert_eq!(name.trim_end_matches(".log").split('_').count(), 6);
    }

    #[test]
    fn test_events_reach_file_until_guard_drops() {
        let dir = tempdir().unwrap();
        let guard = init_file_logging(dir.path().join("logs")).unwrap();
        let path = guard.path().to_path_buf();

        tracing::info!("model trainer started");
        drop(guard);
        tracing::info!("after the guard");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("model trainer started"));
        assert!(contents.contains("INFO"));
        assert!(!contents.contains("after the guard"));
    }
}
