//! Logger collaborator interface.
//!
//! The engine treats logging as an external capability with three operations:
//! `info`, `warning`, `error`. Hosts plug in whatever sink they have; the
//! engine never catches logging failures (file-backed logging is best-effort
//! by construction instead).

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Minimal logging capability required by the engine.
pub trait Logger: Send + Sync {
    /// Informational event.
    fn info(&self, message: &str);
    /// Non-fatal anomaly (skipped file, unreadable input, ...).
    fn warning(&self, message: &str);
    /// Hard failure context.
    fn error(&self, message: &str);
}

/// Logs to stderr with a level prefix.
#[derive(Debug, Default)]
pub struct StdErrLogger;

impl Logger for StdErrLogger {
    fn info(&self, message: &str) {
        eprintln!("[ingest][info] {message}");
    }

    fn warning(&self, message: &str) {
        eprintln!("[ingest][warning] {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("[ingest][error] {message}");
    }
}

/// Appends timestamped lines to a local log file.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLogger {
    /// Create a file logger that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are
    /// ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, level: &str, message: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {level} {message}", unix_ts());
        }
    }
}

impl Logger for FileLogger {
    fn info(&self, message: &str) {
        self.append_line("info", message);
    }

    fn warning(&self, message: &str) {
        self.append_line("warning", message);
    }

    fn error(&self, message: &str) {
        self.append_line("error", message);
    }
}

/// Fans every event out to a list of loggers.
#[derive(Default)]
pub struct CompositeLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl CompositeLogger {
    /// Create a composite from a list of loggers.
    pub fn new(loggers: Vec<Arc<dyn Logger>>) -> Self {
        Self { loggers }
    }
}

impl fmt::Debug for CompositeLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeLogger")
            .field("loggers_len", &self.loggers.len())
            .finish()
    }
}

impl Logger for CompositeLogger {
    fn info(&self, message: &str) {
        for l in &self.loggers {
            l.info(message);
        }
    }

    fn warning(&self, message: &str) {
        for l in &self.loggers {
            l.warning(message);
        }
    }

    fn error(&self, message: &str) {
        for l in &self.loggers {
            l.error(message);
        }
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
