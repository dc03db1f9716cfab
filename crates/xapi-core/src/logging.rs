//! LRS traffic log.
//!
//! An optional append-only file recording every request sent to the LRS and
//! the status that came back. Independent of the `log` facade so it can be
//! switched on per course without touching the global logger.

use chrono::{SecondsFormat, Utc};
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

/// Thread-safe handle to an append-only log file.
pub type LogHandle = Arc<Mutex<Option<File>>>;

/// Handle that discards every line.
pub fn disabled() -> LogHandle {
    Arc::new(Mutex::new(None))
}

/// Write a timestamped line to the log file (if present).
pub fn log_line(handle: &LogHandle, direction: &str, data: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let _ = writeln!(file, "[{}] {}: {}", ts, direction, data);
            let _ = file.flush();
        }
    }
}

/// Open (or create) a log file at `{log_dir}/{log_id}.log` and return a shared handle.
///
/// Failure to create the directory or file yields a disabled handle; tracing
/// must never stop a learner's session.
pub fn open_log_file(log_dir: Option<&Path>, log_id: &str) -> LogHandle {
    let file = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", log_id)))
            .ok()
    });
    Arc::new(Mutex::new(file))
}
