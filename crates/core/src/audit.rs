//! Append-only audit trail of library mutations.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use tracing::warn;

/// Receives one message per successful mutation.
///
/// Implementations must not fail the caller; the library treats auditing
/// as fire-and-forget.
pub trait AuditLog {
    /// Record a single message.
    fn log(&mut self, message: &str);
}

/// Writes timestamped lines to a text file.
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    /// Create a sink appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl AuditLog for FileAuditLog {
    fn log(&mut self, message: &str) {
        let line = format_line(Utc::now(), message);
        if let Err(err) = self.append(&line) {
            warn!("Failed to append to audit log {}: {err}", self.path.display());
        }
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn log(&mut self, _message: &str) {}
}

fn format_line(at: DateTime<Utc>, message: &str) -> String {
    format!("{} - {message}", at.format("%Y-%m-%d %H:%M:%SZ"))
}
