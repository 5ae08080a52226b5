//! Request logging.
//!
//! When enabled, the client appends one JSON object per call to a plain-text
//! log file: timestamp, method, URL, payload if present, and either the
//! decoded result or the error text. Writes happen synchronously before
//! `request` returns and are serialized behind a mutex so concurrent calls
//! never interleave records.
//!
//! The signature query value is redacted from logged URLs; a signed URL is a
//! short-lived credential and does not belong in a log file. A failed log
//! write is reported via `tracing` and otherwise ignored, it never replaces
//! the outcome of the request itself.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::error::{CpbmError, Result};

/// One log record, serialized as a single JSON line.
#[derive(Debug, Serialize)]
pub struct LogEntry<'a> {
    /// RFC 3339 timestamp of the call.
    pub timestamp: String,
    /// HTTP method.
    pub method: &'a str,
    /// Request URL with the signature redacted.
    pub url: String,
    /// JSON payload, for POST/PUT calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<&'a serde_json::Value>,
    /// Decoded response on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a serde_json::Value>,
    /// Error text on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only request log sink.
pub struct RequestLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RequestLog {
    /// Open (and optionally truncate) the log file, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>, clear: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| {
                    CpbmError::Configuration(format!(
                        "cannot create log directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(!clear)
            .write(true)
            .truncate(clear)
            .open(&path)
            .map_err(|e| {
                CpbmError::Configuration(format!("cannot open log file {}: {}", path.display(), e))
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Write failures are logged and swallowed.
    pub fn record(&self, entry: &LogEntry<'_>) {
        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize log entry");
                return;
            }
        };
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "{}", line) {
            warn!(error = %e, path = %self.path.display(), "failed to write log entry");
        }
    }
}

impl std::fmt::Debug for RequestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLog").field("path", &self.path).finish()
    }
}

/// Strip the signature value from a signed URL before it is logged.
pub(crate) fn redact_signature(url: &str) -> String {
    match url.find("&signature=") {
        Some(idx) => format!("{}&signature=REDACTED", &url[..idx]),
        None => url.to_string(),
    }
}

/// Current time as an RFC 3339 string, for log entries.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
