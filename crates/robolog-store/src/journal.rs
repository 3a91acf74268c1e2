//! [`ErrorJournal`] – append-only structured error journal.
//!
//! Every failure in the recording/sync path lands here instead of reaching
//! the control loop. Entries are kept in a single JSON array file
//! (`error_log.json`) that is read back, extended, and rewritten in full on
//! each append. A corrupt or truncated journal is silently reset to empty
//! rather than blocking further logging.
//!
//! The journal is the last line of defense: a failure to write the journal
//! itself is only logged via `tracing::error` and never propagated.
//!
//! # Example
//!
//! ```rust,no_run
//! use robolog_store::journal::ErrorJournal;
//! use robolog_types::ErrorKind;
//!
//! let journal = ErrorJournal::new("/var/log/robolog");
//! journal.log_error(
//!     ErrorKind::FileIoError,
//!     "failed to save episode file",
//!     serde_json::json!({ "file_path": "/data/arm-01_episode_x.json" }),
//! );
//! ```

use std::backtrace::Backtrace;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use robolog_types::{ErrorEntry, ErrorKind};
use thiserror::Error;
use tracing::{error, warn};

/// File name of the journal inside the log directory.
const JOURNAL_FILE: &str = "error_log.json";

#[derive(Error, Debug)]
enum JournalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only error journal backed by a single JSON array file.
pub struct ErrorJournal {
    path: PathBuf,
}

impl ErrorJournal {
    /// Create a journal writing to `{log_dir}/error_log.json`.
    ///
    /// The directory is created if missing. Failure to create it is logged
    /// and swallowed; subsequent appends will report their own failures the
    /// same way.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let log_dir = log_dir.into();
        if let Err(e) = fs::create_dir_all(&log_dir) {
            error!(dir = %log_dir.display(), "failed to create log directory: {e}");
        }
        Self {
            path: log_dir.join(JOURNAL_FILE),
        }
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry with the current timestamp and captured backtrace.
    ///
    /// Never fails outward: journal write errors are logged and dropped.
    pub fn log_error(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        details: serde_json::Value,
    ) {
        let entry = ErrorEntry {
            timestamp: Utc::now(),
            kind,
            message: message.into(),
            traceback: Backtrace::force_capture().to_string(),
            details,
        };
        warn!(kind = %entry.kind, message = %entry.message, "error journaled");

        if let Err(e) = self.append(entry) {
            error!(journal = %self.path.display(), "failed to write error journal: {e}");
        }
    }

    /// Read back all journaled entries, oldest first.
    ///
    /// A missing, empty, or corrupt journal file reads as an empty journal.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    fn append(&self, entry: ErrorEntry) -> Result<(), JournalError> {
        let mut entries = self.entries();
        entries.push(entry);
        let raw = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
