//! Durable store for messages with the `store` disposition.
//!
//! One JSON object per line, appended and never rewritten:
//!
//! ```text
//! {"messageID":"2712345678","recipient":"+27821234567","messageText":"Hi","messageHash":"27:1:HI"}
//! ```
//!
//! Loading is tolerant: blank lines are skipped, lines that are not valid
//! UTF-8 are skipped and counted, and any line that does not yield a string
//! `messageText` field contributes its whole trimmed text instead.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::message::MessageRecord;

/// Default store file name.
pub const DEFAULT_STORE_FILE: &str = "stored_messages.json";

/// Record terminator: the platform line separator.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Record terminator: the platform line separator.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Errors from the durable store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Appending or removing the store file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Store file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading the store file failed.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Store file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The record could not be serialized.
    #[error("failed to encode stored message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One persisted line. Missing fields are written as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Ten-character message id.
    #[serde(rename = "messageID", default)]
    pub message_id: String,
    /// Recipient cell number.
    #[serde(default)]
    pub recipient: String,
    /// Message body.
    #[serde(rename = "messageText", default)]
    pub message_text: String,
    /// Message hash.
    #[serde(rename = "messageHash", default)]
    pub message_hash: String,
}

impl From<&MessageRecord> for StoredMessage {
    fn from(record: &MessageRecord) -> Self {
        Self {
            message_id: record.id().to_string(),
            recipient: record.recipient().unwrap_or_default().to_owned(),
            message_text: record.body().unwrap_or_default().to_owned(),
            message_hash: record.hash().unwrap_or_default().to_owned(),
        }
    }
}

/// Stored texts recovered from the file, plus the lines that had to be dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextScan {
    /// One text per non-blank line, in file order.
    pub texts: Vec<String>,
    /// Lines skipped because they were not valid UTF-8.
    pub skipped: usize,
}

/// Append-only, line-delimited JSON file of stored messages.
#[derive(Debug, Clone)]
pub struct MessageStore {
    path: PathBuf,
}

impl MessageStore {
    /// Use the store file at `path`. Nothing is touched until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Encode`] if serialization fails and
    /// [`PersistenceError::Write`] on any I/O failure.
    pub fn append(&self, message: &StoredMessage) -> Result<(), PersistenceError> {
        let line = serde_json::to_string(message)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;
        write!(file, "{line}{LINE_SEPARATOR}").map_err(|source| self.write_error(source))?;
        file.flush().map_err(|source| self.write_error(source))?;
        trace!(path = %self.path.display(), id = %message.message_id, "stored message appended");
        Ok(())
    }

    /// Read the text of every non-blank line, tolerating malformed records.
    ///
    /// A missing file yields an empty scan.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Read`] if the file exists but cannot be read.
    pub fn read_texts(&self) -> Result<TextScan, PersistenceError> {
        let mut scan = TextScan::default();
        for line in self.read_lines()? {
            match line {
                Some(line) => scan.texts.push(text_of_line(&line)),
                None => scan.skipped = scan.skipped.saturating_add(1),
            }
        }
        Ok(scan)
    }

    /// Read every line that parses as a [`StoredMessage`] object.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Read`] if the file exists but cannot be read.
    pub fn read_records(&self) -> Result<Vec<StoredMessage>, PersistenceError> {
        let records = self
            .read_lines()?
            .into_iter()
            .flatten()
            .filter_map(|line| match serde_json::from_str::<StoredMessage>(&line) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(error = %e, "skipping malformed stored message");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Delete the store file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Write`] if the file exists but cannot be removed.
    pub fn purge(&self) -> Result<(), PersistenceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "message store purged");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.write_error(source)),
        }
    }

    /// Trimmed non-blank lines; `None` marks a line that is not valid UTF-8.
    fn read_lines(&self) -> Result<Vec<Option<String>>, PersistenceError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut lines = Vec::new();
        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            match std::str::from_utf8(raw) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        lines.push(Some(line.to_owned()));
                    }
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = index.saturating_add(1),
                        error = %e,
                        "skipping unreadable stored message line"
                    );
                    lines.push(None);
                }
            }
        }
        Ok(lines)
    }

    fn write_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// `messageText` of a JSON line, or the whole trimmed line when absent.
fn text_of_line(line: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(line).ok();
    match parsed
        .as_ref()
        .and_then(|value| value.get("messageText"))
        .and_then(serde_json::Value::as_str)
    {
        Some(text) => text.to_owned(),
        None => {
            debug!(line, "stored line has no messageText, keeping raw text");
            line.to_owned()
        }
    }
}
