//! Message record engine: dispositions, registries, queries and deletion.
//!
//! The engine owns every registry for one session. Sent messages are kept as
//! whole [`MessageRecord`] snapshots in a single list; the sent-text, hash and
//! id registries are views over that list, so they always have the same length
//! and a deletion removes exactly one entry from each.
//!
//! The engine is single-writer: every mutating operation takes `&mut self`.
//! Wrap it in a mutex to share it between threads. The durable store file is
//! not locked and must not be written by two engines at once.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, trace, warn};

use crate::message::{validate, Disposition, MessageError, MessageRecord};
use crate::store::{MessageStore, PersistenceError, StoredMessage};

/// Returned by [`MessageEngine::longest_message`] when every registry is empty.
pub const NO_MESSAGES: &str = "No messages available.";

/// Returned by [`MessageEngine::full_report`] when nothing has been sent.
pub const NO_SENT_MESSAGES: &str = "No sent messages.";

/// Separator line closing each block of the full report.
pub const REPORT_SEPARATOR: &str = "------------------------------";

/// Outcome of a successful disposition.
#[derive(Debug)]
pub struct DispositionReceipt {
    /// The disposition that was applied.
    pub disposition: Disposition,
    /// Fixed confirmation for the front end.
    pub confirmation: &'static str,
    /// Set when a `store` could not be written to the durable file.
    ///
    /// The in-memory stored-text registry is updated regardless.
    pub persistence_error: Option<PersistenceError>,
}

/// Result of rebuilding the stored-text registry from the durable file.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Texts now in the stored-text registry.
    pub loaded: usize,
    /// Lines skipped as unreadable.
    pub skipped: usize,
    /// Set when the file exists but could not be read at all.
    pub error: Option<PersistenceError>,
}

/// Owns the sent, stored and disregarded registries for one session.
pub struct MessageEngine {
    rng: Box<dyn RngCore + Send>,
    store: MessageStore,
    sent: Vec<MessageRecord>,
    stored_texts: Vec<String>,
    disregarded_texts: Vec<String>,
    total_sent: u64,
}

impl MessageEngine {
    /// Create an engine backed by `store`, with an entropy-seeded id source.
    pub fn new(store: MessageStore) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Create an engine with a caller-supplied id source.
    pub fn with_rng(store: MessageStore, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Box::new(rng),
            store,
            sent: Vec::new(),
            stored_texts: Vec::new(),
            disregarded_texts: Vec::new(),
            total_sent: 0,
        }
    }

    /// Durable store backing the `store` disposition.
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Start a new candidate with a generated id.
    pub fn compose(&mut self, sequence_number: u32) -> MessageRecord {
        MessageRecord::new(sequence_number, self.rng.as_mut())
    }

    /// Commit `record` under the disposition named by `option`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidDisposition`] for anything other than
    /// `send`, `store` or `disregard` (any case); nothing changes in that case.
    pub fn dispose(
        &mut self,
        record: &mut MessageRecord,
        option: &str,
    ) -> Result<DispositionReceipt, MessageError> {
        let disposition = option.parse::<Disposition>()?;
        Ok(self.commit(record, disposition))
    }

    /// Commit `record` under `disposition`.
    ///
    /// The record remembers only its first disposition, but every call adds
    /// fresh registry entries: committing the same record twice produces two.
    pub fn commit(
        &mut self,
        record: &mut MessageRecord,
        disposition: Disposition,
    ) -> DispositionReceipt {
        record.mark(disposition);
        let text = record.body().unwrap_or_default().to_owned();
        let mut persistence_error = None;

        match disposition {
            Disposition::Sent => {
                self.total_sent = self.total_sent.saturating_add(1);
                self.sent.push(record.clone());
                trace!(id = %record.id(), total_sent = self.total_sent, "message sent");
            }
            Disposition::Stored => {
                if let Err(e) = self.store.append(&StoredMessage::from(&*record)) {
                    warn!(id = %record.id(), error = %e, "failed to persist stored message");
                    persistence_error = Some(e);
                }
                self.stored_texts.push(text);
                trace!(id = %record.id(), "message stored");
            }
            Disposition::Disregarded => {
                self.disregarded_texts.push(text);
                trace!(id = %record.id(), "message disregarded");
            }
        }

        DispositionReceipt {
            disposition,
            confirmation: disposition.confirmation(),
            persistence_error,
        }
    }

    /// Number of `send` commits since construction or the last [`Self::clear`].
    ///
    /// Deletion does not lower it.
    pub fn total_sent(&self) -> u64 {
        self.total_sent
    }

    /// Sent records in send order.
    pub fn sent_records(&self) -> &[MessageRecord] {
        &self.sent
    }

    /// Body of each sent record, empty when absent.
    pub fn sent_texts(&self) -> Vec<&str> {
        self.sent
            .iter()
            .map(|r| r.body().unwrap_or_default())
            .collect()
    }

    /// Hash of each sent record, empty when absent.
    pub fn hashes(&self) -> Vec<&str> {
        self.sent
            .iter()
            .map(|r| r.hash().unwrap_or_default())
            .collect()
    }

    /// Id of each sent record.
    pub fn ids(&self) -> Vec<&str> {
        self.sent.iter().map(|r| r.id().as_str()).collect()
    }

    /// Texts of stored messages, from this session or the last load.
    pub fn stored_texts(&self) -> &[String] {
        &self.stored_texts
    }

    /// Texts of disregarded messages.
    pub fn disregarded_texts(&self) -> &[String] {
        &self.disregarded_texts
    }

    /// Longest text across sent, stored and disregarded registries.
    ///
    /// Scans in that order and keeps the first text on ties. Length is in
    /// UTF-16 code units. Returns [`NO_MESSAGES`] when all three are empty.
    pub fn longest_message(&self) -> &str {
        let mut longest: Option<(&str, usize)> = None;
        let candidates = self
            .sent
            .iter()
            .map(|r| r.body().unwrap_or_default())
            .chain(self.stored_texts.iter().map(String::as_str))
            .chain(self.disregarded_texts.iter().map(String::as_str));
        for text in candidates {
            let len = validate::text_len(text);
            let is_longer = match longest {
                Some((_, best)) => len > best,
                None => true,
            };
            if is_longer {
                longest = Some((text, len));
            }
        }
        longest.map_or(NO_MESSAGES, |(text, _)| text)
    }

    /// Recipient and message of the first sent record with this id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MessageNotFound`] when no sent record matches.
    pub fn search_by_id(&self, id: &str) -> Result<String, MessageError> {
        self.sent
            .iter()
            .find(|r| r.id().as_str() == id)
            .map(|r| {
                format!(
                    "Recipient: {}\nMessage: {}",
                    r.recipient().unwrap_or_default(),
                    r.body().unwrap_or_default()
                )
            })
            .ok_or_else(|| MessageError::MessageNotFound(id.to_owned()))
    }

    /// Bodies of sent records addressed to exactly `cell`, in send order.
    pub fn search_by_recipient(&self, cell: &str) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|r| r.recipient() == Some(cell))
            .map(|r| r.body().unwrap_or_default())
            .collect()
    }

    /// Texts in the durable store addressed to exactly `cell`, in file order.
    ///
    /// Reads the file directly; the in-memory stored-text registry is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Read`] if the store file cannot be read.
    pub fn search_stored_by_recipient(&self, cell: &str) -> Result<Vec<String>, PersistenceError> {
        let texts = self
            .store
            .read_records()?
            .into_iter()
            .filter(|m| m.recipient == cell)
            .map(|m| m.message_text)
            .collect();
        Ok(texts)
    }

    /// Recipient and message of the first stored line with this id.
    ///
    /// Same layout as [`search_by_id`](Self::search_by_id), read from the
    /// durable file. `None` when no stored line carries `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Read`] if the store file cannot be read.
    pub fn search_stored_by_id(&self, id: &str) -> Result<Option<String>, PersistenceError> {
        let found = self
            .store
            .read_records()?
            .into_iter()
            .find(|m| m.message_id == id)
            .map(|m| format!("Recipient: {}\nMessage: {}", m.recipient, m.message_text));
        Ok(found)
    }

    /// One block per sent record with id, hash, recipient and message.
    ///
    /// Returns [`NO_SENT_MESSAGES`] when nothing has been sent.
    pub fn full_report(&self) -> String {
        if self.sent.is_empty() {
            return NO_SENT_MESSAGES.to_owned();
        }
        self.sent
            .iter()
            .map(|r| format!("{}\n{REPORT_SEPARATOR}\n", r.details()))
            .collect()
    }

    /// Remove the first sent record whose hash is exactly `hash`.
    ///
    /// The durable store is never rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::HashNotFound`] when no sent record matches; no
    /// state changes in that case.
    pub fn delete_by_hash(&mut self, hash: &str) -> Result<String, MessageError> {
        let index = self
            .sent
            .iter()
            .position(|r| r.hash() == Some(hash))
            .ok_or_else(|| MessageError::HashNotFound(hash.to_owned()))?;
        let removed = self.sent.remove(index);
        trace!(id = %removed.id(), hash, "sent message deleted");
        Ok(format!(
            "Message \"{}\" Successfully deleted.",
            removed.body().unwrap_or_default()
        ))
    }

    /// Replace the stored-text registry with the contents of the durable store.
    ///
    /// The registry is always cleared first, even when the file cannot be read.
    pub fn load_stored_messages(&mut self) -> LoadSummary {
        self.stored_texts.clear();
        match self.store.read_texts() {
            Ok(scan) => {
                self.stored_texts = scan.texts;
                debug!(
                    loaded = self.stored_texts.len(),
                    skipped = scan.skipped,
                    "stored messages loaded"
                );
                LoadSummary {
                    loaded: self.stored_texts.len(),
                    skipped: scan.skipped,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to load stored messages");
                LoadSummary {
                    error: Some(e),
                    ..LoadSummary::default()
                }
            }
        }
    }

    /// Empty every registry and reset the sent counter.
    ///
    /// The durable store file is left alone; see [`MessageStore::purge`].
    pub fn clear(&mut self) {
        self.sent.clear();
        self.stored_texts.clear();
        self.disregarded_texts.clear();
        self.total_sent = 0;
        debug!("message engine cleared");
    }
}

impl std::fmt::Debug for MessageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageEngine")
            .field("store", &self.store)
            .field("sent", &self.sent.len())
            .field("stored", &self.stored_texts.len())
            .field("disregarded", &self.disregarded_texts.len())
            .field("total_sent", &self.total_sent)
            .finish_non_exhaustive()
    }
}
