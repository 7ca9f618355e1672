//! Candidate messages: identity, validated content, hash and disposition.
//!
//! A [`MessageRecord`] starts out with only an id and a caller-supplied
//! sequence number. Recipient and body are filled in by the validators in
//! [`validate`], the hash by [`MessageRecord::compute_hash`], and the
//! disposition by [`crate::engine::MessageEngine::dispose`].

pub mod hash;
pub mod id;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use rand::RngCore;

pub use id::MessageId;

/// Maximum body length, counted in UTF-16 code units.
pub const MAX_BODY_CHARS: usize = 250;

/// Confirmation returned when a recipient passes validation.
pub const RECIPIENT_CAPTURED: &str = "Cell phone number successfully captured.";

/// Confirmation returned when a body passes validation.
pub const BODY_READY: &str = "Message ready to send.";

/// Confirmation returned by the `send` disposition.
pub const SENT_CONFIRMATION: &str = "Message successfully sent.";

/// Confirmation returned by the `store` disposition.
pub const STORED_CONFIRMATION: &str = "Message successfully stored.";

/// Confirmation returned by the `disregard` disposition.
pub const DISREGARDED_CONFIRMATION: &str = "Press 0 to delete message.";

/// Errors surfaced to the front end as fixed, human-readable messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// Recipient does not match `+` followed by 7 to 12 digits.
    #[error(
        "Cell phone number is incorrectly formatted or does not contain an international code. \
         Please correct the number and try again."
    )]
    RecipientFormat,

    /// Body is longer than [`MAX_BODY_CHARS`].
    #[error("Message exceeds 250 characters by {excess}, please reduce size.")]
    BodyTooLong {
        /// Number of characters over the limit.
        excess: usize,
    },

    /// No body was supplied.
    #[error("Message text is missing.")]
    BodyMissing,

    /// Disposition keyword was not `send`, `store` or `disregard`.
    #[error("Invalid option \"{0}\". Please choose send, store or disregard.")]
    InvalidDisposition(String),

    /// No sent message carries the requested id.
    #[error("Message not found.")]
    MessageNotFound(String),

    /// No sent message carries the requested hash.
    #[error("Message hash not found.")]
    HashNotFound(String),

    /// Id override was not exactly ten characters long.
    #[error("Message ID must be exactly 10 characters: {0}")]
    InvalidMessageId(String),
}

/// Terminal classification of a candidate message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Delivered and tracked in the sent registries.
    Sent,
    /// Persisted to the durable store.
    Stored,
    /// Dropped; only its text is remembered.
    Disregarded,
}

impl Disposition {
    /// Keyword accepted by [`FromStr`] for this disposition.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "send",
            Self::Stored => "store",
            Self::Disregarded => "disregard",
        }
    }

    /// Fixed confirmation returned to the caller once committed.
    pub fn confirmation(self) -> &'static str {
        match self {
            Self::Sent => SENT_CONFIRMATION,
            Self::Stored => STORED_CONFIRMATION,
            Self::Disregarded => DISREGARDED_CONFIRMATION,
        }
    }
}

impl FromStr for Disposition {
    type Err = MessageError;

    /// Parse `send`, `store` or `disregard`, ignoring ASCII case.
    fn from_str(option: &str) -> Result<Self, Self::Err> {
        match option.to_ascii_lowercase().as_str() {
            "send" => Ok(Self::Sent),
            "store" => Ok(Self::Stored),
            "disregard" => Ok(Self::Disregarded),
            _ => Err(MessageError::InvalidDisposition(option.to_owned())),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate message and everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    id: MessageId,
    sequence_number: u32,
    recipient: Option<String>,
    body: Option<String>,
    hash: Option<String>,
    disposition: Option<Disposition>,
}

impl MessageRecord {
    /// Create a candidate with a freshly generated id.
    pub fn new<R: RngCore + ?Sized>(sequence_number: u32, rng: &mut R) -> Self {
        Self::with_id(sequence_number, MessageId::generate(rng))
    }

    /// Create a candidate with a known id.
    pub fn with_id(sequence_number: u32, id: MessageId) -> Self {
        Self {
            id,
            sequence_number,
            recipient: None,
            body: None,
            hash: None,
            disposition: None,
        }
    }

    /// The ten-character message id.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Override the generated id.
    ///
    /// The hash is not recomputed; call [`Self::compute_hash`] again afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidMessageId`] unless `candidate` is exactly
    /// ten characters long. The current id is kept in that case.
    pub fn set_id(&mut self, candidate: &str) -> Result<(), MessageError> {
        self.id = MessageId::parse(candidate)?;
        Ok(())
    }

    /// Whether the id has the required ten characters.
    pub fn has_valid_id(&self) -> bool {
        id::is_valid_message_id(self.id.as_str())
    }

    /// Caller-supplied sequence number.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Validated recipient, if any.
    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    /// Validated body, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Last computed hash, if any.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Disposition recorded by the first successful commit.
    pub fn disposition(&self) -> Option<Disposition> {
        self.disposition
    }

    /// Validate `cell` and record it as the recipient on success.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::RecipientFormat`]; the recipient is left as it was.
    pub fn validate_recipient(&mut self, cell: &str) -> Result<&'static str, MessageError> {
        validate::check_recipient(cell)?;
        self.recipient = Some(cell.to_owned());
        Ok(RECIPIENT_CAPTURED)
    }

    /// Validate `text` and record it verbatim as the body on success.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::BodyMissing`] for `None` and
    /// [`MessageError::BodyTooLong`] past [`MAX_BODY_CHARS`].
    pub fn validate_body(&mut self, text: Option<&str>) -> Result<&'static str, MessageError> {
        let text = text.ok_or(MessageError::BodyMissing)?;
        validate::check_body(text)?;
        self.body = Some(text.to_owned());
        Ok(BODY_READY)
    }

    /// Derive the hash from id, sequence number and body, store it and return it.
    pub fn compute_hash(&mut self) -> &str {
        let derived = hash::derive(&self.id, self.sequence_number, self.body.as_deref());
        self.hash.insert(derived).as_str()
    }

    /// Record the disposition unless one is already set. Returns whether it was set.
    pub(crate) fn mark(&mut self, disposition: Disposition) -> bool {
        if self.disposition.is_some() {
            return false;
        }
        self.disposition = Some(disposition);
        true
    }

    /// Multi-line summary shown to the user after a disposition.
    pub fn details(&self) -> String {
        format!(
            "Message ID: {}\nMessage Hash: {}\nRecipient: {}\nMessage: {}",
            self.id,
            self.hash().unwrap_or_default(),
            self.recipient().unwrap_or_default(),
            self.body().unwrap_or_default(),
        )
    }
}
