//! Message id generation.
//!
//! Ids are drawn from a caller-owned random source so tests can seed it.

use std::fmt;

use rand::Rng;

use super::MessageError;

/// Required id length in characters.
pub const MESSAGE_ID_LEN: usize = 10;

const ID_MIN: u64 = 1_000_000_000;
const ID_MAX: u64 = 9_999_999_999;

/// Ten-character message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Draw a ten-digit id in `[1_000_000_000, 9_999_999_999]` from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(ID_MIN..=ID_MAX).to_string())
    }

    /// Accept a caller-supplied id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidMessageId`] unless `candidate` is exactly
    /// [`MESSAGE_ID_LEN`] characters long.
    pub fn parse(candidate: &str) -> Result<Self, MessageError> {
        if !is_valid_message_id(candidate) {
            return Err(MessageError::InvalidMessageId(candidate.to_owned()));
        }
        Ok(Self(candidate.to_owned()))
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First two characters, used as the hash prefix.
    pub fn prefix(&self) -> &str {
        match self.0.char_indices().nth(2) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether `candidate` has exactly [`MESSAGE_ID_LEN`] characters.
pub fn is_valid_message_id(candidate: &str) -> bool {
    candidate.chars().count() == MESSAGE_ID_LEN
}
