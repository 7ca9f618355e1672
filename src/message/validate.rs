//! Recipient and body validation rules.

use std::sync::LazyLock;

use regex::Regex;

use super::{MessageError, MAX_BODY_CHARS};

/// `+` followed by 7 to 12 ASCII digits and nothing else.
static RECIPIENT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{7,12}$").ok());

/// Check that `cell` is an international number: `+` then 7 to 12 digits.
///
/// # Errors
///
/// Returns [`MessageError::RecipientFormat`] otherwise.
pub fn check_recipient(cell: &str) -> Result<(), MessageError> {
    let matches = RECIPIENT_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(cell));
    if matches {
        Ok(())
    } else {
        Err(MessageError::RecipientFormat)
    }
}

/// Length of `text` in UTF-16 code units.
///
/// Characters outside the Basic Multilingual Plane, such as most emoji, count
/// as two.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Check that `text` fits in [`MAX_BODY_CHARS`] characters.
///
/// Length is measured with [`text_len`].
///
/// # Errors
///
/// Returns [`MessageError::BodyTooLong`] carrying the number of characters over
/// the limit.
pub fn check_body(text: &str) -> Result<(), MessageError> {
    let len = text_len(text);
    if len > MAX_BODY_CHARS {
        return Err(MessageError::BodyTooLong {
            excess: len.saturating_sub(MAX_BODY_CHARS),
        });
    }
    Ok(())
}
