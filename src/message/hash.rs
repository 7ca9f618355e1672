//! Short, non-cryptographic message fingerprint.
//!
//! Format: `<first two id chars>:<sequence number>:<first char><last char>`,
//! with both body characters uppercased, or `??` when there is no body. The
//! edge part is always exactly two characters.

use super::MessageId;

/// Suffix used when the body is absent or empty.
pub const EMPTY_BODY_MARKER: &str = "??";

/// Derive the hash for the given inputs.
pub fn derive(id: &MessageId, sequence_number: u32, body: Option<&str>) -> String {
    let prefix = id.prefix();
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return format!("{prefix}:{sequence_number}:{EMPTY_BODY_MARKER}");
    };

    let mut chars = body.chars();
    let first = chars.next();
    let last = chars.next_back().or(first);
    let edges: String = first.into_iter().chain(last).map(upper_single).collect();
    format!("{prefix}:{sequence_number}:{edges}")
}

/// Uppercase form of `c` when it is one character, else `c` unchanged.
fn upper_single(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}
