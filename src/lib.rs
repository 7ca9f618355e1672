//! Quickchat — message record engine.
//!
//! Validates outbound message candidates, fingerprints them, and commits each
//! one as sent, stored or disregarded. Stored messages go to a durable
//! line-delimited JSON file; sent messages stay in memory for lookup,
//! reporting and deletion.
//!
//! See `DESIGN.md` for design notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod logging;
pub mod message;
pub mod store;

pub use engine::{DispositionReceipt, LoadSummary, MessageEngine};
pub use message::{Disposition, MessageError, MessageId, MessageRecord};
pub use store::{MessageStore, PersistenceError, StoredMessage};
