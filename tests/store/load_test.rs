//! Tolerant loading of the durable store into the engine.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use quickchat::{MessageEngine, MessageStore};

fn engine_at(path: &Path) -> MessageEngine {
    MessageEngine::with_rng(MessageStore::new(path), StdRng::seed_from_u64(8))
}

#[test]
fn load_reads_message_text_fields_in_order() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("stored_messages.json");
    let json1 = r#"{"messageID":"1234567890","recipient":"+27730000000","messageText":"stored one","messageHash":"12:1:SO"}"#;
    let json2 = r#"{"messageID":"2234567890","recipient":"+27730000001","messageText":"stored two","messageHash":"22:2:ST"}"#;
    std::fs::write(&path, format!("{json1}\n{json2}\n")).expect("write fixture");

    let mut engine = engine_at(&path);
    let summary = engine.load_stored_messages();
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.skipped, 0);
    assert!(summary.error.is_none());
    assert_eq!(
        engine.stored_texts(),
        ["stored one".to_owned(), "stored two".to_owned()]
    );
}

#[test]
fn load_skips_blank_lines_and_keeps_raw_fallback() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("stored_messages.json");
    let contents = concat!(
        "\n",
        "{\"messageText\":\"first\"}\r\n",
        "   \n",
        "  not json at all  \n",
        "{\"messageID\":\"1234567890\"}\n",
        "{\"messageText\":\"last\"}",
    );
    std::fs::write(&path, contents).expect("write fixture");

    let mut engine = engine_at(&path);
    let summary = engine.load_stored_messages();
    assert_eq!(summary.loaded, 4);
    assert_eq!(
        engine.stored_texts(),
        [
            "first".to_owned(),
            "not json at all".to_owned(),
            "{\"messageID\":\"1234567890\"}".to_owned(),
            "last".to_owned(),
        ]
    );
}

#[test]
fn load_skips_invalid_utf8_lines() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("stored_messages.json");
    let mut bytes = b"{\"messageText\":\"ok\"}\n".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
    bytes.extend_from_slice(b"{\"messageText\":\"also ok\"}\n");
    std::fs::write(&path, bytes).expect("write fixture");

    let mut engine = engine_at(&path);
    let summary = engine.load_stored_messages();
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        engine.stored_texts(),
        ["ok".to_owned(), "also ok".to_owned()]
    );
}

#[test]
fn load_replaces_rather_than_merges() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("stored_messages.json");
    let mut engine = engine_at(&path);

    let mut record = engine.compose(1);
    record.validate_body(Some("from this session")).expect("valid");
    engine.dispose(&mut record, "store").expect("store");
    let mut dropped = engine.compose(2);
    dropped.validate_body(Some("dropped")).expect("valid");
    engine.dispose(&mut dropped, "disregard").expect("disregard");

    std::fs::write(&path, "{\"messageText\":\"replaced\"}\n").expect("overwrite fixture");
    engine.load_stored_messages();

    assert_eq!(engine.stored_texts(), ["replaced".to_owned()]);
    assert_eq!(engine.disregarded_texts(), ["dropped".to_owned()]);
}

#[test]
fn load_of_missing_file_clears_registry() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("stored_messages.json");
    let mut engine = engine_at(&path);

    let mut record = engine.compose(1);
    record.validate_body(Some("written")).expect("valid");
    engine.dispose(&mut record, "store").expect("store");
    engine.store().purge().expect("purge");

    let summary = engine.load_stored_messages();
    assert_eq!(summary.loaded, 0);
    assert!(summary.error.is_none());
    assert!(engine.stored_texts().is_empty());
}

#[test]
fn unreadable_store_is_reported() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    // Reading a directory as a file fails.
    let mut engine = engine_at(dir.path());
    let summary = engine.load_stored_messages();
    assert!(summary.error.is_some());
    assert!(engine.stored_texts().is_empty());
}

#[test]
fn stored_round_trip_preserves_order() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("stored_messages.json");
    let bodies: Vec<String> = (0..12).map(|i| format!("stored message #{i}")).collect();

    let mut writer = engine_at(&path);
    for (seq, body) in (1..).zip(&bodies) {
        let mut record = writer.compose(seq);
        record.validate_recipient("+27730000000").expect("valid");
        record.validate_body(Some(body.as_str())).expect("valid");
        record.compute_hash();
        writer.dispose(&mut record, "store").expect("store");
    }

    let mut reader = engine_at(&path);
    let summary = reader.load_stored_messages();
    assert_eq!(summary.loaded, bodies.len());
    assert_eq!(reader.stored_texts(), bodies.as_slice());
}
