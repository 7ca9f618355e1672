//! Quickchat CLI entry point.
//!
//! A thin, non-interactive front end over the message engine: validate a
//! candidate, store it durably, list stored messages, or find stored messages
//! for a recipient.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use quickchat::config::{self, Config};
use quickchat::engine::NO_MESSAGES;
use quickchat::{Disposition, MessageEngine, MessageRecord, MessageStore};

/// Quickchat — validate, fingerprint and store outbound messages.
#[derive(Parser)]
#[command(name = "quickchat", version, about)]
struct Cli {
    /// Config file (default: ~/.quickchat/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to the configured logs directory.
    #[arg(long, global = true)]
    log_to_file: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Message content shared by `check` and `store`.
#[derive(clap::Args)]
struct Candidate {
    /// Recipient cell number, `+` followed by 7 to 12 digits.
    #[arg(long)]
    to: String,

    /// Message text, at most 250 characters.
    #[arg(long)]
    body: Option<String>,

    /// Sequence number mixed into the hash.
    #[arg(long, default_value_t = 1)]
    seq: u32,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Validate a message and print its hash without committing it.
    Check(Candidate),
    /// Validate a message and append it to the durable store.
    Store(Candidate),
    /// List stored messages and the longest one.
    List,
    /// List stored messages addressed to a recipient.
    Find {
        /// Recipient cell number, matched exactly.
        #[arg(long)]
        to: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_dir()?.join(config::CONFIG_FILE),
    };
    let config = config::load_config_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let _logging_guard = quickchat::logging::init(&config.logging, cli.log_to_file)?;

    let mut engine = MessageEngine::new(MessageStore::new(&config.store.path));

    match cli.command {
        Command::Check(candidate) => handle_check(&mut engine, &candidate),
        Command::Store(candidate) => handle_store(&mut engine, &candidate, &config),
        Command::List => handle_list(&mut engine),
        Command::Find { to } => handle_find(&engine, &to),
    }
}

/// Run both validators and hash the candidate, printing each confirmation.
fn prepare(engine: &mut MessageEngine, candidate: &Candidate) -> anyhow::Result<MessageRecord> {
    let mut record = engine.compose(candidate.seq);
    println!("{}", record.validate_recipient(&candidate.to)?);
    println!("{}", record.validate_body(candidate.body.as_deref())?);
    record.compute_hash();
    Ok(record)
}

fn handle_check(engine: &mut MessageEngine, candidate: &Candidate) -> anyhow::Result<()> {
    let record = prepare(engine, candidate)?;
    println!("Message hash: {}", record.hash().unwrap_or_default());
    Ok(())
}

fn handle_store(
    engine: &mut MessageEngine,
    candidate: &Candidate,
    config: &Config,
) -> anyhow::Result<()> {
    let mut record = prepare(engine, candidate)?;
    let receipt = engine.commit(&mut record, Disposition::Stored);
    if let Some(err) = receipt.persistence_error {
        return Err(err).context("message was not written to the store");
    }
    info!(path = %config.store.path.display(), id = %record.id(), "message stored");
    println!("{}", receipt.confirmation);
    println!("{}", record.details());
    Ok(())
}

fn handle_list(engine: &mut MessageEngine) -> anyhow::Result<()> {
    let summary = engine.load_stored_messages();
    if let Some(err) = summary.error {
        return Err(err).context("failed to load stored messages");
    }
    if summary.skipped > 0 {
        eprintln!("Skipped {} unreadable line(s).", summary.skipped);
    }
    for (index, text) in engine.stored_texts().iter().enumerate() {
        println!("{}. {text}", index.saturating_add(1));
    }
    let longest = engine.longest_message();
    if longest == NO_MESSAGES {
        println!("{NO_MESSAGES}");
    } else {
        println!("Longest message: {longest}");
    }
    Ok(())
}

fn handle_find(engine: &MessageEngine, to: &str) -> anyhow::Result<()> {
    let texts = engine.search_stored_by_recipient(to)?;
    if texts.is_empty() {
        println!("No stored messages for {to}.");
    }
    for text in texts {
        println!("{text}");
    }
    Ok(())
}
