//! goi-sync - Vocabulary card sync tool
//!
//! Merges dictionary-scraper entries with the curated vocabulary deck and
//! the embedded reference tables, canonicalizes each glossary, and
//! upserts the assembled notes into the card store over AnkiConnect.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use goi_common::anki::AnkiClient;
use goi_common::config::GoiConfig;
use goi_sync::jisho::JishoClient;
use goi_sync::kanji::KanjiBank;
use goi_sync::model;
use goi_sync::note::{assemble_note, upsert_note, UpsertOutcome};
use goi_sync::sources::{ScraperEntry, SourceDecks};
use goi_sync::tags::TagRegistry;

/// Command-line arguments for goi-sync
#[derive(Parser, Debug)]
#[command(name = "goi-sync")]
#[command(about = "Sync dictionary lookup entries into a flashcard deck")]
#[command(version)]
struct Args {
    /// Path to the config file
    #[arg(short, long, env = "GOI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the sync deck and its note model in the card store
    Init,
    /// Synchronize scraper-deck entries into the sync deck
    Sync {
        /// Only sync entries for this word
        #[arg(long)]
        word: Option<String>,
        /// Only sync entries with this exact reading
        #[arg(long)]
        reading: Option<String>,
        /// Only sync entries not synchronized before
        #[arg(long)]
        only_new: bool,
    },
    /// Look up a word in the dictionary API and print the entries as JSON
    Lookup {
        word: String,
        /// Keep only entries with this exact reading
        #[arg(long)]
        reading: Option<String>,
        /// Keep only entries spelling the word exactly
        #[arg(long)]
        exact: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goi_sync=info,goi_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = GoiConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    match args.command {
        Command::Init => run_init(&config).await,
        Command::Sync {
            word,
            reading,
            only_new,
        } => run_sync(&config, word.as_deref(), reading.as_deref(), only_new).await,
        Command::Lookup {
            word,
            reading,
            exact,
        } => run_lookup(&word, reading.as_deref(), exact).await,
    }
}

async fn run_init(config: &GoiConfig) -> Result<()> {
    let client = AnkiClient::new(&config.endpoint, config.rate_limit_ms)
        .context("Failed to create card store client")?;

    model::init_model(&client, &config.main_deck)
        .await
        .context("Failed to initialize deck and model")?;

    Ok(())
}

async fn run_sync(
    config: &GoiConfig,
    word: Option<&str>,
    reading: Option<&str>,
    only_new: bool,
) -> Result<()> {
    let client = AnkiClient::new(&config.endpoint, config.rate_limit_ms)
        .context("Failed to create card store client")?;
    let registry = TagRegistry::shared();
    let bank = KanjiBank::load(&config.data_dir.join("kanji"));
    if bank.is_empty() {
        warn!("kanji bank is empty, kanji breakdowns will be blank");
    }

    let sources = SourceDecks::new(&client, config);
    let entries = sources
        .scraper_entries(word, reading, only_new)
        .await
        .context("Failed to read the scraper deck")?;
    info!(count = entries.len(), deck = %config.scraper_deck, "Scraper entries loaded");

    let mut added = 0usize;
    let mut updated = 0usize;
    let mut failed = 0usize;

    for entry in &entries {
        match sync_entry(&client, config, &sources, registry, &bank, entry).await {
            Ok(UpsertOutcome::Added(_)) => added += 1,
            Ok(UpsertOutcome::Updated(_)) => updated += 1,
            Ok(UpsertOutcome::Skipped) => failed += 1,
            // one entry's failure never aborts the rest of the batch
            Err(e) => {
                tracing::error!(key = %entry.key, error = %e, "Entry failed, continuing");
                failed += 1;
            }
        }
    }

    info!(added, updated, failed, "Sync finished");
    Ok(())
}

async fn sync_entry(
    client: &AnkiClient,
    config: &GoiConfig,
    sources: &SourceDecks<'_>,
    registry: &TagRegistry,
    bank: &KanjiBank,
    entry: &ScraperEntry,
) -> goi_common::Result<UpsertOutcome> {
    let curated = sources
        .curated_entries(&entry.word, Some(&entry.reading))
        .await?;
    let fields = assemble_note(entry, curated.first(), registry, bank);
    upsert_note(client, &config.main_deck, &fields).await
}

async fn run_lookup(word: &str, reading: Option<&str>, exact: bool) -> Result<()> {
    let client = JishoClient::new().context("Failed to create dictionary API client")?;
    let entries = client
        .lookup(word, reading, exact)
        .await
        .context("Dictionary lookup failed")?;

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
