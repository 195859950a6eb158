//! Command implementations.
//!
//! Every command loads settings, builds an engine, restores the snapshot if
//! one is configured, runs, and prints JSON to stdout. Logs go to stderr so
//! the output stays machine-readable.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{debug, info, warn};

use topic_extraction::{ExtractionOptions, TopicExtractor};
use topic_types::{Document, ExtractedTopic};

use crate::cli::{Cli, Commands, ExtractArgs};
use crate::settings::Settings;

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = cli.log_level.as_deref() {
        settings.log_level = log_level.to_string();
    }
    if let Some(snapshot) = cli.snapshot.as_deref() {
        settings.snapshot_path = Some(snapshot.to_string_lossy().to_string());
    }

    init_logging(&settings.log_level)?;
    debug!(log_level = %settings.log_level, snapshot = ?settings.snapshot_path, "Configuration loaded");

    let snapshot_path = settings.expanded_snapshot_path();
    let restore_from = match cli.command {
        Commands::Config => None,
        _ => snapshot_path.as_deref(),
    };
    let engine = build_engine(&settings, restore_from).await?;
    let defaults = settings.topics.extraction.clone();

    let output = match &cli.command {
        Commands::Extract { file, options } => {
            handle_extract(&engine, file, options, &defaults).await?
        }
        Commands::Batch { file, options } => handle_batch(&engine, file, options, &defaults).await?,
        Commands::Search { query, limit } => {
            to_json(&engine.search_topics(query, *limit).await)?
        }
        Commands::Related { term, limit } => {
            to_json(&engine.find_related_documents(term, *limit).await)?
        }
        Commands::Trending { limit } => to_json(&engine.get_trending_topics(*limit).await)?,
        Commands::Clusters => to_json(&engine.get_clusters().await)?,
        Commands::Show { document_id } => to_json(&engine.get_document_topics(document_id).await)?,
        Commands::Topics { limit } => handle_topics(&engine, *limit).await?,
        Commands::Export { output } => {
            let json = engine.export_topics().await?;
            match output {
                Some(path) => {
                    write_file(path, &json)?;
                    info!(path = %path.display(), "Exported snapshot");
                    String::new()
                }
                None => json,
            }
        }
        Commands::Import { file } => handle_import(&engine, file).await?,
        Commands::Config => render_settings(&settings)?,
    };

    if cli.command.is_mutating() {
        match snapshot_path.as_deref() {
            Some(path) => save_snapshot(&engine, path).await?,
            None => warn!("No snapshot configured; results are not persisted"),
        }
    }

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. A subscriber that
/// is already installed is kept.
pub fn init_logging(log_level: &str) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Create an engine and restore the snapshot when the file exists.
pub async fn build_engine(settings: &Settings, snapshot: Option<&Path>) -> Result<TopicExtractor> {
    let engine =
        TopicExtractor::with_config(settings.topics.clone()).context("Invalid topics configuration")?;

    if let Some(path) = snapshot {
        if path.exists() {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
            if !engine.import_topics(&json).await {
                bail!("Snapshot {} could not be imported", path.display());
            }
            info!(path = %path.display(), "Restored snapshot");
        } else {
            debug!(path = %path.display(), "Snapshot not found, starting empty");
        }
    }
    Ok(engine)
}

/// Write the engine state to a snapshot file.
pub async fn save_snapshot(engine: &TopicExtractor, path: &Path) -> Result<()> {
    let json = engine.export_topics().await?;
    write_file(path, &json)?;
    info!(path = %path.display(), "Saved snapshot");
    Ok(())
}

/// Read a JSON file holding one document or an array of documents.
pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents from {}", path.display()))?;
    if text.trim_start().starts_with('[') {
        Document::list_from_json(&text)
            .with_context(|| format!("Invalid document array in {}", path.display()))
    } else {
        let document: Document = serde_json::from_str(&text)
            .with_context(|| format!("Invalid document in {}", path.display()))?;
        Ok(vec![document])
    }
}

/// Extract topics document by document without clustering.
pub async fn handle_extract(
    engine: &TopicExtractor,
    file: &Path,
    args: &ExtractArgs,
    defaults: &ExtractionOptions,
) -> Result<String> {
    let options = args.apply(defaults);
    let documents = read_documents(file)?;

    let mut results: BTreeMap<String, Vec<ExtractedTopic>> = BTreeMap::new();
    for document in documents {
        let id = document.id.clone();
        let topics = engine
            .process_document_with(document, &options)
            .await
            .with_context(|| format!("Failed to process document {id:?}"))?;
        results.insert(id, topics);
    }
    to_json(&results)
}

/// Process a batch and report its topics and clusters.
pub async fn handle_batch(
    engine: &TopicExtractor,
    file: &Path,
    args: &ExtractArgs,
    defaults: &ExtractionOptions,
) -> Result<String> {
    let options = args.apply(defaults);
    let documents = read_documents(file)?;
    let submitted = documents.len();

    let topics = engine.process_batch_with(documents, &options).await?;
    if topics.len() < submitted {
        warn!(
            submitted,
            processed = topics.len(),
            "Some documents were skipped"
        );
    }
    let clusters = engine.get_clusters().await;
    to_json(&json!({ "topics": topics, "clusters": clusters }))
}

/// Summarize the index with its top aggregated topics.
pub async fn handle_topics(engine: &TopicExtractor, limit: usize) -> Result<String> {
    let stats = engine.stats().await;
    let topics: Vec<ExtractedTopic> = engine.get_topics().await.into_iter().take(limit).collect();
    to_json(&json!({ "stats": stats, "topics": topics }))
}

/// Import a snapshot file into the engine.
pub async fn handle_import(engine: &TopicExtractor, file: &Path) -> Result<String> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read snapshot {}", file.display()))?;
    if !engine.import_topics(&json).await {
        bail!("Snapshot {} could not be imported", file.display());
    }
    to_json(&engine.stats().await)
}

/// Effective settings rendered as TOML.
pub fn render_settings(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to render settings")
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
