//! CLI argument parsing for topic-extract.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use topic_extraction::ExtractionOptions;

/// Topic extraction over JSON document files
///
/// Engine state can be carried between invocations with --snapshot.
#[derive(Parser, Debug)]
#[command(name = "topic-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/topic-extraction/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Snapshot file loaded before the command and saved after mutating commands
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract topics from each document independently
    Extract {
        /// JSON file with a document or an array of documents
        file: PathBuf,

        #[command(flatten)]
        options: ExtractArgs,
    },

    /// Process documents as a batch and rebuild clusters
    Batch {
        /// JSON file with an array of documents
        file: PathBuf,

        #[command(flatten)]
        options: ExtractArgs,
    },

    /// Search topics by substring
    Search {
        /// Query text
        query: String,

        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Find documents whose topics match a term
    Related {
        /// Term to match
        term: String,

        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List rising topics
    Trending {
        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List clusters from the last batch
    Clusters,

    /// Show the topics of one document
    Show {
        /// Document id
        document_id: String,
    },

    /// Show aggregated topics and index counts
    Topics {
        /// Maximum topics listed
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Write the engine state as a snapshot
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the engine state with a snapshot file
    Import {
        /// Snapshot file to import
        file: PathBuf,
    },

    /// Print the effective settings as TOML
    Config,
}

impl Commands {
    /// Whether the command changes engine state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Commands::Extract { .. } | Commands::Batch { .. } | Commands::Import { .. }
        )
    }
}

/// Per-call extraction options
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Minimum characters for a single-word term
    #[arg(long)]
    pub min_term_length: Option<usize>,

    /// Maximum topics per document
    #[arg(long)]
    pub max_terms: Option<usize>,

    /// Drop topics scoring below this value
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Also extract n-grams of this many words
    #[arg(long, value_name = "SIZE")]
    pub ngrams: Option<usize>,

    /// Extra stop word (repeatable)
    #[arg(long = "stop-word", value_name = "WORD")]
    pub stop_words: Vec<String>,
}

impl ExtractArgs {
    /// Overlay these flags on the configured options.
    pub fn apply(&self, base: &ExtractionOptions) -> ExtractionOptions {
        let mut options = base.clone();
        if let Some(min_term_length) = self.min_term_length {
            options = options.with_min_term_length(min_term_length);
        }
        if let Some(max_terms) = self.max_terms {
            options = options.with_max_terms(max_terms);
        }
        if let Some(min_score) = self.min_score {
            options = options.with_min_score(min_score);
        }
        if let Some(size) = self.ngrams {
            options = options.with_ngrams(size);
        }
        options.with_stop_words(self.stop_words.iter().cloned())
    }
}
