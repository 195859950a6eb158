//! topic-extract
//!
//! Runs the topic extraction engine over JSON document files.
//!
//! # Usage
//!
//! ```bash
//! topic-extract --snapshot state.json batch documents.json
//! topic-extract --snapshot state.json search auth --limit 5
//! topic-extract --snapshot state.json trending
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/topic-extraction/config.toml)
//! 3. File given with --config
//! 4. Environment variables (TOPICS_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use topic_cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    run(Cli::parse()).await
}
