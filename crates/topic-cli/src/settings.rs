//! Settings loading for the topic extraction CLI.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file is ~/.config/topic-extraction/config.toml.

use config::{Config, ConfigError, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use topic_extraction::TopicsConfig;

const APP_NAME: &str = "topic-extraction";

/// Main CLI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Snapshot loaded before and saved after each command
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Engine configuration
    #[serde(default)]
    pub topics: TopicsConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            snapshot_path: None,
            topics: TopicsConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from every source.
    ///
    /// Environment variables use the `TOPICS_` prefix and `__` between
    /// nested keys, e.g. `TOPICS_LOG_LEVEL` or
    /// `TOPICS_TOPICS__EXTRACTION__MAX_TERMS`.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())?
            .add_source(File::with_name(&default_config_path().to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TOPICS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Snapshot path with a leading `~/` expanded.
    pub fn expanded_snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot_path.as_deref().map(expand_home)
    }
}

/// Location of the per-user config file (extension resolved by the loader).
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.config_dir().join("config"))
        .unwrap_or_else(|| PathBuf::from("config"))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
