//! # topic-extraction
//!
//! Lexical topic extraction for a cumulative document corpus.
//!
//! Documents are tokenized, scored with a domain-boosted TF-IDF variant and
//! categorized with keyword rules. The engine keeps a cumulative index so
//! that IDF reflects every document seen so far, groups related topics into
//! clusters after each batch, and tracks which topics are rising over time.
//!
//! ## Features
//! - Smoothed TF-IDF with a configurable domain boost
//! - Ordered keyword rules for seven categories
//! - Union-find clustering over lexical and co-occurrence links
//! - Recency-based trend detection
//! - Substring search and related-document lookup
//! - JSON snapshots for export and import
//! - Event subscriptions for extraction, clustering, import and errors

pub mod categorizer;
pub mod clustering;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod index;
pub mod lexicon;
pub mod search;
pub mod snapshot;
pub mod tfidf;
pub mod tokenizer;
pub mod trends;

pub use categorizer::Categorizer;
pub use clustering::{cluster_name, jaccard, lexical_similarity, ClusterBuilder};
pub use config::{
    ClusteringConfig, ExtractionOptions, RelatedTermsConfig, ScoringConfig, TopicsConfig,
    TrendConfig,
};
pub use engine::TopicExtractor;
pub use error::TopicsError;
pub use events::{EventBus, EventHandler, EventKind, SubscriptionId, TopicEvent};
pub use index::{IndexStats, IndexedDocument, TopicIndex};
pub use lexicon::{is_stop_word, stop_words, DomainLexicon};
pub use search::DEFAULT_SEARCH_LIMIT;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use tfidf::TfIdf;
pub use tokenizer::{extract_terms, tokenize};
pub use trends::{TrendTracker, TrendWindows};

pub use topic_types::{
    Category, ClusterMetadata, Document, DocumentType, ExtractedTopic, TopicCluster, Trend,
};
