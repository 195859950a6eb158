//! # topic-types
//!
//! Shared domain types for the topic extraction service.
//!
//! This crate defines the data structures exchanged between the engine and
//! its callers:
//! - Documents: Immutable inputs submitted for extraction
//! - Topics: Scored, categorized terms aggregated across documents
//! - Clusters: Groups of related topics built after batch processing
//!
//! ## Usage
//!
//! ```rust
//! use topic_types::{Document, DocumentType};
//!
//! let doc = Document::new("doc-1", "Metadata validation workflow", DocumentType::TechnicalDoc);
//! assert_eq!(doc.id, "doc-1");
//! ```

pub mod document;
pub mod error;
pub mod topic;

pub use document::{Document, DocumentType};
pub use error::TypesError;
pub use topic::{Category, ClusterMetadata, ExtractedTopic, TopicCluster, Trend};
