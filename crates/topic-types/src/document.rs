//! Document type for topic extraction.
//!
//! Documents are immutable inputs: crawled pages, ticket text, chat logs,
//! release notes. The engine keeps its own copy and never mutates the
//! caller's value.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::TypesError;

/// Kind of content a document carries.
///
/// Passthrough tag: extraction never branches on it. Cluster metadata uses
/// it to group ticket ids and document titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Technical documentation
    #[default]
    TechnicalDoc,
    /// Support notes and troubleshooting guides
    SupportNote,
    /// Release notes
    ReleaseNote,
    /// Jira ticket or issue
    JiraTicket,
    /// Chat conversation message
    ChatMessage,
    /// Document uploaded by a user
    UserUpload,
    /// Workflow or procedure description
    WorkflowDoc,
}

impl DocumentType {
    /// Wire name of the document type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::TechnicalDoc => "technical_doc",
            DocumentType::SupportNote => "support_note",
            DocumentType::ReleaseNote => "release_note",
            DocumentType::JiraTicket => "jira_ticket",
            DocumentType::ChatMessage => "chat_message",
            DocumentType::UserUpload => "user_upload",
            DocumentType::WorkflowDoc => "workflow_doc",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document submitted for topic extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-assigned unique identifier
    pub id: String,

    /// Raw text content
    pub content: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Kind of content
    #[serde(rename = "type", default)]
    pub doc_type: DocumentType,

    /// Source timestamp (when the content was authored, not when processed)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Where the document came from
    #[serde(default)]
    pub source: String,

    /// Additional metadata (ticket ids, release versions, etc.)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document timestamped now with an empty title and source.
    ///
    /// Timestamps are kept at millisecond precision, the precision of the
    /// serialized form.
    pub fn new(id: impl Into<String>, content: impl Into<String>, doc_type: DocumentType) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            title: String::new(),
            doc_type,
            timestamp: Utc::now().trunc_subsecs(3),
            source: String::new(),
            metadata: HashMap::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the source timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp.trunc_subsecs(3);
        self
    }

    /// Set the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check that the document can be indexed.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.id.trim().is_empty() {
            return Err(TypesError::InvalidInput(
                "Document id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a JSON array of documents.
    pub fn list_from_json(json: &str) -> Result<Vec<Document>, TypesError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get timestamp as milliseconds since Unix epoch
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
