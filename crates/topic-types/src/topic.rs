//! Topic and cluster data types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to every topic.
///
/// Variants are declared in precedence order: when a term matches the
/// keyword tables of several categories, the earliest one wins.
/// `Technical` is the fallback and never matched by keyword.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Errors, failures, bugs
    Error,
    /// APIs, endpoints, third-party integration
    Integration,
    /// Speed, latency, optimization
    Performance,
    /// Authentication, authorization, permissions
    Security,
    /// Features and enhancements
    Feature,
    /// Workflows and procedures
    Process,
    /// Default when nothing else matches
    #[default]
    Technical,
}

impl Category {
    /// All categories in precedence order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Error,
            Category::Integration,
            Category::Performance,
            Category::Security,
            Category::Feature,
            Category::Process,
            Category::Technical,
        ]
    }

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Error => "error",
            Category::Integration => "integration",
            Category::Performance => "performance",
            Category::Security => "security",
            Category::Feature => "feature",
            Category::Process => "process",
            Category::Technical => "technical",
        }
    }

    /// Parse from wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a topic's prevalence over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// More prevalent in recent documents than in the baseline
    Rising,
    /// No clear change, or not enough time spread to tell
    #[default]
    Stable,
    /// Less prevalent in recent documents than in the baseline
    Declining,
}

/// A scored, categorized term.
///
/// One logical record exists per distinct term. When returned for a specific
/// document, `score` and `frequency` are that document's values while
/// `document_ids` covers every document that produced the term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTopic {
    /// Lowercase term; n-grams are space-joined
    pub term: String,
    /// Domain-boosted TF-IDF score (always >= 0)
    pub score: f64,
    /// Term frequency normalized by the most frequent term of the document
    #[serde(default)]
    pub frequency: f64,
    /// Assigned category
    pub category: Category,
    /// Terms that co-occur in the same documents
    #[serde(default)]
    pub related_terms: Vec<String>,
    /// Every document whose content produced this term
    pub document_ids: BTreeSet<String>,
    /// Earliest timestamp of a contributing document
    pub first_seen_at: DateTime<Utc>,
    /// Latest timestamp of a contributing document
    pub last_seen_at: DateTime<Utc>,
    /// Prevalence direction
    #[serde(default)]
    pub trend: Trend,
}

impl ExtractedTopic {
    /// Check whether the given document contributed this topic.
    pub fn has_document(&self, document_id: &str) -> bool {
        self.document_ids.contains(document_id)
    }

    /// Check whether the term is a multi-word n-gram.
    pub fn is_ngram(&self) -> bool {
        self.term.contains(' ')
    }
}

/// Provenance gathered from the documents behind a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMetadata {
    /// Ticket ids from Jira documents (`ticket_id` metadata)
    #[serde(default)]
    pub jira_tickets: Vec<String>,
    /// Titles of release notes
    #[serde(default)]
    pub release_notes: Vec<String>,
    /// Titles of support notes and technical docs
    #[serde(default)]
    pub support_docs: Vec<String>,
}

impl ClusterMetadata {
    /// Check whether no provenance was collected.
    pub fn is_empty(&self) -> bool {
        self.jira_tickets.is_empty() && self.release_notes.is_empty() && self.support_docs.is_empty()
    }
}

/// A group of related topics formed after batch processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCluster {
    /// Unique identifier (`cluster-` + ULID)
    pub id: String,
    /// Human-readable name derived from the top-scoring member
    pub name: String,
    /// Terms in this cluster
    pub member_terms: BTreeSet<String>,
    /// Majority category of the members
    pub representative_category: Category,
    /// Union of the members' document ids
    pub document_ids: BTreeSet<String>,
    /// Mean member score
    pub confidence: f64,
    /// Provenance from contributing documents
    #[serde(default)]
    pub metadata: ClusterMetadata,
}

impl TopicCluster {
    /// Number of documents contributing to this cluster.
    pub fn document_count(&self) -> usize {
        self.document_ids.len()
    }
}
