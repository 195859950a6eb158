//! Topic extraction configuration.

use serde::{Deserialize, Serialize};

use crate::error::TopicsError;

/// Master configuration for the extraction engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicsConfig {
    /// Default per-call extraction options
    #[serde(default)]
    pub extraction: ExtractionOptions,

    /// Scoring settings
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Related-term detection settings
    #[serde(default)]
    pub related: RelatedTermsConfig,

    /// Clustering settings
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Trend detection settings
    #[serde(default)]
    pub trends: TrendConfig,
}

impl TopicsConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), TopicsError> {
        self.extraction.validate()?;
        self.scoring.validate()?;
        self.related.validate()?;
        self.clustering.validate()?;
        self.trends.validate()
    }
}

/// Per-call extraction options.
///
/// Invalid values are rejected with [`TopicsError::InvalidConfig`] before any
/// state changes; they are never clamped silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Minimum characters for a single-word term
    #[serde(default = "default_min_term_length")]
    pub min_term_length: usize,

    /// Maximum topics returned per document (must be > 0)
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,

    /// Topics scoring below this are not returned
    #[serde(default)]
    pub min_score: f64,

    /// Also emit n-grams as candidate terms
    #[serde(default)]
    pub include_ngrams: bool,

    /// Words per n-gram (must be >= 2 when n-grams are enabled)
    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,

    /// Extra stop words for this call only
    #[serde(default)]
    pub custom_stop_words: Vec<String>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            min_term_length: default_min_term_length(),
            max_terms: default_max_terms(),
            min_score: 0.0,
            include_ngrams: false,
            ngram_size: default_ngram_size(),
            custom_stop_words: Vec::new(),
        }
    }
}

impl ExtractionOptions {
    /// Set the minimum term length.
    pub fn with_min_term_length(mut self, min_term_length: usize) -> Self {
        self.min_term_length = min_term_length;
        self
    }

    /// Set the maximum number of returned topics.
    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    /// Set the minimum returned score.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    /// Enable n-grams of the given size.
    pub fn with_ngrams(mut self, ngram_size: usize) -> Self {
        self.include_ngrams = true;
        self.ngram_size = ngram_size;
        self
    }

    /// Add stop words for this call.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_stop_words
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }

    /// Validate option values.
    pub fn validate(&self) -> Result<(), TopicsError> {
        if self.max_terms == 0 {
            return Err(TopicsError::InvalidConfig(
                "max_terms must be > 0".to_string(),
            ));
        }
        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(TopicsError::InvalidConfig(format!(
                "min_score must be a finite value >= 0, got {}",
                self.min_score
            )));
        }
        if self.include_ngrams && self.ngram_size < 2 {
            return Err(TopicsError::InvalidConfig(format!(
                "ngram_size must be >= 2 when n-grams are enabled, got {}",
                self.ngram_size
            )));
        }
        Ok(())
    }
}

fn default_min_term_length() -> usize {
    3
}
fn default_max_terms() -> usize {
    20
}
fn default_ngram_size() -> usize {
    2
}

/// Scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Multiplier applied to terms containing a domain word
    #[serde(default = "default_domain_boost")]
    pub domain_boost: f64,

    /// Domain words added to the built-in lexicon
    #[serde(default)]
    pub extra_domain_terms: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            domain_boost: default_domain_boost(),
            extra_domain_terms: Vec::new(),
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<(), TopicsError> {
        if !self.domain_boost.is_finite() || self.domain_boost < 1.0 {
            return Err(TopicsError::InvalidConfig(format!(
                "domain_boost must be >= 1.0, got {}",
                self.domain_boost
            )));
        }
        Ok(())
    }
}

fn default_domain_boost() -> f64 {
    1.5
}

/// Related-term detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedTermsConfig {
    /// Document-set Jaccard similarity above which two terms are related
    #[serde(default = "default_related_threshold")]
    pub similarity_threshold: f64,

    /// Maximum related terms attached to a topic
    #[serde(default = "default_max_related")]
    pub max_related: usize,
}

impl Default for RelatedTermsConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_related_threshold(),
            max_related: default_max_related(),
        }
    }
}

impl RelatedTermsConfig {
    fn validate(&self) -> Result<(), TopicsError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(TopicsError::InvalidConfig(format!(
                "related similarity_threshold must be 0.0-1.0, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

fn default_related_threshold() -> f64 {
    0.3
}
fn default_max_related() -> usize {
    5
}

/// Cluster builder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Minimum lexical similarity that links two topics
    #[serde(default = "default_lexical_threshold")]
    pub lexical_threshold: f64,

    /// Minimum document-set Jaccard similarity that links two topics of the same category
    #[serde(default = "default_co_occurrence_threshold")]
    pub co_occurrence_threshold: f64,

    /// Components smaller than this are not reported as clusters
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            lexical_threshold: default_lexical_threshold(),
            co_occurrence_threshold: default_co_occurrence_threshold(),
            min_cluster_size: default_min_cluster_size(),
        }
    }
}

impl ClusteringConfig {
    fn validate(&self) -> Result<(), TopicsError> {
        for (name, value) in [
            ("lexical_threshold", self.lexical_threshold),
            ("co_occurrence_threshold", self.co_occurrence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TopicsError::InvalidConfig(format!(
                    "{name} must be 0.0-1.0, got {value}"
                )));
            }
        }
        if self.min_cluster_size == 0 {
            return Err(TopicsError::InvalidConfig(
                "min_cluster_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_lexical_threshold() -> f64 {
    0.5
}
fn default_co_occurrence_threshold() -> f64 {
    0.5
}
fn default_min_cluster_size() -> usize {
    1
}

/// Trend detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Fraction of the corpus time span (newest first) treated as recent
    #[serde(default = "default_recent_window_fraction")]
    pub recent_window_fraction: f64,

    /// Recent rate must exceed baseline rate times this to be rising
    #[serde(default = "default_rising_ratio")]
    pub rising_ratio: f64,

    /// Recent rate below baseline rate times this is declining
    #[serde(default = "default_declining_ratio")]
    pub declining_ratio: f64,

    /// Corpora spanning less than this many seconds report no trends
    #[serde(default = "default_min_span_secs")]
    pub min_span_secs: i64,

    /// Default number of trending topics returned
    #[serde(default = "default_trending_limit")]
    pub default_limit: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            recent_window_fraction: default_recent_window_fraction(),
            rising_ratio: default_rising_ratio(),
            declining_ratio: default_declining_ratio(),
            min_span_secs: default_min_span_secs(),
            default_limit: default_trending_limit(),
        }
    }
}

impl TrendConfig {
    fn validate(&self) -> Result<(), TopicsError> {
        if !(self.recent_window_fraction > 0.0 && self.recent_window_fraction < 1.0) {
            return Err(TopicsError::InvalidConfig(format!(
                "recent_window_fraction must be between 0 and 1, got {}",
                self.recent_window_fraction
            )));
        }
        if self.declining_ratio > self.rising_ratio {
            return Err(TopicsError::InvalidConfig(
                "declining_ratio must not exceed rising_ratio".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_recent_window_fraction() -> f64 {
    0.5
}
fn default_rising_ratio() -> f64 {
    1.5
}
fn default_declining_ratio() -> f64 {
    0.5
}
fn default_min_span_secs() -> i64 {
    1
}
fn default_trending_limit() -> usize {
    10
}
