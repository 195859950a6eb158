//! TF-IDF (Term Frequency - Inverse Document Frequency) implementation.
//!
//! Corpus statistics are cumulative: every indexed document updates the
//! per-term document sets, and IDF is always computed against the corpus seen
//! so far.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Cumulative corpus statistics for TF-IDF scoring.
///
/// Tracks which documents contain each term and how many documents have
/// been indexed.
#[derive(Debug, Clone, Default)]
pub struct TfIdf {
    /// Term -> ids of documents containing the term
    term_documents: HashMap<String, BTreeSet<String>>,
    /// Number of indexed documents
    doc_count: usize,
}

impl TfIdf {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document and the distinct terms it produced.
    pub fn add_document<'a>(&mut self, doc_id: &str, terms: impl IntoIterator<Item = &'a String>) {
        self.doc_count += 1;
        for term in terms {
            self.term_documents
                .entry(term.clone())
                .or_default()
                .insert(doc_id.to_string());
        }
    }

    /// Retract a previously recorded document.
    pub fn remove_document<'a>(
        &mut self,
        doc_id: &str,
        terms: impl IntoIterator<Item = &'a String>,
    ) {
        self.doc_count = self.doc_count.saturating_sub(1);
        for term in terms {
            if let Some(docs) = self.term_documents.get_mut(term) {
                docs.remove(doc_id);
                if docs.is_empty() {
                    self.term_documents.remove(term);
                }
            }
        }
    }

    /// Ids of documents containing the term.
    pub fn documents_for(&self, term: &str) -> Option<&BTreeSet<String>> {
        self.term_documents.get(term)
    }

    /// Number of documents containing the term.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.term_documents.get(term).map_or(0, BTreeSet::len)
    }

    /// Calculate inverse document frequency.
    ///
    /// Uses smoothed IDF: ln((N + 1) / (df + 1)) + 1, with N and df floored
    /// at 1. The result is always >= 1 for df <= N, equals 1 for a
    /// single-document corpus, and strictly decreases as df grows.
    pub fn inverse_document_frequency(&self, term: &str) -> f64 {
        let n = self.doc_count.max(1) as f64;
        let df = self.document_frequency(term).max(1) as f64;
        (((n + 1.0) / (df + 1.0)).ln() + 1.0).max(0.0)
    }

    /// Calculate TF-IDF score for a term given its normalized in-document frequency.
    pub fn score(&self, term: &str, term_frequency: f64) -> f64 {
        (term_frequency * self.inverse_document_frequency(term)).max(0.0)
    }

    /// Calculate normalized term frequencies for one document.
    ///
    /// Each count is divided by the count of the most frequent term, so the
    /// top term has frequency 1.0 regardless of document length.
    pub fn term_frequencies(terms: &[String]) -> BTreeMap<String, f64> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for term in terms {
            *counts.entry(term.clone()).or_insert(0) += 1;
        }

        let max = counts.values().copied().max().unwrap_or(0);
        if max == 0 {
            return BTreeMap::new();
        }

        counts
            .into_iter()
            .map(|(term, count)| (term, count as f64 / max as f64))
            .collect()
    }

    /// Get document count.
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// Get unique term count.
    pub fn term_count(&self) -> usize {
        self.term_documents.len()
    }
}
