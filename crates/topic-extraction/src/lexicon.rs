//! Fixed word lists consulted by tokenization and scoring.
//!
//! - Stop words: function words that never become topics
//! - Domain terms: asset-management vocabulary whose topics get a score boost

use std::collections::HashSet;

use crate::config::ScoringConfig;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else",
    "every", "few", "for", "from", "had", "has", "have", "he", "her", "here", "him", "his", "how",
    "i", "if", "in", "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more",
    "most", "must", "my", "myself", "no", "nor", "not", "now", "of", "on", "once", "only", "or",
    "other", "our", "out", "over", "own", "same", "shall", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "very", "was", "way", "we", "were",
    "what", "when", "where", "which", "while", "who", "why", "will", "with", "would", "you",
    "your",
];

const DOMAIN_TERMS: &[&str] = &[
    "aoma",
    "asset",
    "offering",
    "audio",
    "submission",
    "aspera",
    "glacier",
    "s3",
    "aws",
    "carma",
    "jira",
    "workflow",
    "ingestion",
    "archive",
    "metadata",
    "validation",
    "error",
    "deployment",
    "lambda",
    "api",
    "endpoint",
    "authentication",
    "authorization",
];

/// Check if a word is a built-in stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Built-in stop words, sorted.
pub fn stop_words() -> &'static [&'static str] {
    STOP_WORDS
}

/// Domain vocabulary with its score multiplier.
#[derive(Debug, Clone)]
pub struct DomainLexicon {
    terms: HashSet<String>,
    boost: f64,
}

impl DomainLexicon {
    /// Build the lexicon from the built-in list plus configured extras.
    pub fn new(config: &ScoringConfig) -> Self {
        let terms = DOMAIN_TERMS
            .iter()
            .map(|t| t.to_string())
            .chain(config.extra_domain_terms.iter().map(|t| t.to_lowercase()))
            .collect();
        Self {
            terms,
            boost: config.domain_boost,
        }
    }

    /// Check whether the term contains a domain word.
    ///
    /// The term is split on spaces, `-` and `_`; a piece matches when it is a
    /// domain word or starts with one, so "assets" and "aoma-workflow" match.
    pub fn is_domain_term(&self, term: &str) -> bool {
        term.split(|c: char| c == ' ' || c == '-' || c == '_')
            .filter(|piece| !piece.is_empty())
            .any(|piece| {
                self.terms.contains(piece)
                    || self.terms.iter().any(|word| piece.starts_with(word.as_str()))
            })
    }

    /// Score multiplier for a term (1.0 when not a domain term).
    pub fn boost_for(&self, term: &str) -> f64 {
        if self.is_domain_term(term) {
            self.boost
        } else {
            1.0
        }
    }
}

impl Default for DomainLexicon {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted_for_binary_search() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn test_is_stop_word() {
        for word in ["the", "is", "and", "has", "been", "this", "way", "we", "do"] {
            assert!(is_stop_word(word), "{word} should be a stop word");
        }
        assert!(!is_stop_word("metadata"));
        assert!(!is_stop_word("workflow"));
    }

    #[test]
    fn test_domain_boost() {
        let lexicon = DomainLexicon::default();
        assert!((lexicon.boost_for("aoma") - 1.5).abs() < f64::EPSILON);
        assert!((lexicon.boost_for("metadata validation") - 1.5).abs() < f64::EPSILON);
        assert!((lexicon.boost_for("banana") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_domain_term_inflections_and_compounds() {
        let lexicon = DomainLexicon::default();
        assert!(lexicon.is_domain_term("assets"));
        assert!(lexicon.is_domain_term("submissions"));
        assert!(lexicon.is_domain_term("aoma-workflow"));
        assert!(lexicon.is_domain_term("glacier_restore"));
        assert!(!lexicon.is_domain_term("banana"));
        assert!(!lexicon.is_domain_term("elephant-tusk"));
        assert!(!lexicon.is_domain_term("--"));
    }

    #[test]
    fn test_extra_domain_terms() {
        let config = ScoringConfig {
            domain_boost: 2.0,
            extra_domain_terms: vec!["Royalty".to_string()],
        };
        let lexicon = DomainLexicon::new(&config);
        assert!(lexicon.is_domain_term("royalty"));
        assert!((lexicon.boost_for("royalty tracking") - 2.0).abs() < f64::EPSILON);
    }
}
