//! Text normalization and candidate term extraction.

use std::collections::HashSet;

use crate::config::ExtractionOptions;
use crate::lexicon::is_stop_word;

/// Split text into lowercase word tokens.
///
/// Every character other than alphanumerics, `-` and `_` separates tokens.
/// Leading and trailing `-`/`_` are trimmed so stray dashes never form tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .map(|s| s.trim_matches(|c| c == '-' || c == '_'))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Tokenize text and produce the candidate terms for scoring.
///
/// Stop words (built-in plus `custom_stop_words`) and purely numeric tokens
/// are dropped first. Single words shorter than `min_term_length` are then
/// skipped; n-grams are windows over the stop-word-filtered stream and are
/// exempt from the length filter.
pub fn extract_terms(text: &str, options: &ExtractionOptions) -> Vec<String> {
    let custom: HashSet<String> = options
        .custom_stop_words
        .iter()
        .map(|w| w.to_lowercase())
        .collect();

    let surviving: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t) && !custom.contains(t))
        .filter(|t| !t.chars().all(|c| c.is_numeric()))
        .collect();

    let mut terms: Vec<String> = surviving
        .iter()
        .filter(|t| t.chars().count() >= options.min_term_length)
        .cloned()
        .collect();

    if options.include_ngrams && options.ngram_size > 1 {
        terms.extend(
            surviving
                .windows(options.ngram_size)
                .map(|window| window.join(" ")),
        );
    }

    terms
}
