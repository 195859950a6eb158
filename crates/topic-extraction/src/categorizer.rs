//! Heuristic term categorization.
//!
//! An ordered list of keyword rules is evaluated in category precedence
//! order; the first rule with a matching keyword decides. A rule keyword
//! matches when any word of the term starts with it, so `auth` covers
//! `authentication` and `fail` covers `failures`.

use topic_types::Category;

/// Context terms must reach this many keyword hits before they can decide
/// the category of an otherwise generic term.
const MIN_CONTEXT_HITS: usize = 3;

const RULES: &[(Category, &[&str])] = &[
    (
        Category::Error,
        &["error", "fail", "issue", "bug", "exception", "crash", "fault"],
    ),
    (
        Category::Integration,
        &["api", "endpoint", "integrat", "webhook", "connector", "sync"],
    ),
    (
        Category::Performance,
        &["performance", "speed", "optimi", "latency", "throughput", "slow"],
    ),
    (
        Category::Security,
        &["security", "auth", "permission", "oauth", "credential", "encrypt"],
    ),
    (
        Category::Feature,
        &["feature", "enhancement", "new", "capabilit", "improvement"],
    ),
    (
        Category::Process,
        &["process", "workflow", "procedure", "pipeline", "approval"],
    ),
];

/// Assigns one category per term.
#[derive(Debug, Clone, Copy, Default)]
pub struct Categorizer;

impl Categorizer {
    /// Create a categorizer.
    pub fn new() -> Self {
        Self
    }

    /// Categorize a term using only its own words.
    ///
    /// Returns `None` when no keyword rule matches.
    pub fn match_term(&self, term: &str) -> Option<Category> {
        RULES
            .iter()
            .find(|(_, keywords)| {
                term.split(' ')
                    .any(|word| keywords.iter().any(|k| word.starts_with(k)))
            })
            .map(|(category, _)| *category)
    }

    /// Category that dominates a set of context terms, if any.
    ///
    /// A category dominates when it holds a strict majority of the keyword
    /// hits among the context terms and has at least three hits.
    pub fn context_category<'a>(
        &self,
        context: impl IntoIterator<Item = &'a str>,
    ) -> Option<Category> {
        let mut hits = [0usize; 7];
        for term in context {
            if let Some(category) = self.match_term(term) {
                hits[category as usize] += 1;
            }
        }

        let total: usize = hits.iter().sum();
        // Earliest category wins ties, matching rule precedence.
        let (index, best) = hits
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0), |acc, (i, h)| if h > acc.1 { (i, h) } else { acc });

        if best >= MIN_CONTEXT_HITS && best * 2 > total {
            Category::all().get(index).copied()
        } else {
            None
        }
    }

    /// Categorize a term with a precomputed context category.
    pub fn categorize_with(&self, term: &str, context: Option<Category>) -> Category {
        self.match_term(term)
            .or(context)
            .unwrap_or(Category::Technical)
    }

    /// Categorize a term given the terms of the document it came from.
    pub fn categorize<'a>(
        &self,
        term: &str,
        context: impl IntoIterator<Item = &'a str>,
    ) -> Category {
        match self.match_term(term) {
            Some(category) => category,
            None => self
                .context_category(context)
                .unwrap_or(Category::Technical),
        }
    }
}
