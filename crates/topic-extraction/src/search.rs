//! Topic search and related-document lookup.

use std::cmp::Ordering;

use topic_types::ExtractedTopic;

/// Result cap used when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Weight of a match found only through a topic's related terms.
const RELATED_MATCH_WEIGHT: f64 = 0.5;

/// Search topics by case-insensitive substring.
///
/// Direct matches on the term come first, ranked by score. Topics matched
/// only through their related terms follow at half weight. A blank query
/// matches nothing.
pub fn search_topics(topics: &[ExtractedTopic], query: &str, limit: usize) -> Vec<ExtractedTopic> {
    let Some(query) = normalize_query(query) else {
        return Vec::new();
    };

    let mut hits: Vec<(u8, f64, &ExtractedTopic)> = topics
        .iter()
        .filter_map(|topic| {
            if topic.term.contains(&query) {
                Some((0, topic.score, topic))
            } else if topic.related_terms.iter().any(|r| r.contains(&query)) {
                Some((1, topic.score * RELATED_MATCH_WEIGHT, topic))
            } else {
                None
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| b.1.total_cmp(&a.1))
            .then_with(|| a.2.term.cmp(&b.2.term))
    });

    hits.into_iter()
        .take(limit)
        .map(|(_, _, topic)| topic.clone())
        .collect()
}

/// Ids of documents whose own topic list has a term containing the query.
///
/// Documents are ranked by the summed score of their matching topics, ties
/// broken by id.
pub fn related_document_ids<'a, I>(topic_lists: I, query: &str, limit: usize) -> Vec<&'a str>
where
    I: IntoIterator<Item = (&'a String, &'a Vec<ExtractedTopic>)>,
{
    let Some(query) = normalize_query(query) else {
        return Vec::new();
    };

    let mut matches: Vec<(&str, f64)> = topic_lists
        .into_iter()
        .filter_map(|(doc_id, topics)| {
            let scores: Vec<f64> = topics
                .iter()
                .filter(|t| t.term.contains(&query))
                .map(|t| t.score)
                .collect();
            (!scores.is_empty()).then(|| (doc_id.as_str(), scores.iter().sum::<f64>()))
        })
        .collect();

    matches.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });

    matches.into_iter().take(limit).map(|(id, _)| id).collect()
}

fn normalize_query(query: &str) -> Option<String> {
    let query = query.trim().to_lowercase();
    (!query.is_empty()).then_some(query)
}
