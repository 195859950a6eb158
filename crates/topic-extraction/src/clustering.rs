//! Topic clustering.
//!
//! Topics are linked when their terms are lexically similar, or when they
//! share a category and appear in overlapping document sets. Connected
//! components of that graph become clusters, so each candidate topic lands
//! in exactly one cluster.

use std::collections::{BTreeMap, BTreeSet};

use topic_types::{Category, ClusterMetadata, Document, DocumentType, ExtractedTopic, TopicCluster};
use tracing::{debug, instrument};
use ulid::Ulid;

use crate::config::ClusteringConfig;

/// Similarity given to a term contained in another.
const SUBSTRING_SIMILARITY: f64 = 0.7;

/// Shortest term that may match as a substring of another.
const MIN_SUBSTRING_LEN: usize = 4;

/// Builds topic clusters from the current topic index.
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    config: ClusteringConfig,
}

impl ClusterBuilder {
    /// Create a cluster builder.
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Group topics into clusters.
    ///
    /// `lookup` resolves document ids for cluster metadata; unknown ids are
    /// skipped. Clusters are ordered by confidence (highest first), then name.
    #[instrument(skip(self, topics, lookup), fields(topics = topics.len()))]
    pub fn build<'a, F>(&self, topics: &[ExtractedTopic], lookup: F) -> Vec<TopicCluster>
    where
        F: Fn(&str) -> Option<&'a Document>,
    {
        let n = topics.len();
        let mut components = DisjointSet::new(n);

        for i in 0..n {
            for j in (i + 1)..n {
                if self.linked(&topics[i], &topics[j]) {
                    components.union(i, j);
                }
            }
        }

        let mut groups: BTreeMap<usize, Vec<&ExtractedTopic>> = BTreeMap::new();
        for (i, topic) in topics.iter().enumerate() {
            groups.entry(components.find(i)).or_default().push(topic);
        }

        let mut clusters: Vec<TopicCluster> = groups
            .into_values()
            .filter(|members| members.len() >= self.config.min_cluster_size)
            .map(|members| assemble(members, &lookup))
            .collect();

        clusters.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!(clusters = clusters.len(), "Built topic clusters");
        clusters
    }

    fn linked(&self, a: &ExtractedTopic, b: &ExtractedTopic) -> bool {
        if lexical_similarity(&a.term, &b.term) >= self.config.lexical_threshold {
            return true;
        }
        a.category == b.category
            && jaccard(&a.document_ids, &b.document_ids) >= self.config.co_occurrence_threshold
    }
}

impl Default for ClusterBuilder {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}

fn assemble<'a, F>(mut members: Vec<&ExtractedTopic>, lookup: &F) -> TopicCluster
where
    F: Fn(&str) -> Option<&'a Document>,
{
    members.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));

    let document_ids: BTreeSet<String> = members
        .iter()
        .flat_map(|t| t.document_ids.iter().cloned())
        .collect();

    let confidence = members.iter().map(|t| t.score).sum::<f64>() / members.len() as f64;

    TopicCluster {
        id: format!("cluster-{}", Ulid::new()),
        name: cluster_name(&members[0].term),
        member_terms: members.iter().map(|t| t.term.clone()).collect(),
        representative_category: majority_category(&members),
        metadata: cluster_metadata(&document_ids, lookup),
        document_ids,
        confidence,
    }
}

/// Most common category among members; ties go to the higher-precedence category.
fn majority_category(members: &[&ExtractedTopic]) -> Category {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for topic in members {
        *counts.entry(topic.category).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(Category, usize)>, (category, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((category, count)),
        })
        .map(|(category, _)| category)
        .unwrap_or_default()
}

fn cluster_metadata<'a, F>(document_ids: &BTreeSet<String>, lookup: &F) -> ClusterMetadata
where
    F: Fn(&str) -> Option<&'a Document>,
{
    let mut metadata = ClusterMetadata::default();
    for doc in document_ids.iter().filter_map(|id| lookup(id)) {
        let (target, value) = match doc.doc_type {
            DocumentType::JiraTicket => (
                &mut metadata.jira_tickets,
                doc.metadata
                    .get("ticket_id")
                    .or_else(|| doc.metadata.get("ticketId")),
            ),
            DocumentType::ReleaseNote => (&mut metadata.release_notes, Some(&doc.title)),
            DocumentType::SupportNote | DocumentType::TechnicalDoc => {
                (&mut metadata.support_docs, Some(&doc.title))
            }
            _ => continue,
        };
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if !target.contains(value) {
                target.push(value.clone());
            }
        }
    }
    metadata
}

/// Title-case the words of a term.
pub fn cluster_name(term: &str) -> String {
    term.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lexical similarity between two terms.
///
/// 1.0 for identical terms, 0.7 when one contains the other (at least four
/// characters), otherwise the share of common words.
pub fn lexical_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.chars().count() >= MIN_SUBSTRING_LEN && longer.contains(shorter) {
        return SUBSTRING_SIMILARITY;
    }

    let split = |t: &'_ str| -> Vec<String> {
        t.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect()
    };
    let words_a = split(a);
    let words_b = split(b);
    let max_len = words_a.len().max(words_b.len());
    if max_len == 0 {
        return 0.0;
    }
    let common = words_a.iter().filter(|w| words_b.contains(w)).count();
    common as f64 / max_len as f64
}

/// Jaccard similarity of two document sets.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Union-find over topic indices.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
    }
}
