//! Recency-based trend detection.
//!
//! The newest document timestamp is the reference point, so results depend
//! only on the corpus and never on the wall clock. The corpus time span is
//! split into a recent window and a baseline; a term's trend compares the
//! share of documents containing it in each window.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, Utc};
use topic_types::Trend;

use crate::config::TrendConfig;

/// Splits the corpus timeline into recent and baseline windows.
#[derive(Debug, Clone)]
pub struct TrendTracker {
    config: TrendConfig,
}

impl TrendTracker {
    /// Create a tracker with the given configuration.
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Compute the windows for a set of (document id, timestamp) pairs.
    pub fn windows<'a>(
        &self,
        documents: impl IntoIterator<Item = (&'a str, DateTime<Utc>)>,
    ) -> TrendWindows {
        let documents: Vec<(&str, DateTime<Utc>)> = documents.into_iter().collect();

        let (Some(oldest), Some(newest)) = (
            documents.iter().map(|(_, ts)| *ts).min(),
            documents.iter().map(|(_, ts)| *ts).max(),
        ) else {
            return TrendWindows::inactive(self.config.clone());
        };

        let span = newest.signed_duration_since(oldest);
        if span.num_seconds() < self.config.min_span_secs.max(0) || span <= Duration::zero() {
            return TrendWindows::inactive(self.config.clone());
        }

        let recent_ms = (span.num_milliseconds() as f64 * self.config.recent_window_fraction) as i64;
        let cutoff = newest - Duration::milliseconds(recent_ms);

        let (recent, baseline): (Vec<_>, Vec<_>) =
            documents.iter().partition(|(_, ts)| *ts >= cutoff);
        let to_ids = |window: Vec<&(&str, DateTime<Utc>)>| -> HashSet<String> {
            window.into_iter().map(|(id, _)| id.to_string()).collect()
        };
        let recent = to_ids(recent);
        let baseline = to_ids(baseline);

        TrendWindows {
            config: self.config.clone(),
            cutoff: Some(cutoff),
            recent_count: recent.len(),
            baseline_count: baseline.len(),
            recent,
            baseline,
        }
    }
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

/// Recent/baseline split of the corpus.
#[derive(Debug, Clone)]
pub struct TrendWindows {
    config: TrendConfig,
    cutoff: Option<DateTime<Utc>>,
    recent: HashSet<String>,
    baseline: HashSet<String>,
    recent_count: usize,
    baseline_count: usize,
}

impl TrendWindows {
    fn inactive(config: TrendConfig) -> Self {
        Self {
            config,
            cutoff: None,
            recent: HashSet::new(),
            baseline: HashSet::new(),
            recent_count: 0,
            baseline_count: 0,
        }
    }

    /// Whether the corpus spans enough time to tell trends apart.
    pub fn is_active(&self) -> bool {
        self.cutoff.is_some() && self.recent_count > 0 && self.baseline_count > 0
    }

    /// Start of the recent window.
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.cutoff
    }

    /// Fractions of recent and baseline documents that contain a term.
    ///
    /// Ids outside the windowed documents are ignored.
    pub fn rates(&self, document_ids: &BTreeSet<String>) -> (f64, f64) {
        if !self.is_active() {
            return (0.0, 0.0);
        }
        let in_recent = document_ids
            .iter()
            .filter(|id| self.recent.contains(id.as_str()))
            .count();
        let in_baseline = document_ids
            .iter()
            .filter(|id| self.baseline.contains(id.as_str()))
            .count();
        (
            in_recent as f64 / self.recent_count as f64,
            in_baseline as f64 / self.baseline_count as f64,
        )
    }

    /// Trend of a term given the documents that contain it.
    pub fn trend_of(&self, document_ids: &BTreeSet<String>) -> Trend {
        if !self.is_active() {
            return Trend::Stable;
        }
        let (recent, baseline) = self.rates(document_ids);
        if recent > 0.0 && recent > baseline * self.config.rising_ratio {
            Trend::Rising
        } else if recent < baseline * self.config.declining_ratio {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    /// Difference between recent and baseline rates.
    pub fn momentum(&self, document_ids: &BTreeSet<String>) -> f64 {
        let (recent, baseline) = self.rates(document_ids);
        recent - baseline
    }
}
