//! Engine event channel.
//!
//! Subscribers register a handler for one [`EventKind`]. Handlers run
//! synchronously on the emitting task after the engine has released its state
//! lock, so a handler may call back into the engine.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use topic_types::{ExtractedTopic, TopicCluster};
use tracing::debug;

/// Kind of event a subscriber listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TopicsExtracted,
    ClusteringComplete,
    TopicsImported,
    CacheCleared,
    Error,
}

impl EventKind {
    /// Stable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TopicsExtracted => "topics_extracted",
            EventKind::ClusteringComplete => "clustering_complete",
            EventKind::TopicsImported => "topics_imported",
            EventKind::CacheCleared => "cache_cleared",
            EventKind::Error => "error",
        }
    }

    /// Parse a kind from its name, accepting snake_case or camelCase.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "topicsextracted" => Some(EventKind::TopicsExtracted),
            "clusteringcomplete" => Some(EventKind::ClusteringComplete),
            "topicsimported" => Some(EventKind::TopicsImported),
            "cachecleared" => Some(EventKind::CacheCleared),
            "error" => Some(EventKind::Error),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicEvent {
    /// Topics were extracted for a document.
    TopicsExtracted {
        document_id: String,
        topics: Vec<ExtractedTopic>,
    },
    /// A batch finished and clusters were rebuilt.
    ClusteringComplete { clusters: Vec<TopicCluster> },
    /// A snapshot was imported.
    TopicsImported { timestamp: DateTime<Utc> },
    /// All engine state was cleared.
    CacheCleared,
    /// A recoverable failure.
    Error {
        message: String,
        document_id: Option<String>,
    },
}

impl TopicEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            TopicEvent::TopicsExtracted { .. } => EventKind::TopicsExtracted,
            TopicEvent::ClusteringComplete { .. } => EventKind::ClusteringComplete,
            TopicEvent::TopicsImported { .. } => EventKind::TopicsImported,
            TopicEvent::CacheCleared => EventKind::CacheCleared,
            TopicEvent::Error { .. } => EventKind::Error,
        }
    }
}

/// Event handler callback.
pub type EventHandler = Arc<dyn Fn(&TopicEvent) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: EventHandler,
}

/// Publish/subscribe channel for engine events.
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a handler for one kind of event.
    pub fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber { id, kind, handler });
        debug!(kind = %kind, "Added event subscriber");
        id
    }

    /// Remove a handler. Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Deliver an event to every subscriber of its kind.
    pub fn emit(&self, event: &TopicEvent) {
        let kind = event.kind();
        // Snapshot handlers so they can subscribe or unsubscribe while running.
        let handlers: Vec<EventHandler> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
