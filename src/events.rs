//! Page change notifications for external consumers such as a search indexer.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::types::Page;

pub const PAGE_CREATED: &str = "page.created";
pub const PAGE_UPDATED: &str = "page.updated";
pub const PAGE_DELETED: &str = "page.deleted";

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub channel: &'static str,
    pub payload: Value,
}

impl Event {
    pub fn page_created(page: &Page) -> Self {
        Self::with_page(PAGE_CREATED, page)
    }

    pub fn page_updated(page: &Page) -> Self {
        Self::with_page(PAGE_UPDATED, page)
    }

    /// Deletions carry only the page id.
    pub fn page_deleted(page_id: i64) -> Self {
        Self {
            channel: PAGE_DELETED,
            payload: Value::from(page_id),
        }
    }

    fn with_page(channel: &'static str, page: &Page) -> Self {
        let payload = serde_json::to_value(page).unwrap_or_else(|e| {
            tracing::warn!("Failed to encode page {} for {channel}: {e}", page.id);
            Value::from(page.id)
        });
        Self { channel, payload }
    }
}

/// Publishing never fails the caller; delivery is best effort.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: Event);
}

#[derive(Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Event>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, event: Event) {
        let channel = event.channel;
        // An error only means nobody is subscribed.
        if self.tx.send(event).is_err() {
            tracing::debug!("No subscribers for {channel}");
        }
    }
}
