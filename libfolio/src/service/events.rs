//! Page lifecycle events
//!
//! An in-process event bus that lets front ends (CLI output, a future UI)
//! observe what the page store does without polling it.
//!
//! The bus uses `tokio::sync::broadcast`. Events emitted while nobody is
//! subscribed are dropped, and a lagging subscriber never blocks the store.
//!
//! # Example
//!
//! ```no_run
//! use libfolio::service::events::{Event, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::PageSaved {
//!     page_id: "page-abc123".to_string(),
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Event bus for distributing page events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers without blocking
    pub fn emit(&self, event: Event) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Events emitted by the page store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The page collection was (re)loaded from its source
    PagesLoaded { count: usize },

    /// A new draft page was added to the collection
    PageCreated { page_id: String, slug: String },

    /// A page was opened for editing
    PageSelected { page_id: String },

    /// A selection or publish request named a page that does not exist
    PageNotFound { page_id: String },

    /// The selected page was written back to the collection
    PageSaved { page_id: String },

    /// A page transitioned to (or was re-stamped as) published
    PagePublished {
        page_id: String,
        published_at: DateTime<Utc>,
    },

    /// A page was removed from the collection
    PageDeleted { page_id: String },
}

impl Event {
    /// Id of the page this event concerns, if any
    pub fn page_id(&self) -> Option<&str> {
        match self {
            Event::PagesLoaded { .. } => None,
            Event::PageCreated { page_id, .. }
            | Event::PageSelected { page_id }
            | Event::PageNotFound { page_id }
            | Event::PageSaved { page_id }
            | Event::PagePublished { page_id, .. }
            | Event::PageDeleted { page_id } => Some(page_id),
        }
    }
}
