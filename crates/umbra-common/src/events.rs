use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::TabId;

/// Lifecycle notifications published by the background engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A propagate cycle swapped in a new injected script.
    InjectionInstalled { seq: u64 },
    /// A propagate cycle gave up; the previous script stays active.
    PropagateFailed { seq: u64, reason: String },
    TabOverrideChanged(TabId),
    PrivateOverrideChanged(String),
    PrivateOverridesCleared,
    Shutdown,
    #[serde(other)]
    Unknown,
}

/// Fan-out of [`Event`]s to any number of observers. Publishing never
/// blocks; slow receivers see `Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Returns how many receivers saw the event.
    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
