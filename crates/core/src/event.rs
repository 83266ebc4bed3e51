//! Chain event system — decoupled progress reporting.
//!
//! Events are published as the runner moves through a chain. Observers
//! (CLI progress output, logs) can subscribe without coupling to the
//! runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All chain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChainEvent {
    /// A chain run began
    ChainStarted {
        run_id: String,
        protocols: usize,
        timestamp: DateTime<Utc>,
    },

    /// A protocol was skipped (inclusion flag off)
    StepSkipped {
        protocol: String,
        timestamp: DateTime<Utc>,
    },

    /// A protocol completed and its output was appended to working memory
    StepCompleted {
        protocol: String,
        tokens_used: Option<u32>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A protocol failed; the chain continues
    StepFailed {
        protocol: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// The chain finished; all protocols were attempted
    ChainFinished {
        run_id: String,
        completed: usize,
        failed: usize,
        skipped: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for chain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<ChainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: ChainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(ChainEvent::StepCompleted {
            protocol: "Extract".into(),
            tokens_used: Some(42),
            duration_ms: 120,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            ChainEvent::StepCompleted {
                protocol,
                tokens_used,
                ..
            } => {
                assert_eq!(protocol, "Extract");
                assert_eq!(*tokens_used, Some(42));
            }
            _ => panic!("Expected StepCompleted event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(ChainEvent::StepFailed {
            protocol: "Atomize".into(),
            error_message: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
