//! In-memory domain-event bus for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::bus::{EventBus, Subscription};
use crate::event::Event;

#[derive(Debug)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

/// A subscriber's channel plus the event-type namespace it asked for.
#[derive(Debug)]
struct TopicSubscriber<E> {
    /// `None` means every event; `Some(prefix)` filters on `event_type()`.
    topic_prefix: Option<String>,
    sender: mpsc::Sender<E>,
}

impl<E> TopicSubscriber<E> {
    fn wants(&self, event_type: &str) -> bool {
        match &self.topic_prefix {
            None => true,
            Some(prefix) => event_type.starts_with(prefix.as_str()),
        }
    }
}

/// In-memory pub/sub bus routing on the events' dotted type names.
///
/// - No IO / no async
/// - Best-effort fan-out to every matching subscriber
/// - At-least-once acceptable (subscribers must be idempotent)
#[derive(Debug)]
pub struct InMemoryEventBus<E> {
    subscribers: Mutex<Vec<TopicSubscriber<E>>>,
}

impl<E> InMemoryEventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&self, topic_prefix: Option<String>) -> Subscription<E> {
        let (sender, receiver) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(TopicSubscriber {
                topic_prefix,
                sender,
            });
        }
        Subscription::new(receiver)
    }
}

impl<E> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Event> EventBus<E> for InMemoryEventBus<E> {
    type Error = InMemoryBusError;

    fn publish(&self, event: E) -> Result<(), Self::Error> {
        let event_type = event.event_type();
        tracing::trace!(event_type, "publishing domain event");

        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        // Fan out to matching subscribers, dropping disconnected ones.
        subscribers.retain(|subscriber| {
            if !subscriber.wants(event_type) {
                return true;
            }
            subscriber.sender.send(event.clone()).is_ok()
        });
        Ok(())
    }

    fn subscribe(&self) -> Subscription<E> {
        self.attach(None)
    }

    fn subscribe_to(&self, topic_prefix: &str) -> Subscription<E> {
        self.attach(Some(topic_prefix.to_string()))
    }
}
