//! Per-aggregate event outbox.

use crate::bus::EventBus;
use crate::event::Event;

/// Accumulates domain events recorded by an aggregate until the caller drains
/// them after a successful transactional boundary.
///
/// Draining is an explicit take-and-clear: events not drained before the
/// aggregate is discarded are lost, which is acceptable — the aggregate state,
/// not the outbox, is the system of record.
#[derive(Debug, Clone, Default)]
pub struct EventOutbox<E> {
    pending: Vec<E>,
}

impl<E> EventOutbox<E> {
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Append an event. Called by aggregate mutation methods only.
    pub fn record(&mut self, event: E) {
        self.pending.push(event);
    }

    /// Read-only view of the pending events.
    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take all pending events, leaving the outbox empty.
    pub fn drain(&mut self) -> Vec<E> {
        core::mem::take(&mut self.pending)
    }
}

impl<E: Event> EventOutbox<E> {
    /// Publish every pending event to the bus, then clear the outbox.
    ///
    /// On a publish failure the outbox keeps **all** its events (including
    /// any already handed to the bus): delivery is at-least-once and
    /// subscribers are idempotent, so the caller simply retries the whole
    /// batch. Returns the number of events published.
    pub fn publish_to<B>(&mut self, bus: &B) -> Result<usize, B::Error>
    where
        B: EventBus<E>,
    {
        for event in &self.pending {
            bus.publish(event.clone())?;
        }
        let published = self.pending.len();
        self.pending.clear();
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory_bus::InMemoryEventBus;
    use chrono::{DateTime, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct NumberIssued {
        number: String,
        occurred_at: DateTime<Utc>,
    }

    impl Event for NumberIssued {
        fn event_type(&self) -> &'static str {
            "invoicing.sequence.number_issued"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.occurred_at
        }
    }

    fn issued(number: &str) -> NumberIssued {
        NumberIssued {
            number: number.to_string(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn drain_takes_and_clears() {
        let mut outbox = EventOutbox::new();
        outbox.record(issued("RE-2026-00001"));
        outbox.record(issued("RE-2026-00002"));
        assert_eq!(outbox.len(), 2);

        let drained = outbox.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].number, "RE-2026-00001");
        assert!(outbox.is_empty());
        assert!(outbox.drain().is_empty());
    }

    #[test]
    fn pending_is_a_read_only_view() {
        let mut outbox = EventOutbox::new();
        outbox.record(issued("RE-2026-00001"));
        assert_eq!(outbox.pending().len(), 1);
        assert_eq!(outbox.len(), 1);
    }

    #[test]
    fn publish_to_hands_every_pending_event_to_the_bus_and_clears() {
        let bus = InMemoryEventBus::new();
        let subscription = bus.subscribe();

        let mut outbox = EventOutbox::new();
        outbox.record(issued("RE-2026-00001"));
        outbox.record(issued("RE-2026-00002"));

        let published = outbox.publish_to(&bus).unwrap();
        assert_eq!(published, 2);
        assert!(outbox.is_empty());

        assert_eq!(subscription.try_recv().unwrap().number, "RE-2026-00001");
        assert_eq!(subscription.try_recv().unwrap().number, "RE-2026-00002");
        assert!(subscription.try_recv().is_err());
    }
}
