//! Domain-event publishing boundary.
//!
//! After an aggregate is persisted, the caller pushes the drained outbox
//! events here; audit trails, notifications and webhooks subscribe. Delivery
//! is broadcast and at-least-once — consumers must be idempotent — and the
//! aggregate state, not the bus, stays the system of record, so republishing
//! after a failed `publish` is always safe.
//!
//! Subscriptions can be scoped to a dotted event-type namespace: a consumer
//! interested only in invoice lifecycle facts subscribes to
//! `"invoicing.invoice"` and never sees party events.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::event::Event;

/// A consumer's end of the event stream.
///
/// Each subscription receives its own copy of every matching event published
/// after it was created. Designed for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<E> {
    receiver: Receiver<E>,
}

impl<E> Subscription<E> {
    pub fn new(receiver: Receiver<E>) -> Self {
        Self { receiver }
    }

    /// Block until the next event is available.
    pub fn recv(&self) -> Result<E, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Result<E, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for an event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<E, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Publish/subscribe contract for drained domain events.
///
/// Typed over [`Event`] so the transport can route on the stable
/// `event_type()` names the aggregates stamp onto their facts.
pub trait EventBus<E: Event>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, event: E) -> Result<(), Self::Error>;

    /// Subscribe to every event on the bus.
    fn subscribe(&self) -> Subscription<E>;

    /// Subscribe to events whose `event_type()` starts with the given dotted
    /// prefix (e.g. `"invoicing.invoice"` or `"parties.party"`).
    fn subscribe_to(&self, topic_prefix: &str) -> Subscription<E>;
}

impl<E, B> EventBus<E> for Arc<B>
where
    E: Event,
    B: EventBus<E> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, event: E) -> Result<(), Self::Error> {
        (**self).publish(event)
    }

    fn subscribe(&self) -> Subscription<E> {
        (**self).subscribe()
    }

    fn subscribe_to(&self, topic_prefix: &str) -> Subscription<E> {
        (**self).subscribe_to(topic_prefix)
    }
}
