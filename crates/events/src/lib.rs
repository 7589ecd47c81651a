//! `clearbill-events` — domain event plumbing.
//!
//! Aggregates append value-typed events to an [`EventOutbox`]; after a
//! successful persistence step the caller pushes them onto an [`EventBus`]
//! (`EventOutbox::publish_to`, surfaced as `publish_events` on the
//! aggregates) for external audit/notification/webhook consumers, who can
//! scope their [`bus::Subscription`] to a dotted event-type namespace such
//! as `"invoicing.invoice"`. The bus is a boundary contract only — no IO
//! lives here.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod outbox;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;
pub use outbox::EventOutbox;
