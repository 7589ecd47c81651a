//! Validated construction and reconstruction of parties.

use clearbill_core::{DomainResult, PartyId};

use crate::party::{Party, PartyState};

/// Factory for `Party` aggregates.
///
/// Encapsulates id generation for fresh parties and the validated
/// rehydration path for persisted ones.
#[derive(Debug, Clone, Default)]
pub struct PartyFactory;

impl PartyFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a fresh party with a generated id.
    pub fn create(&self, legal_name: impl Into<String>) -> DomainResult<Party> {
        Party::new(PartyId::new(), legal_name)
    }

    /// Create a fresh party under a caller-chosen id (tests, imports).
    pub fn create_with_id(&self, id: PartyId, legal_name: impl Into<String>) -> DomainResult<Party> {
        Party::new(id, legal_name)
    }

    /// Rebuild a party from persisted state, re-running all invariants.
    pub fn rehydrate(&self, state: PartyState) -> DomainResult<Party> {
        Party::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_generates_distinct_ids() {
        use clearbill_core::AggregateRoot;

        let factory = PartyFactory::new();
        let a = factory.create("A GmbH").unwrap();
        let b = factory.create("B GmbH").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn create_rejects_blank_names() {
        assert!(PartyFactory::new().create("  ").is_err());
    }
}
