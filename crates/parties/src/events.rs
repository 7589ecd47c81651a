//! Domain events emitted by the `Party` aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clearbill_core::PartyId;
use clearbill_events::Event;

use crate::identifier::PartyIdentifier;

/// Everything a party can tell the outside world about itself.
///
/// Consumed from the aggregate outbox by audit/notification collaborators
/// after the aggregate was persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartyEvent {
    IdentifierAdded {
        party_id: PartyId,
        identifier: PartyIdentifier,
        occurred_at: DateTime<Utc>,
    },
    IdentifierRemoved {
        party_id: PartyId,
        scheme: String,
        value: String,
        occurred_at: DateTime<Utc>,
    },
    AddressAdded {
        party_id: PartyId,
        index: usize,
        occurred_at: DateTime<Utc>,
    },
    AddressUpdated {
        party_id: PartyId,
        index: usize,
        occurred_at: DateTime<Utc>,
    },
    AddressRemoved {
        party_id: PartyId,
        index: usize,
        occurred_at: DateTime<Utc>,
    },
    ContactPersonAdded {
        party_id: PartyId,
        name: String,
        occurred_at: DateTime<Utc>,
    },
    ContactPersonRemoved {
        party_id: PartyId,
        name: String,
        occurred_at: DateTime<Utc>,
    },
    BankAccountAdded {
        party_id: PartyId,
        account_number: String,
        occurred_at: DateTime<Utc>,
    },
    BankAccountRemoved {
        party_id: PartyId,
        account_number: String,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for PartyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PartyEvent::IdentifierAdded { .. } => "parties.party.identifier_added",
            PartyEvent::IdentifierRemoved { .. } => "parties.party.identifier_removed",
            PartyEvent::AddressAdded { .. } => "parties.party.address_added",
            PartyEvent::AddressUpdated { .. } => "parties.party.address_updated",
            PartyEvent::AddressRemoved { .. } => "parties.party.address_removed",
            PartyEvent::ContactPersonAdded { .. } => "parties.party.contact_added",
            PartyEvent::ContactPersonRemoved { .. } => "parties.party.contact_removed",
            PartyEvent::BankAccountAdded { .. } => "parties.party.bank_account_added",
            PartyEvent::BankAccountRemoved { .. } => "parties.party.bank_account_removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PartyEvent::IdentifierAdded { occurred_at, .. }
            | PartyEvent::IdentifierRemoved { occurred_at, .. }
            | PartyEvent::AddressAdded { occurred_at, .. }
            | PartyEvent::AddressUpdated { occurred_at, .. }
            | PartyEvent::AddressRemoved { occurred_at, .. }
            | PartyEvent::ContactPersonAdded { occurred_at, .. }
            | PartyEvent::ContactPersonRemoved { occurred_at, .. }
            | PartyEvent::BankAccountAdded { occurred_at, .. }
            | PartyEvent::BankAccountRemoved { occurred_at, .. } => *occurred_at,
        }
    }
}
