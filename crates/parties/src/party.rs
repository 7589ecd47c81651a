//! The `Party` aggregate.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use clearbill_core::{AggregateRoot, Currency, DomainError, DomainResult, PartyId};
use clearbill_events::{EventBus, EventOutbox};

use crate::address::Address;
use crate::bank::BankAccount;
use crate::contact::ContactPerson;
use crate::endpoint::{ElectronicAddress, NetworkIdentifier};
use crate::events::PartyEvent;
use crate::identifier::{IdentifierReport, PartyIdentifier};
use crate::snapshot::PartySnapshot;

/// Per-party defaults applied when drafting invoices for/from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyDefaults {
    pub currency: Option<Currency>,
    pub language: Option<String>,
    pub payment_terms_days: Option<u32>,
}

/// Aggregate root: Party (seller, buyer, payee or tax representative).
///
/// All collections are owned and private; mutation goes through named methods
/// that enforce uniqueness rules, bump the version and append a domain event
/// to the outbox. Callers drain the outbox with [`Party::take_events`] after
/// persisting.
#[derive(Debug, Clone)]
pub struct Party {
    id: PartyId,
    legal_name: String,
    trading_name: Option<String>,
    tax_number: Option<String>,
    identifiers: Vec<PartyIdentifier>,
    addresses: Vec<Address>,
    contacts: Vec<ContactPerson>,
    bank_accounts: Vec<BankAccount>,
    electronic_address: Option<ElectronicAddress>,
    network_id: Option<NetworkIdentifier>,
    defaults: PartyDefaults,
    version: u64,
    outbox: EventOutbox<PartyEvent>,
}

/// Fully-formed persisted state of a party.
///
/// `Party::from_state` re-runs every invariant — rehydration has no
/// privileged path around validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyState {
    pub id: PartyId,
    pub legal_name: String,
    pub trading_name: Option<String>,
    pub tax_number: Option<String>,
    pub identifiers: Vec<PartyIdentifier>,
    pub addresses: Vec<Address>,
    pub contacts: Vec<ContactPerson>,
    pub bank_accounts: Vec<BankAccount>,
    pub electronic_address: Option<ElectronicAddress>,
    pub network_id: Option<NetworkIdentifier>,
    pub defaults: PartyDefaults,
    pub version: u64,
}

impl Party {
    pub(crate) fn new(id: PartyId, legal_name: impl Into<String>) -> DomainResult<Self> {
        let legal_name = legal_name.into();
        if legal_name.trim().is_empty() {
            return Err(DomainError::validation("party legal name cannot be empty"));
        }
        Ok(Self {
            id,
            legal_name,
            trading_name: None,
            tax_number: None,
            identifiers: Vec::new(),
            addresses: Vec::new(),
            contacts: Vec::new(),
            bank_accounts: Vec::new(),
            electronic_address: None,
            network_id: None,
            defaults: PartyDefaults::default(),
            version: 0,
            outbox: EventOutbox::new(),
        })
    }

    /// Rehydrate from persisted state, re-checking every invariant.
    pub fn from_state(state: PartyState) -> DomainResult<Self> {
        let mut party = Self::new(state.id, state.legal_name)?;
        for identifier in &state.identifiers {
            if party
                .identifiers
                .iter()
                .any(|existing| existing.matches(identifier.scheme(), identifier.value()))
            {
                return Err(DomainError::conflict(format!(
                    "duplicate identifier {identifier} in persisted state"
                )));
            }
            party.identifiers.push(identifier.clone());
        }
        for account in &state.bank_accounts {
            if party
                .bank_accounts
                .iter()
                .any(|existing| existing.account_number() == account.account_number())
            {
                return Err(DomainError::conflict(format!(
                    "duplicate bank account {} in persisted state",
                    account.account_number()
                )));
            }
            party.bank_accounts.push(account.clone());
        }
        party.trading_name = state.trading_name;
        party.tax_number = state.tax_number;
        party.addresses = state.addresses;
        party.contacts = state.contacts;
        party.electronic_address = state.electronic_address;
        party.network_id = state.network_id;
        party.defaults = state.defaults;
        party.version = state.version;
        Ok(party)
    }

    /// Persistable copy of the current state (outbox excluded).
    pub fn to_state(&self) -> PartyState {
        PartyState {
            id: self.id,
            legal_name: self.legal_name.clone(),
            trading_name: self.trading_name.clone(),
            tax_number: self.tax_number.clone(),
            identifiers: self.identifiers.clone(),
            addresses: self.addresses.clone(),
            contacts: self.contacts.clone(),
            bank_accounts: self.bank_accounts.clone(),
            electronic_address: self.electronic_address.clone(),
            network_id: self.network_id.clone(),
            defaults: self.defaults.clone(),
            version: self.version,
        }
    }

    pub fn legal_name(&self) -> &str {
        &self.legal_name
    }

    pub fn trading_name(&self) -> Option<&str> {
        self.trading_name.as_deref()
    }

    pub fn tax_number(&self) -> Option<&str> {
        self.tax_number.as_deref()
    }

    pub fn identifiers(&self) -> &[PartyIdentifier] {
        &self.identifiers
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn contacts(&self) -> &[ContactPerson] {
        &self.contacts
    }

    pub fn bank_accounts(&self) -> &[BankAccount] {
        &self.bank_accounts
    }

    pub fn electronic_address(&self) -> Option<&ElectronicAddress> {
        self.electronic_address.as_ref()
    }

    pub fn network_id(&self) -> Option<&NetworkIdentifier> {
        self.network_id.as_ref()
    }

    pub fn defaults(&self) -> &PartyDefaults {
        &self.defaults
    }

    pub fn rename(&mut self, legal_name: impl Into<String>) -> DomainResult<()> {
        let legal_name = legal_name.into();
        if legal_name.trim().is_empty() {
            return Err(DomainError::validation("party legal name cannot be empty"));
        }
        self.legal_name = legal_name;
        self.version += 1;
        Ok(())
    }

    pub fn set_trading_name(&mut self, trading_name: Option<String>) {
        self.trading_name = trading_name;
        self.version += 1;
    }

    pub fn set_tax_number(&mut self, tax_number: Option<String>) {
        self.tax_number = tax_number;
        self.version += 1;
    }

    pub fn set_electronic_address(&mut self, address: Option<ElectronicAddress>) {
        self.electronic_address = address;
        self.version += 1;
    }

    pub fn set_network_id(&mut self, network_id: Option<NetworkIdentifier>) {
        self.network_id = network_id;
        self.version += 1;
    }

    pub fn set_defaults(&mut self, defaults: PartyDefaults) {
        self.defaults = defaults;
        self.version += 1;
    }

    /// Add an identifier; duplicates by `(scheme, value)` are rejected.
    pub fn add_identifier(&mut self, identifier: PartyIdentifier) -> DomainResult<()> {
        if self
            .identifiers
            .iter()
            .any(|existing| existing.matches(identifier.scheme(), identifier.value()))
        {
            return Err(DomainError::conflict(format!(
                "party already has identifier {identifier}"
            )));
        }
        self.identifiers.push(identifier.clone());
        self.record(PartyEvent::IdentifierAdded {
            party_id: self.id,
            identifier,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    pub fn remove_identifier(&mut self, scheme: &str, value: &str) -> DomainResult<()> {
        let position = self
            .identifiers
            .iter()
            .position(|existing| existing.matches(scheme, value))
            .ok_or(DomainError::NotFound)?;
        self.identifiers.remove(position);
        self.record(PartyEvent::IdentifierRemoved {
            party_id: self.id,
            scheme: scheme.to_ascii_uppercase(),
            value: value.to_string(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Add an address; returns its index for later updates.
    pub fn add_address(&mut self, address: Address) -> usize {
        self.addresses.push(address);
        let index = self.addresses.len() - 1;
        self.record(PartyEvent::AddressAdded {
            party_id: self.id,
            index,
            occurred_at: Utc::now(),
        });
        index
    }

    pub fn update_address(&mut self, index: usize, address: Address) -> DomainResult<()> {
        let slot = self.addresses.get_mut(index).ok_or(DomainError::NotFound)?;
        *slot = address;
        self.record(PartyEvent::AddressUpdated {
            party_id: self.id,
            index,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    pub fn remove_address(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.addresses.len() {
            return Err(DomainError::NotFound);
        }
        self.addresses.remove(index);
        self.record(PartyEvent::AddressRemoved {
            party_id: self.id,
            index,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    pub fn add_contact(&mut self, contact: ContactPerson) {
        let name = contact.name().to_string();
        self.contacts.push(contact);
        self.record(PartyEvent::ContactPersonAdded {
            party_id: self.id,
            name,
            occurred_at: Utc::now(),
        });
    }

    pub fn remove_contact(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.contacts.len() {
            return Err(DomainError::NotFound);
        }
        let removed = self.contacts.remove(index);
        self.record(PartyEvent::ContactPersonRemoved {
            party_id: self.id,
            name: removed.name().to_string(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Add a bank account; duplicates by account number are rejected.
    pub fn add_bank_account(&mut self, account: BankAccount) -> DomainResult<()> {
        if self
            .bank_accounts
            .iter()
            .any(|existing| existing.account_number() == account.account_number())
        {
            return Err(DomainError::conflict(format!(
                "party already has bank account {}",
                account.account_number()
            )));
        }
        let account_number = account.account_number().to_string();
        self.bank_accounts.push(account);
        self.record(PartyEvent::BankAccountAdded {
            party_id: self.id,
            account_number,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    pub fn remove_bank_account(&mut self, account_number: &str) -> DomainResult<()> {
        let position = self
            .bank_accounts
            .iter()
            .position(|existing| existing.account_number() == account_number)
            .ok_or(DomainError::NotFound)?;
        self.bank_accounts.remove(position);
        self.record(PartyEvent::BankAccountRemoved {
            party_id: self.id,
            account_number: account_number.to_string(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Pure, side-effect-free copy of the invoice-relevant fields.
    ///
    /// The first address/contact/bank account is taken as the primary one.
    pub fn create_snapshot(&self) -> DomainResult<PartySnapshot> {
        PartySnapshot::new(
            self.id,
            self.legal_name.clone(),
            self.trading_name.clone(),
            self.tax_number.clone(),
            self.identifiers.clone(),
            self.electronic_address.clone(),
            self.network_id.clone(),
            self.addresses.first().cloned(),
            self.contacts.first().cloned(),
            self.bank_accounts.first().cloned(),
        )
    }

    /// Check all identifiers, accumulating fatal errors and format warnings.
    pub fn validate_identifiers(&self) -> IdentifierReport {
        let mut report = IdentifierReport::default();

        for identifier in &self.identifiers {
            if let Some(issue) = identifier.format_issue() {
                report.warnings.push(issue);
            }
            if identifier.scheme() == "VAT" {
                if let Some(tax_number) = self.tax_number.as_deref() {
                    if tax_number != identifier.value() {
                        report.errors.push(format!(
                            "VAT identifier {} contradicts registered tax number {}",
                            identifier.value(),
                            tax_number
                        ));
                    }
                }
            }
        }

        if let Some(endpoint) = &self.electronic_address {
            if endpoint.scheme() == clearbill_core::ElectronicAddressScheme::Gln
                && !self
                    .identifiers
                    .iter()
                    .any(|identifier| identifier.scheme() == "GLN")
            {
                report
                    .warnings
                    .push("GLN endpoint configured without a GLN party identifier".to_string());
            }
        }

        report
    }

    /// Take all pending domain events, leaving the outbox empty.
    pub fn take_events(&mut self) -> Vec<PartyEvent> {
        self.outbox.drain()
    }

    /// Publish all pending events to a bus, clearing the outbox on success.
    ///
    /// Call after the aggregate was persisted; on failure the events stay
    /// pending and the whole batch can be republished.
    pub fn publish_events<B>(&mut self, bus: &B) -> Result<usize, B::Error>
    where
        B: EventBus<PartyEvent>,
    {
        self.outbox.publish_to(bus)
    }

    /// Read-only view of undrained events.
    pub fn pending_events(&self) -> &[PartyEvent] {
        self.outbox.pending()
    }

    fn record(&mut self, event: PartyEvent) {
        self.version += 1;
        self.outbox.record(event);
    }
}

impl AggregateRoot for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::PartyFactory;

    fn test_party() -> Party {
        PartyFactory::new().create("ACME GmbH").unwrap()
    }

    fn gln() -> PartyIdentifier {
        PartyIdentifier::new("GLN", "4012345000009").unwrap()
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let mut party = test_party();
        party.add_identifier(gln()).unwrap();
        let err = party.add_identifier(gln()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn removing_unknown_identifier_fails() {
        let mut party = test_party();
        let err = party.remove_identifier("GLN", "4012345000009").unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn mutations_append_events_until_drained() {
        let mut party = test_party();
        party.add_identifier(gln()).unwrap();
        party.add_address(Address::new("Berlin", "10115", "DE").unwrap());
        assert_eq!(party.pending_events().len(), 2);

        let events = party.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], PartyEvent::IdentifierAdded { .. }));
        assert!(matches!(events[1], PartyEvent::AddressAdded { index: 0, .. }));
        assert!(party.pending_events().is_empty());
    }

    #[test]
    fn publish_events_feeds_party_facts_to_the_bus() {
        use clearbill_events::InMemoryEventBus;

        let bus = InMemoryEventBus::new();
        let party_feed = bus.subscribe_to("parties.party");

        let mut party = test_party();
        party.add_identifier(gln()).unwrap();
        party
            .add_bank_account(BankAccount::from_iban("DE89 3704 0044 0532 0130 00").unwrap())
            .unwrap();

        let published = party.publish_events(&bus).unwrap();
        assert_eq!(published, 2);
        assert!(party.pending_events().is_empty());

        match party_feed.try_recv().unwrap() {
            PartyEvent::IdentifierAdded { party_id, identifier, .. } => {
                assert_eq!(&party_id, AggregateRoot::id(&party));
                assert_eq!(identifier.scheme(), "GLN");
            }
            other => panic!("expected IdentifierAdded, got {other:?}"),
        }
        assert!(matches!(
            party_feed.try_recv().unwrap(),
            PartyEvent::BankAccountAdded { .. }
        ));
    }

    #[test]
    fn version_bumps_once_per_mutation() {
        let mut party = test_party();
        assert_eq!(party.version(), 0);
        party.add_identifier(gln()).unwrap();
        party.add_contact(ContactPerson::new("Jo Doe", Some("jo@acme.example".into()), None).unwrap());
        assert_eq!(party.version(), 2);
    }

    #[test]
    fn duplicate_bank_account_number_is_rejected() {
        let mut party = test_party();
        let account = BankAccount::from_iban("DE89 3704 0044 0532 0130 00").unwrap();
        party.add_bank_account(account.clone()).unwrap();
        let err = party.add_bank_account(account).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn address_updates_are_index_bounded() {
        let mut party = test_party();
        let berlin = Address::new("Berlin", "10115", "DE").unwrap();
        let index = party.add_address(berlin);

        let munich = Address::new("München", "80331", "DE").unwrap();
        party.update_address(index, munich.clone()).unwrap();
        assert_eq!(party.addresses()[index], munich);

        assert!(matches!(
            party.update_address(7, munich).unwrap_err(),
            DomainError::NotFound
        ));
    }

    #[test]
    fn snapshot_copies_do_not_track_later_edits() {
        let mut party = test_party();
        party.add_address(Address::new("Berlin", "10115", "DE").unwrap());
        let snapshot = party.create_snapshot().unwrap();

        party.rename("ACME Holdings GmbH").unwrap();
        party.remove_address(0).unwrap();

        assert_eq!(snapshot.legal_name(), "ACME GmbH");
        assert_eq!(snapshot.address().unwrap().city(), "Berlin");
    }

    #[test]
    fn identifier_report_mixes_warnings_and_errors() {
        let mut party = test_party();
        party.set_tax_number(Some("DE123456789".to_string()));
        party
            .add_identifier(PartyIdentifier::new("VAT", "DE999999999").unwrap())
            .unwrap();
        party
            .add_identifier(PartyIdentifier::new("GLN", "123").unwrap())
            .unwrap();

        let report = party.validate_identifiers();
        assert!(!report.is_ok());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn rehydration_re_checks_invariants() {
        let mut party = test_party();
        party.add_identifier(gln()).unwrap();
        let mut state = party.to_state();

        // A well-formed state round-trips.
        let rehydrated = Party::from_state(state.clone()).unwrap();
        assert_eq!(rehydrated.identifiers().len(), 1);
        assert_eq!(rehydrated.version(), party.version());

        // A corrupted state does not.
        state.identifiers.push(gln());
        assert!(matches!(
            Party::from_state(state).unwrap_err(),
            DomainError::Conflict(_)
        ));
    }
}
