//! Point-in-time copies of a party for use on invoices.

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, PartyId, ValueObject};

use crate::address::Address;
use crate::bank::BankAccount;
use crate::contact::ContactPerson;
use crate::endpoint::{ElectronicAddress, NetworkIdentifier};
use crate::identifier::PartyIdentifier;

/// Immutable copy of a party's invoice-relevant fields at issuance time.
///
/// An invoice embeds snapshots, never live `Party` references, so later edits
/// to the party cannot rewrite invoice history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySnapshot {
    party_id: PartyId,
    legal_name: String,
    trading_name: Option<String>,
    tax_number: Option<String>,
    identifiers: Vec<PartyIdentifier>,
    electronic_address: Option<ElectronicAddress>,
    network_id: Option<NetworkIdentifier>,
    address: Option<Address>,
    contact: Option<ContactPerson>,
    bank_account: Option<BankAccount>,
}

impl PartySnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        party_id: PartyId,
        legal_name: impl Into<String>,
        trading_name: Option<String>,
        tax_number: Option<String>,
        identifiers: Vec<PartyIdentifier>,
        electronic_address: Option<ElectronicAddress>,
        network_id: Option<NetworkIdentifier>,
        address: Option<Address>,
        contact: Option<ContactPerson>,
        bank_account: Option<BankAccount>,
    ) -> DomainResult<Self> {
        let legal_name = legal_name.into();
        if legal_name.trim().is_empty() {
            return Err(DomainError::validation("snapshot legal name cannot be empty"));
        }
        Ok(Self {
            party_id,
            legal_name,
            trading_name,
            tax_number,
            identifiers,
            electronic_address,
            network_id,
            address,
            contact,
            bank_account,
        })
    }

    pub fn party_id(&self) -> PartyId {
        self.party_id
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

    pub fn electronic_address(&self) -> Option<&ElectronicAddress> {
        self.electronic_address.as_ref()
    }

    pub fn network_id(&self) -> Option<&NetworkIdentifier> {
        self.network_id.as_ref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn contact(&self) -> Option<&ContactPerson> {
        self.contact.as_ref()
    }

    pub fn bank_account(&self) -> Option<&BankAccount> {
        self.bank_account.as_ref()
    }
}

impl ValueObject for PartySnapshot {}
