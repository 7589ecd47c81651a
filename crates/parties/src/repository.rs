//! Party persistence contract (consumed, not implemented here).

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainResult, Page, PageRequest, PartyId};

use crate::party::Party;

/// Jurisdiction-agnostic search filters; all optional, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartySearchCriteria {
    pub name_contains: Option<String>,
    pub identifier_scheme: Option<String>,
    pub identifier_value: Option<String>,
    pub country_code: Option<String>,
    pub free_text: Option<String>,
}

/// Storage boundary for parties.
///
/// Implementations live outside the domain core; aggregates are persisted via
/// `Party::to_state` / rehydrated via the factory.
pub trait PartyRepository {
    fn save(&mut self, party: &Party) -> DomainResult<()>;

    fn find_by_id(&self, id: PartyId) -> DomainResult<Option<Party>>;

    fn find_by_identifier(&self, scheme: &str, value: &str) -> DomainResult<Option<Party>>;

    fn search(
        &self,
        criteria: &PartySearchCriteria,
        page: PageRequest,
    ) -> DomainResult<Page<Party>>;

    fn exists(&self, id: PartyId) -> DomainResult<bool>;

    fn delete(&mut self, id: PartyId) -> DomainResult<()>;
}
