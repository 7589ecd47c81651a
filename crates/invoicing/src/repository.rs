//! Invoice persistence contract (consumed, not implemented here).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clearbill_core::{DomainResult, InvoiceId, Page, PageRequest, PartyId};

use crate::invoice::Invoice;
use crate::number::InvoiceNumber;
use crate::status::{DocumentStatus, PaymentStatus, TransmissionStatus};

/// Jurisdiction-agnostic search filters; all optional, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSearchCriteria {
    pub document_status: Option<DocumentStatus>,
    pub transmission_status: Option<TransmissionStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Matches either seller or buyer.
    pub party_id: Option<PartyId>,
    pub issued_from: Option<NaiveDate>,
    pub issued_to: Option<NaiveDate>,
    pub payable_min: Option<Decimal>,
    pub payable_max: Option<Decimal>,
    pub currency_code: Option<String>,
    pub free_text: Option<String>,
}

/// Storage boundary for invoices.
///
/// Implementations live outside the domain core; aggregates are persisted via
/// `Invoice::to_state` / rehydrated via the factory. Single-writer-per-
/// aggregate is the implementation's responsibility (the `version()` counter
/// is the optimistic-concurrency token).
pub trait InvoiceRepository {
    fn save(&mut self, invoice: &Invoice) -> DomainResult<()>;

    fn find_by_id(&self, id: InvoiceId) -> DomainResult<Option<Invoice>>;

    fn find_by_number(&self, number: &InvoiceNumber) -> DomainResult<Option<Invoice>>;

    fn search(
        &self,
        criteria: &InvoiceSearchCriteria,
        page: PageRequest,
    ) -> DomainResult<Page<Invoice>>;

    fn exists(&self, id: InvoiceId) -> DomainResult<bool>;

    fn delete(&mut self, id: InvoiceId) -> DomainResult<()>;
}
