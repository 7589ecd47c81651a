//! Validated construction and reconstruction of invoices.

use clearbill_core::{Currency, DomainResult, InvoiceId, InvoiceTypeCode};

use crate::invoice::{Invoice, InvoiceState};
use crate::number::{InvoiceNumber, InvoiceNumberSequence};

/// Factory for `Invoice` aggregates.
///
/// Owns the numbering sequence so fresh drafts get gapless, well-formed
/// numbers; also provides the validated rehydration path.
#[derive(Debug, Clone)]
pub struct InvoiceFactory {
    sequence: InvoiceNumberSequence,
}

impl InvoiceFactory {
    pub fn new(sequence: InvoiceNumberSequence) -> Self {
        Self { sequence }
    }

    /// The sequence state, for persisting the numbering position.
    pub fn sequence(&self) -> &InvoiceNumberSequence {
        &self.sequence
    }

    /// Draft a fresh invoice with a generated id and the next number in the
    /// sequence.
    pub fn draft(
        &mut self,
        type_code: InvoiceTypeCode,
        currency: Currency,
    ) -> DomainResult<Invoice> {
        let number = self.sequence.next_number()?;
        Ok(Invoice::draft(InvoiceId::new(), number, type_code, currency))
    }

    /// Draft under a caller-chosen number (imports, migrations).
    pub fn draft_with_number(
        &self,
        number: InvoiceNumber,
        type_code: InvoiceTypeCode,
        currency: Currency,
    ) -> Invoice {
        Invoice::draft(InvoiceId::new(), number, type_code, currency)
    }

    /// Rebuild an invoice from persisted state, re-running all invariants.
    pub fn rehydrate(&self, state: InvoiceState) -> DomainResult<Invoice> {
        Invoice::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearbill_core::AggregateRoot;

    fn factory() -> InvoiceFactory {
        InvoiceFactory::new(InvoiceNumberSequence::new("INV-", 2026).unwrap())
    }

    #[test]
    fn drafts_get_sequential_numbers_and_distinct_ids() {
        let mut factory = factory();
        let eur = Currency::from_code("EUR").unwrap();
        let first = factory.draft(InvoiceTypeCode::Invoice, eur.clone()).unwrap();
        let second = factory.draft(InvoiceTypeCode::Invoice, eur).unwrap();

        assert_eq!(first.number().as_str(), "INV-2026-00001");
        assert_eq!(second.number().as_str(), "INV-2026-00002");
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn explicit_numbers_bypass_the_sequence() {
        let factory = factory();
        let invoice = factory.draft_with_number(
            InvoiceNumber::new("LEGACY-0007").unwrap(),
            InvoiceTypeCode::CreditNote,
            Currency::from_code("USD").unwrap(),
        );
        assert_eq!(invoice.number().as_str(), "LEGACY-0007");
        assert_eq!(factory.sequence().last_counter(), 0);
    }
}
