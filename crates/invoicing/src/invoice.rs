//! The `Invoice` aggregate root.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use clearbill_core::{
    AggregateRoot, Currency, DomainError, DomainResult, Entity, InvoiceId, InvoiceTypeCode, Money,
    OutputFormat, Percentage, TaxCategory, UserId, ValidationResult,
};
use clearbill_events::{EventBus, EventOutbox};
use clearbill_parties::PartySnapshot;

use crate::allowance::AllowanceCharge;
use crate::audit::{AuditEntry, AuditKind};
use crate::events::InvoiceEvent;
use crate::exchange::ExchangeRate;
use crate::line_item::{InvoiceLineItem, LineItemId, LineItemUpdate};
use crate::number::InvoiceNumber;
use crate::output::{Document, FormatService};
use crate::payment::{Payment, PaymentInstructions};
use crate::reference::DocumentReference;
use crate::status::{DocumentStatus, PaymentStatus, TransmissionStatus};
use crate::tax_breakdown::TaxBreakdown;
use crate::totals::InvoiceTotals;

/// Aggregate root: a commercial invoice.
///
/// Owns its line items, totals, tax breakdowns, references, payments, audit
/// trail and event outbox exclusively. All mutation goes through methods that
/// enforce the document/transmission/payment state machines; every successful
/// mutation bumps the version and appends an audit entry, and the operations
/// the outside world cares about also append a domain event.
#[derive(Debug, Clone)]
pub struct Invoice {
    id: InvoiceId,
    number: InvoiceNumber,
    type_code: InvoiceTypeCode,
    profile: String,
    notes: Vec<String>,
    seller: Option<PartySnapshot>,
    buyer: Option<PartySnapshot>,
    payee: Option<PartySnapshot>,
    tax_representative: Option<PartySnapshot>,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    tax_point_date: Option<NaiveDate>,
    delivery_date: Option<NaiveDate>,
    document_status: DocumentStatus,
    transmission_status: TransmissionStatus,
    payment_status: PaymentStatus,
    currency: Currency,
    exchange_rate: Option<ExchangeRate>,
    buyer_reference: Option<String>,
    payment_instructions: Option<PaymentInstructions>,
    lines: Vec<InvoiceLineItem>,
    document_allowances: Vec<AllowanceCharge>,
    references: Vec<DocumentReference>,
    prepaid: Money,
    rounding: Money,
    totals: InvoiceTotals,
    tax_breakdowns: Vec<TaxBreakdown>,
    payments: Vec<Payment>,
    validation_history: Vec<ValidationResult>,
    audit: Vec<AuditEntry>,
    finalized_at: Option<DateTime<Utc>>,
    version: u64,
    outbox: EventOutbox<InvoiceEvent>,
}

/// Fully-formed persisted state of an invoice.
///
/// `Invoice::from_state` re-runs the invariants — in particular it recomputes
/// the totals and tax breakdowns from the lines and refuses state whose
/// persisted totals disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceState {
    pub id: InvoiceId,
    pub number: InvoiceNumber,
    pub type_code: InvoiceTypeCode,
    pub profile: String,
    pub notes: Vec<String>,
    pub seller: Option<PartySnapshot>,
    pub buyer: Option<PartySnapshot>,
    pub payee: Option<PartySnapshot>,
    pub tax_representative: Option<PartySnapshot>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub tax_point_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub document_status: DocumentStatus,
    pub transmission_status: TransmissionStatus,
    pub payment_status: PaymentStatus,
    pub currency: Currency,
    pub exchange_rate: Option<ExchangeRate>,
    pub buyer_reference: Option<String>,
    pub payment_instructions: Option<PaymentInstructions>,
    pub lines: Vec<InvoiceLineItem>,
    pub document_allowances: Vec<AllowanceCharge>,
    pub references: Vec<DocumentReference>,
    pub prepaid: Money,
    pub rounding: Money,
    pub totals: InvoiceTotals,
    pub tax_breakdowns: Vec<TaxBreakdown>,
    pub payments: Vec<Payment>,
    pub validation_history: Vec<ValidationResult>,
    pub audit: Vec<AuditEntry>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub version: u64,
}

impl Invoice {
    pub(crate) fn draft(
        id: InvoiceId,
        number: InvoiceNumber,
        type_code: InvoiceTypeCode,
        currency: Currency,
    ) -> Self {
        let mut invoice = Self {
            id,
            number,
            type_code,
            profile: "en16931".to_string(),
            notes: Vec::new(),
            seller: None,
            buyer: None,
            payee: None,
            tax_representative: None,
            issue_date: None,
            due_date: None,
            tax_point_date: None,
            delivery_date: None,
            document_status: DocumentStatus::Draft,
            transmission_status: TransmissionStatus::None,
            payment_status: PaymentStatus::Unpaid,
            currency: currency.clone(),
            exchange_rate: None,
            buyer_reference: None,
            payment_instructions: None,
            lines: Vec::new(),
            document_allowances: Vec::new(),
            references: Vec::new(),
            prepaid: Money::zero(currency.clone()),
            rounding: Money::zero(currency.clone()),
            totals: InvoiceTotals::zero(currency),
            tax_breakdowns: Vec::new(),
            payments: Vec::new(),
            validation_history: Vec::new(),
            audit: Vec::new(),
            finalized_at: None,
            version: 0,
            outbox: EventOutbox::new(),
        };
        invoice
            .audit
            .push(AuditEntry::new(AuditKind::Created, "invoice drafted"));
        invoice
    }

    /// Rehydrate from persisted state, re-running every invariant.
    pub fn from_state(state: InvoiceState) -> DomainResult<Self> {
        let mut invoice = Self::draft(state.id, state.number, state.type_code, state.currency);
        invoice.audit.clear();

        invoice.profile = state.profile;
        invoice.notes = state.notes;
        invoice.seller = state.seller;
        invoice.buyer = state.buyer;
        invoice.payee = state.payee;
        invoice.tax_representative = state.tax_representative;
        invoice.issue_date = state.issue_date;
        invoice.due_date = state.due_date;
        invoice.tax_point_date = state.tax_point_date;
        invoice.delivery_date = state.delivery_date;
        invoice.exchange_rate = state.exchange_rate;
        invoice.buyer_reference = state.buyer_reference;
        invoice.payment_instructions = state.payment_instructions;
        invoice.lines = state.lines;
        invoice.document_allowances = state.document_allowances;
        invoice.references = state.references;
        invoice.prepaid = state.prepaid;
        invoice.rounding = state.rounding;
        invoice.payments = state.payments;
        invoice.validation_history = state.validation_history;
        invoice.audit = state.audit;
        invoice.finalized_at = state.finalized_at;

        invoice.renumber_lines();
        invoice.recalculate()?;
        if invoice.totals != state.totals {
            return Err(DomainError::invariant(format!(
                "persisted totals disagree with recalculation: payable {} vs {}",
                state.totals.payable().amount(),
                invoice.totals.payable().amount()
            )));
        }

        // Statuses are restored last; the draft-time recalculation above is
        // legitimate even for finalized documents because state is unchanged.
        invoice.document_status = state.document_status;
        invoice.transmission_status = state.transmission_status;
        invoice.payment_status = state.payment_status;
        invoice.version = state.version;
        Ok(invoice)
    }

    /// Persistable copy of the current state (outbox excluded).
    pub fn to_state(&self) -> InvoiceState {
        InvoiceState {
            id: self.id,
            number: self.number.clone(),
            type_code: self.type_code,
            profile: self.profile.clone(),
            notes: self.notes.clone(),
            seller: self.seller.clone(),
            buyer: self.buyer.clone(),
            payee: self.payee.clone(),
            tax_representative: self.tax_representative.clone(),
            issue_date: self.issue_date,
            due_date: self.due_date,
            tax_point_date: self.tax_point_date,
            delivery_date: self.delivery_date,
            document_status: self.document_status,
            transmission_status: self.transmission_status,
            payment_status: self.payment_status,
            currency: self.currency.clone(),
            exchange_rate: self.exchange_rate.clone(),
            buyer_reference: self.buyer_reference.clone(),
            payment_instructions: self.payment_instructions.clone(),
            lines: self.lines.clone(),
            document_allowances: self.document_allowances.clone(),
            references: self.references.clone(),
            prepaid: self.prepaid.clone(),
            rounding: self.rounding.clone(),
            totals: self.totals.clone(),
            tax_breakdowns: self.tax_breakdowns.clone(),
            payments: self.payments.clone(),
            validation_history: self.validation_history.clone(),
            audit: self.audit.clone(),
            finalized_at: self.finalized_at,
            version: self.version,
        }
    }

    // ----- accessors -------------------------------------------------------

    pub fn number(&self) -> &InvoiceNumber {
        &self.number
    }

    pub fn type_code(&self) -> InvoiceTypeCode {
        self.type_code
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn seller(&self) -> Option<&PartySnapshot> {
        self.seller.as_ref()
    }

    pub fn buyer(&self) -> Option<&PartySnapshot> {
        self.buyer.as_ref()
    }

    pub fn payee(&self) -> Option<&PartySnapshot> {
        self.payee.as_ref()
    }

    pub fn tax_representative(&self) -> Option<&PartySnapshot> {
        self.tax_representative.as_ref()
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn tax_point_date(&self) -> Option<NaiveDate> {
        self.tax_point_date
    }

    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivery_date
    }

    pub fn document_status(&self) -> DocumentStatus {
        self.document_status
    }

    pub fn transmission_status(&self) -> TransmissionStatus {
        self.transmission_status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn exchange_rate(&self) -> Option<&ExchangeRate> {
        self.exchange_rate.as_ref()
    }

    pub fn buyer_reference(&self) -> Option<&str> {
        self.buyer_reference.as_deref()
    }

    pub fn payment_instructions(&self) -> Option<&PaymentInstructions> {
        self.payment_instructions.as_ref()
    }

    pub fn lines(&self) -> &[InvoiceLineItem] {
        &self.lines
    }

    pub fn document_allowance_charges(&self) -> &[AllowanceCharge] {
        &self.document_allowances
    }

    pub fn references(&self) -> &[DocumentReference] {
        &self.references
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    pub fn tax_breakdowns(&self) -> &[TaxBreakdown] {
        &self.tax_breakdowns
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn validation_history(&self) -> &[ValidationResult] {
        &self.validation_history
    }

    pub fn audit_trail(&self) -> &[AuditEntry] {
        &self.audit
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    /// Sum of payments applied so far.
    pub fn paid_total(&self) -> DomainResult<Money> {
        let mut total = Money::zero(self.currency.clone());
        for payment in &self.payments {
            total = total.add(payment.amount())?;
        }
        Ok(total)
    }

    /// What is still owed: payable minus payments applied.
    pub fn remaining_amount(&self) -> DomainResult<Money> {
        self.totals.payable().subtract(&self.paid_total()?)
    }

    // ----- drafting --------------------------------------------------------

    pub fn set_seller(&mut self, seller: PartySnapshot) -> DomainResult<()> {
        self.ensure_editable("set seller")?;
        self.seller = Some(seller);
        self.version += 1;
        Ok(())
    }

    pub fn set_buyer(&mut self, buyer: PartySnapshot) -> DomainResult<()> {
        self.ensure_editable("set buyer")?;
        self.buyer = Some(buyer);
        self.version += 1;
        Ok(())
    }

    pub fn set_payee(&mut self, payee: Option<PartySnapshot>) -> DomainResult<()> {
        self.ensure_editable("set payee")?;
        self.payee = payee;
        self.version += 1;
        Ok(())
    }

    pub fn set_tax_representative(&mut self, representative: Option<PartySnapshot>) -> DomainResult<()> {
        self.ensure_editable("set tax representative")?;
        self.tax_representative = representative;
        self.version += 1;
        Ok(())
    }

    pub fn set_profile(&mut self, profile: impl Into<String>) -> DomainResult<()> {
        self.ensure_editable("set profile")?;
        self.profile = profile.into();
        self.version += 1;
        Ok(())
    }

    pub fn set_issue_date(&mut self, issue_date: NaiveDate) -> DomainResult<()> {
        self.ensure_editable("set issue date")?;
        self.issue_date = Some(issue_date);
        self.version += 1;
        Ok(())
    }

    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) -> DomainResult<()> {
        self.ensure_editable("set due date")?;
        self.due_date = due_date;
        self.version += 1;
        Ok(())
    }

    pub fn set_tax_point_date(&mut self, tax_point_date: Option<NaiveDate>) -> DomainResult<()> {
        self.ensure_editable("set tax point date")?;
        self.tax_point_date = tax_point_date;
        self.version += 1;
        Ok(())
    }

    pub fn set_delivery_date(&mut self, delivery_date: Option<NaiveDate>) -> DomainResult<()> {
        self.ensure_editable("set delivery date")?;
        self.delivery_date = delivery_date;
        self.version += 1;
        Ok(())
    }

    pub fn set_buyer_reference(&mut self, reference: Option<String>) -> DomainResult<()> {
        self.ensure_editable("set buyer reference")?;
        self.buyer_reference = reference;
        self.version += 1;
        Ok(())
    }

    pub fn set_payment_instructions(&mut self, instructions: Option<PaymentInstructions>) -> DomainResult<()> {
        self.ensure_editable("set payment instructions")?;
        self.payment_instructions = instructions;
        self.version += 1;
        Ok(())
    }

    pub fn add_note(&mut self, note: impl Into<String>) -> DomainResult<()> {
        self.ensure_editable("add note")?;
        self.notes.push(note.into());
        self.version += 1;
        Ok(())
    }

    /// Set the base-currency conversion; the rate's source must be the
    /// document currency.
    pub fn set_exchange_rate(&mut self, rate: Option<ExchangeRate>) -> DomainResult<()> {
        self.ensure_editable("set exchange rate")?;
        if let Some(ref rate) = rate {
            if rate.source() != &self.currency {
                return Err(DomainError::currency_mismatch(
                    self.currency.code(),
                    rate.source().code(),
                ));
            }
        }
        self.exchange_rate = rate;
        self.version += 1;
        Ok(())
    }

    /// Amount already invoiced/paid in advance (enters the payable identity).
    pub fn set_prepaid(&mut self, prepaid: Money) -> DomainResult<()> {
        self.ensure_editable("set prepaid amount")?;
        self.ensure_document_currency(&prepaid)?;
        if prepaid.is_negative() {
            return Err(DomainError::validation("prepaid amount must not be negative"));
        }
        self.prepaid = prepaid;
        self.recalculate()?;
        self.version += 1;
        Ok(())
    }

    /// Explicit rounding of the payable (may be negative by a few cents).
    pub fn set_rounding(&mut self, rounding: Money) -> DomainResult<()> {
        self.ensure_editable("set rounding amount")?;
        self.ensure_document_currency(&rounding)?;
        self.rounding = rounding;
        self.recalculate()?;
        self.version += 1;
        Ok(())
    }

    // ----- line items ------------------------------------------------------

    /// Add a line item; the invoice assigns the next line number and
    /// recalculates all totals and breakdowns.
    pub fn add_line_item(&mut self, mut line: InvoiceLineItem) -> DomainResult<LineItemId> {
        self.ensure_editable("add line item")?;
        self.ensure_document_currency(line.unit_price())?;

        line.set_line_number(self.lines.len() as u32 + 1);
        let line_id = *line.id();
        let line_number = line.line_number();
        self.lines.push(line);
        self.recalculate()?;

        self.push_audit(AuditEntry::new(
            AuditKind::LineItemAdded,
            format!("line {line_number} added"),
        ));
        self.record(InvoiceEvent::LineItemAdded {
            invoice_id: self.id,
            line_id,
            line_number,
            occurred_at: Utc::now(),
        });
        Ok(line_id)
    }

    /// Apply a partial update to a line; totals are recalculated.
    pub fn update_line_item(&mut self, line_id: LineItemId, update: LineItemUpdate) -> DomainResult<()> {
        self.ensure_editable("update line item")?;
        let line = self
            .lines
            .iter_mut()
            .find(|line| *line.id() == line_id)
            .ok_or(DomainError::NotFound)?;
        line.apply_update(update)?;
        let line_number = line.line_number();
        self.recalculate()?;

        self.push_audit(AuditEntry::new(
            AuditKind::LineItemUpdated,
            format!("line {line_number} updated"),
        ));
        self.record(InvoiceEvent::LineItemUpdated {
            invoice_id: self.id,
            line_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Remove a line item; remaining lines are renumbered sequentially.
    pub fn remove_line_item(&mut self, line_id: LineItemId) -> DomainResult<()> {
        self.ensure_editable("remove line item")?;
        let position = self
            .lines
            .iter()
            .position(|line| *line.id() == line_id)
            .ok_or(DomainError::NotFound)?;
        self.lines.remove(position);
        self.renumber_lines();
        self.recalculate()?;

        self.push_audit(AuditEntry::new(AuditKind::LineItemRemoved, "line removed"));
        self.record(InvoiceEvent::LineItemRemoved {
            invoice_id: self.id,
            line_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Add a document-level allowance or charge.
    ///
    /// Document-level entries must carry their VAT category and rate so tax
    /// grouping stays exact (the EN16931 BR-32/BR-37 shape).
    pub fn add_allowance_charge(&mut self, entry: AllowanceCharge) -> DomainResult<()> {
        self.ensure_editable("add allowance/charge")?;
        self.ensure_document_currency(entry.amount())?;
        if entry.tax_category().is_none() || entry.tax_rate().is_none() {
            return Err(DomainError::validation(
                "document-level allowance/charge must carry a tax category and rate",
            ));
        }
        self.document_allowances.push(entry);
        self.recalculate()?;
        self.push_audit(AuditEntry::new(
            AuditKind::AllowanceChargeAdded,
            "document-level allowance/charge added",
        ));
        self.version += 1;
        Ok(())
    }

    pub fn remove_allowance_charge(&mut self, index: usize) -> DomainResult<()> {
        self.ensure_editable("remove allowance/charge")?;
        if index >= self.document_allowances.len() {
            return Err(DomainError::NotFound);
        }
        self.document_allowances.remove(index);
        self.recalculate()?;
        self.push_audit(AuditEntry::new(
            AuditKind::AllowanceChargeRemoved,
            "document-level allowance/charge removed",
        ));
        self.version += 1;
        Ok(())
    }

    pub fn add_reference(&mut self, reference: DocumentReference) -> DomainResult<()> {
        self.ensure_editable("add document reference")?;
        self.references.push(reference);
        self.version += 1;
        Ok(())
    }

    // ----- lifecycle -------------------------------------------------------

    /// Freeze the document. Requires at least one line item, a seller, a
    /// buyer and an issue date; refuses documents that already left DRAFT.
    pub fn finalize(&mut self, actor: Option<UserId>) -> DomainResult<()> {
        match self.document_status {
            DocumentStatus::Draft => {}
            DocumentStatus::Finalized => {
                return Err(DomainError::precondition("invoice is already finalized"));
            }
            DocumentStatus::Cancelled => {
                return Err(DomainError::precondition("cancelled invoices cannot be finalized"));
            }
        }
        if self.lines.is_empty() {
            return Err(DomainError::precondition(
                "cannot finalize an invoice without line items",
            ));
        }
        if self.seller.is_none() {
            return Err(DomainError::precondition("cannot finalize without a seller"));
        }
        if self.buyer.is_none() {
            return Err(DomainError::precondition("cannot finalize without a buyer"));
        }
        if self.issue_date.is_none() {
            return Err(DomainError::precondition("cannot finalize without an issue date"));
        }

        self.recalculate()?;
        let before = self.document_status;
        self.document_status = DocumentStatus::Finalized;
        self.finalized_at = Some(Utc::now());

        let mut entry = AuditEntry::new(AuditKind::Finalized, "invoice finalized")
            .with_status_change(before, self.document_status);
        if let Some(actor) = actor {
            entry = entry.with_actor(actor);
        }
        self.push_audit(entry);
        self.record(InvoiceEvent::Finalized {
            invoice_id: self.id,
            number: self.number.clone(),
            payable: self.totals.payable().clone(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    pub fn queue_for_transmission(&mut self) -> DomainResult<()> {
        self.ensure_finalized("queue for transmission")?;
        if self.transmission_status != TransmissionStatus::None {
            return Err(DomainError::precondition(format!(
                "cannot queue from transmission status {:?}",
                self.transmission_status
            )));
        }
        self.transition_transmission(TransmissionStatus::Queued, AuditKind::Queued);
        Ok(())
    }

    pub fn mark_transmitting(&mut self) -> DomainResult<()> {
        self.ensure_finalized("mark transmitting")?;
        if self.transmission_status != TransmissionStatus::Queued {
            return Err(DomainError::precondition(format!(
                "cannot start transmitting from status {:?}",
                self.transmission_status
            )));
        }
        self.transition_transmission(TransmissionStatus::Transmitting, AuditKind::Transmitting);
        Ok(())
    }

    /// Mark the document sent. Requires FINALIZED; direct sends (bypassing
    /// the queue) are allowed.
    pub fn send(&mut self) -> DomainResult<()> {
        self.ensure_finalized("send")?;
        match self.transmission_status {
            TransmissionStatus::None
            | TransmissionStatus::Queued
            | TransmissionStatus::Transmitting => {}
            other => {
                return Err(DomainError::precondition(format!(
                    "cannot send from transmission status {other:?}"
                )));
            }
        }
        self.transition_transmission(TransmissionStatus::Sent, AuditKind::Sent);
        self.record(InvoiceEvent::Sent {
            invoice_id: self.id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Record that the buyer opened the document.
    pub fn mark_viewed(&mut self) -> DomainResult<()> {
        if self.transmission_status != TransmissionStatus::Sent {
            return Err(DomainError::precondition(format!(
                "cannot mark viewed from transmission status {:?}",
                self.transmission_status
            )));
        }
        self.transition_transmission(TransmissionStatus::Viewed, AuditKind::Viewed);
        Ok(())
    }

    /// Positive message-level response from the network.
    pub fn acknowledge(&mut self) -> DomainResult<()> {
        if !matches!(
            self.transmission_status,
            TransmissionStatus::Sent | TransmissionStatus::Viewed
        ) {
            return Err(DomainError::precondition(format!(
                "cannot acknowledge from transmission status {:?}",
                self.transmission_status
            )));
        }
        self.transition_transmission(TransmissionStatus::Acknowledged, AuditKind::Acknowledged);
        Ok(())
    }

    /// Negative message-level response from the network.
    pub fn reject(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        if !matches!(
            self.transmission_status,
            TransmissionStatus::Sent | TransmissionStatus::Viewed
        ) {
            return Err(DomainError::precondition(format!(
                "cannot reject from transmission status {:?}",
                self.transmission_status
            )));
        }
        let before = self.transmission_status;
        self.transmission_status = TransmissionStatus::Rejected;
        self.push_audit(
            AuditEntry::new(AuditKind::Rejected, reason.into())
                .with_status_change(before, self.transmission_status),
        );
        self.version += 1;
        Ok(())
    }

    /// Cancel the document. Refused once payment has started — a credit note
    /// is the correct instrument then.
    pub fn cancel(&mut self, actor: Option<UserId>) -> DomainResult<()> {
        if self.document_status == DocumentStatus::Cancelled {
            return Err(DomainError::precondition("invoice is already cancelled"));
        }
        if self.payment_status != PaymentStatus::Unpaid {
            return Err(DomainError::precondition(
                "cannot cancel an invoice with payments applied",
            ));
        }
        let before = self.document_status;
        self.document_status = DocumentStatus::Cancelled;
        let mut entry = AuditEntry::new(AuditKind::Cancelled, "invoice cancelled")
            .with_status_change(before, self.document_status);
        if let Some(actor) = actor {
            entry = entry.with_actor(actor);
        }
        self.push_audit(entry);
        self.version += 1;
        Ok(())
    }

    /// Apply a received payment; advances the payment status and refuses
    /// overpayment.
    pub fn apply_payment(&mut self, payment: Payment) -> DomainResult<()> {
        if self.document_status != DocumentStatus::Finalized {
            return Err(DomainError::precondition(format!(
                "cannot apply payments to a {:?} invoice",
                self.document_status
            )));
        }
        self.ensure_document_currency(payment.amount())?;

        let remaining = self.remaining_amount()?;
        if payment.amount().amount() > remaining.amount() {
            return Err(DomainError::invariant(format!(
                "payment {} exceeds the remaining amount {}",
                payment.amount(),
                remaining
            )));
        }

        let amount = payment.amount().clone();
        self.payments.push(payment);
        let remaining = self.remaining_amount()?;
        let before = self.payment_status;
        self.payment_status = if remaining.is_zero() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        };

        self.push_audit(
            AuditEntry::new(
                AuditKind::PaymentApplied,
                format!("payment of {amount} applied, {remaining} remaining"),
            )
            .with_status_change(before, self.payment_status),
        );
        self.record(InvoiceEvent::PaymentApplied {
            invoice_id: self.id,
            amount,
            remaining,
            status: self.payment_status,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Append a validation outcome to the history.
    ///
    /// Validation never blocks mutation by itself — `finalize` is the gate.
    pub fn record_validation(&mut self, result: ValidationResult) {
        let is_valid = result.is_valid();
        let error_count = result.errors().count();
        let profile = result.profile().to_string();
        self.validation_history.push(result);

        self.push_audit(AuditEntry::new(
            AuditKind::Validated,
            format!("validated against {profile}: {error_count} error(s)"),
        ));
        self.record(InvoiceEvent::Validated {
            invoice_id: self.id,
            profile,
            is_valid,
            error_count,
            occurred_at: Utc::now(),
        });
    }

    /// Render the document through the format collaborator.
    ///
    /// Only FINALIZED invoices may be rendered for transmission.
    pub fn generate_output(
        &self,
        format: OutputFormat,
        service: &dyn FormatService,
    ) -> DomainResult<Document> {
        if self.document_status != DocumentStatus::Finalized {
            return Err(DomainError::precondition(format!(
                "cannot generate output for a {:?} invoice",
                self.document_status
            )));
        }
        service.render(self, format)
    }

    /// Take all pending domain events, leaving the outbox empty.
    pub fn take_events(&mut self) -> Vec<InvoiceEvent> {
        self.outbox.drain()
    }

    /// Publish all pending events to a bus, clearing the outbox on success.
    ///
    /// Call after the aggregate was persisted; on failure the events stay
    /// pending and the whole batch can be republished.
    pub fn publish_events<B>(&mut self, bus: &B) -> Result<usize, B::Error>
    where
        B: EventBus<InvoiceEvent>,
    {
        self.outbox.publish_to(bus)
    }

    /// Read-only view of undrained events.
    pub fn pending_events(&self) -> &[InvoiceEvent] {
        self.outbox.pending()
    }

    // ----- internals -------------------------------------------------------

    fn ensure_editable(&self, operation: &str) -> DomainResult<()> {
        if !self.document_status.is_editable() {
            return Err(DomainError::precondition(format!(
                "cannot {operation} on a {:?} invoice",
                self.document_status
            )));
        }
        Ok(())
    }

    fn ensure_finalized(&self, operation: &str) -> DomainResult<()> {
        if self.document_status != DocumentStatus::Finalized {
            return Err(DomainError::precondition(format!(
                "cannot {operation} on a {:?} invoice",
                self.document_status
            )));
        }
        Ok(())
    }

    fn ensure_document_currency(&self, amount: &Money) -> DomainResult<()> {
        if amount.currency() != &self.currency {
            return Err(DomainError::currency_mismatch(
                self.currency.code(),
                amount.currency().code(),
            ));
        }
        Ok(())
    }

    fn transition_transmission(&mut self, to: TransmissionStatus, kind: AuditKind) {
        let before = self.transmission_status;
        self.transmission_status = to;
        self.push_audit(
            AuditEntry::new(kind, format!("transmission status changed to {to:?}"))
                .with_status_change(before, to),
        );
        self.version += 1;
    }

    fn renumber_lines(&mut self) {
        for (index, line) in self.lines.iter_mut().enumerate() {
            line.set_line_number(index as u32 + 1);
        }
    }

    fn push_audit(&mut self, entry: AuditEntry) {
        self.audit.push(entry);
    }

    fn record(&mut self, event: InvoiceEvent) {
        self.version += 1;
        self.outbox.record(event);
    }

    /// Re-derive totals and tax breakdowns from lines, document-level
    /// allowances/charges, prepaid and rounding.
    ///
    /// Per line: net = round(quantity × unit price) ± line allowances.
    /// Per (category, rate) group: taxable base is the sum of member line
    /// nets plus signed document-level entries of that group; the group tax
    /// is rounded once on the grouped base.
    fn recalculate(&mut self) -> DomainResult<()> {
        let zero = Money::zero(self.currency.clone());

        let mut line_net = zero.clone();
        let mut groups: Vec<TaxGroup> = Vec::new();

        for line in &self.lines {
            let net = line.net_amount()?;
            self.ensure_document_currency(&net)?;
            line_net = line_net.add(&net)?;

            match groups
                .iter_mut()
                .find(|group| &group.category == line.tax_category() && group.rate == line.tax_rate())
            {
                Some(group) => {
                    group.base = group.base.add(&net)?;
                    if group.exemption_reason.is_none() {
                        group.exemption_reason = line.tax_exemption_reason().map(String::from);
                    }
                }
                None => groups.push(TaxGroup {
                    category: line.tax_category().clone(),
                    rate: line.tax_rate(),
                    base: net,
                    exemption_reason: line.tax_exemption_reason().map(String::from),
                }),
            }
        }

        let mut allowance_total = zero.clone();
        let mut charge_total = zero.clone();
        for entry in &self.document_allowances {
            self.ensure_document_currency(entry.amount())?;
            if entry.is_charge() {
                charge_total = charge_total.add(entry.amount())?;
            } else {
                allowance_total = allowance_total.add(entry.amount())?;
            }

            let category = entry
                .tax_category()
                .ok_or_else(|| {
                    DomainError::invariant("document-level allowance/charge lost its tax category")
                })?
                .clone();
            let rate = entry.tax_rate().ok_or_else(|| {
                DomainError::invariant("document-level allowance/charge lost its tax rate")
            })?;
            let signed = entry.signed_amount();
            match groups
                .iter_mut()
                .find(|group| group.category == category && group.rate == rate)
            {
                Some(group) => group.base = group.base.add(&signed)?,
                None => groups.push(TaxGroup {
                    category,
                    rate,
                    base: signed,
                    exemption_reason: None,
                }),
            }
        }

        let mut tax_total = zero;
        let mut breakdowns = Vec::with_capacity(groups.len());
        for group in groups {
            let tax = group.rate.of(&group.base)?;
            tax_total = tax_total.add(&tax)?;
            breakdowns.push(TaxBreakdown::new(
                group.base,
                tax,
                group.category,
                group.rate,
                group.exemption_reason,
            )?);
        }

        self.totals = InvoiceTotals::compute(
            line_net,
            allowance_total,
            charge_total,
            tax_total,
            self.prepaid.clone(),
            self.rounding.clone(),
        )?;
        self.tax_breakdowns = breakdowns;
        Ok(())
    }
}

struct TaxGroup {
    category: TaxCategory,
    rate: Percentage,
    base: Money,
    exemption_reason: Option<String>,
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

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
    use crate::factory::InvoiceFactory;
    use crate::number::InvoiceNumberSequence;
    use crate::payment::PaymentMeans;
    use clearbill_core::{Quantity, ValidationIssue};
    use clearbill_parties::{Address, PartyFactory};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::from_code("EUR").unwrap()).unwrap()
    }

    fn snapshot(name: &str) -> PartySnapshot {
        let mut party = PartyFactory::new().create(name).unwrap();
        party.add_address(Address::new("Berlin", "10115", "DE").unwrap());
        party.create_snapshot().unwrap()
    }

    fn consulting_line() -> InvoiceLineItem {
        InvoiceLineItem::new(
            "Consulting",
            Quantity::new(dec!(2), "HUR").unwrap(),
            eur(dec!(100.00)),
            TaxCategory::Standard,
            Percentage::new(dec!(20)).unwrap(),
            None,
        )
        .unwrap()
    }

    fn draft_invoice() -> Invoice {
        let sequence = InvoiceNumberSequence::new("RE-", 2026).unwrap();
        let mut factory = InvoiceFactory::new(sequence);
        let mut invoice = factory
            .draft(InvoiceTypeCode::Invoice, Currency::from_code("EUR").unwrap())
            .unwrap();
        invoice.set_seller(snapshot("ACME GmbH")).unwrap();
        invoice.set_buyer(snapshot("Kunde AG")).unwrap();
        invoice
            .set_issue_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .unwrap();
        invoice
    }

    fn finalized_invoice() -> Invoice {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        invoice.finalize(None).unwrap();
        invoice
    }

    #[test]
    fn two_units_at_one_hundred_at_twenty_percent() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();

        let totals = invoice.totals();
        assert_eq!(totals.line_net().amount(), dec!(200.00));
        assert_eq!(totals.tax_exclusive().amount(), dec!(200.00));
        assert_eq!(totals.tax_total().amount(), dec!(40.00));
        assert_eq!(totals.tax_inclusive().amount(), dec!(240.00));
        assert_eq!(totals.payable().amount(), dec!(240.00));

        assert_eq!(invoice.tax_breakdowns().len(), 1);
        let breakdown = &invoice.tax_breakdowns()[0];
        assert_eq!(breakdown.taxable_amount().amount(), dec!(200.00));
        assert_eq!(breakdown.tax_amount().amount(), dec!(40.00));
    }

    #[test]
    fn full_payment_settles_the_invoice() {
        let mut invoice = finalized_invoice();
        let payment = Payment::new(
            eur(dec!(240.00)),
            Utc::now().date_naive(),
            PaymentMeans::SepaCreditTransfer,
        )
        .unwrap();
        invoice.apply_payment(payment).unwrap();

        assert_eq!(invoice.payment_status(), PaymentStatus::Paid);
        assert_eq!(invoice.remaining_amount().unwrap().amount(), dec!(0.00));
    }

    #[test]
    fn partial_payment_keeps_the_invoice_partial() {
        let mut invoice = finalized_invoice();
        let payment = Payment::new(eur(dec!(100.00)), Utc::now().date_naive(), PaymentMeans::Cash)
            .unwrap();
        invoice.apply_payment(payment).unwrap();

        assert_eq!(invoice.payment_status(), PaymentStatus::Partial);
        assert_eq!(invoice.remaining_amount().unwrap().amount(), dec!(140.00));
    }

    #[test]
    fn overpayment_is_refused() {
        let mut invoice = finalized_invoice();
        let payment = Payment::new(eur(dec!(240.01)), Utc::now().date_naive(), PaymentMeans::Cash)
            .unwrap();
        let err = invoice.apply_payment(payment).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn finalizing_twice_fails() {
        let mut invoice = finalized_invoice();
        let err = invoice.finalize(None).unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));
    }

    #[test]
    fn finalizing_without_lines_fails() {
        let mut invoice = draft_invoice();
        let err = invoice.finalize(None).unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));
    }

    #[test]
    fn finalizing_without_seller_fails() {
        let sequence = InvoiceNumberSequence::new("RE-", 2026).unwrap();
        let mut factory = InvoiceFactory::new(sequence);
        let mut invoice = factory
            .draft(InvoiceTypeCode::Invoice, Currency::from_code("EUR").unwrap())
            .unwrap();
        invoice.set_buyer(snapshot("Kunde AG")).unwrap();
        invoice
            .set_issue_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .unwrap();
        invoice.add_line_item(consulting_line()).unwrap();

        let err = invoice.finalize(None).unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));
    }

    #[test]
    fn finalized_invoices_are_immutable() {
        let mut invoice = finalized_invoice();
        let err = invoice.add_line_item(consulting_line()).unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));

        let line_id = *invoice.lines()[0].id();
        let err = invoice.remove_line_item(line_id).unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));
    }

    #[test]
    fn removing_a_line_renumbers_the_rest() {
        let mut invoice = draft_invoice();
        let first = invoice.add_line_item(consulting_line()).unwrap();
        invoice.add_line_item(consulting_line()).unwrap();
        invoice.add_line_item(consulting_line()).unwrap();

        invoice.remove_line_item(first).unwrap();
        let numbers: Vec<u32> = invoice.lines().iter().map(|l| l.line_number()).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(invoice.totals().line_net().amount(), dec!(400.00));
    }

    #[test]
    fn multi_rate_invoices_get_one_breakdown_per_group() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        invoice
            .add_line_item(
                InvoiceLineItem::new(
                    "Books",
                    Quantity::pieces(3),
                    eur(dec!(10.00)),
                    TaxCategory::Reduced,
                    Percentage::new(dec!(7)).unwrap(),
                    None,
                )
                .unwrap(),
            )
            .unwrap();

        assert_eq!(invoice.tax_breakdowns().len(), 2);
        // 200.00 × 20% + 30.00 × 7% = 40.00 + 2.10
        assert_eq!(invoice.totals().tax_total().amount(), dec!(42.10));
    }

    #[test]
    fn document_allowance_adjusts_its_tax_group() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();

        let early_payment_discount = AllowanceCharge::allowance(eur(dec!(20.00)))
            .unwrap()
            .with_reason("early payment")
            .with_tax(TaxCategory::Standard, Percentage::new(dec!(20)).unwrap())
            .unwrap();
        invoice.add_allowance_charge(early_payment_discount).unwrap();

        let totals = invoice.totals();
        assert_eq!(totals.allowance_total().amount(), dec!(20.00));
        assert_eq!(totals.tax_exclusive().amount(), dec!(180.00));
        // Tax on the reduced base: 180.00 × 20%.
        assert_eq!(totals.tax_total().amount(), dec!(36.00));
        assert_eq!(totals.payable().amount(), dec!(216.00));
    }

    #[test]
    fn document_allowance_without_tax_info_is_refused() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        let bare = AllowanceCharge::allowance(eur(dec!(20.00))).unwrap();
        let err = invoice.add_allowance_charge(bare).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn transmission_advances_through_the_queue() {
        let mut invoice = finalized_invoice();
        invoice.queue_for_transmission().unwrap();
        invoice.mark_transmitting().unwrap();
        invoice.send().unwrap();
        invoice.acknowledge().unwrap();
        assert_eq!(invoice.transmission_status(), TransmissionStatus::Acknowledged);
    }

    #[test]
    fn viewed_documents_can_still_be_acknowledged() {
        let mut invoice = finalized_invoice();
        invoice.send().unwrap();
        invoice.mark_viewed().unwrap();
        invoice.acknowledge().unwrap();
        assert_eq!(invoice.transmission_status(), TransmissionStatus::Acknowledged);
    }

    #[test]
    fn sending_a_draft_fails() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        let err = invoice.send().unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));
    }

    #[test]
    fn rejection_requires_a_sent_document() {
        let mut invoice = finalized_invoice();
        let err = invoice.reject("malformed endpoint").unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));

        invoice.send().unwrap();
        invoice.reject("schema violation").unwrap();
        assert_eq!(invoice.transmission_status(), TransmissionStatus::Rejected);
    }

    #[test]
    fn cancel_is_refused_once_payment_started() {
        let mut invoice = finalized_invoice();
        let payment = Payment::new(eur(dec!(10.00)), Utc::now().date_naive(), PaymentMeans::Cash)
            .unwrap();
        invoice.apply_payment(payment).unwrap();

        let err = invoice.cancel(None).unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));
    }

    #[test]
    fn lifecycle_emits_the_expected_events() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        invoice.finalize(None).unwrap();
        invoice.send().unwrap();

        let events = invoice.take_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], InvoiceEvent::LineItemAdded { line_number: 1, .. }));
        assert!(
            matches!(&events[1], InvoiceEvent::Finalized { payable, .. } if payable.amount() == dec!(240.00))
        );
        assert!(matches!(events[2], InvoiceEvent::Sent { .. }));
        assert!(invoice.pending_events().is_empty());
    }

    #[test]
    fn publish_events_feeds_invoice_facts_to_the_bus() {
        use clearbill_events::InMemoryEventBus;

        let bus = InMemoryEventBus::new();
        let invoice_feed = bus.subscribe_to("invoicing.invoice");

        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        invoice.finalize(None).unwrap();

        let published = invoice.publish_events(&bus).unwrap();
        assert_eq!(published, 2);
        assert!(invoice.pending_events().is_empty());

        assert!(matches!(
            invoice_feed.try_recv().unwrap(),
            InvoiceEvent::LineItemAdded { line_number: 1, .. }
        ));
        match invoice_feed.try_recv().unwrap() {
            InvoiceEvent::Finalized { invoice_id, payable, .. } => {
                assert_eq!(&invoice_id, AggregateRoot::id(&invoice));
                assert_eq!(payable.amount(), dec!(240.00));
            }
            other => panic!("expected Finalized, got {other:?}"),
        }
        assert!(invoice_feed.try_recv().is_err());
    }

    #[test]
    fn validation_results_accumulate_in_history() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();

        let mut result = ValidationResult::new("en16931");
        result.push(ValidationIssue::error("BR-01", "missing specification identifier"));
        invoice.record_validation(result);

        assert_eq!(invoice.validation_history().len(), 1);
        assert!(!invoice.validation_history()[0].is_valid());
        let events = invoice.take_events();
        assert!(matches!(
            events.last(),
            Some(InvoiceEvent::Validated { is_valid: false, error_count: 1, .. })
        ));
    }

    #[test]
    fn output_generation_is_gated_on_finalization() {
        struct StubFormatter;
        impl FormatService for StubFormatter {
            fn render(&self, invoice: &Invoice, _format: OutputFormat) -> DomainResult<Document> {
                Ok(Document {
                    file_name: format!("{}.xml", invoice.number()),
                    media_type: "application/xml".to_string(),
                    bytes: Vec::new(),
                })
            }
        }

        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        let err = invoice
            .generate_output(OutputFormat::UblXml, &StubFormatter)
            .unwrap_err();
        assert!(matches!(err, DomainError::StatePrecondition(_)));

        invoice.finalize(None).unwrap();
        let document = invoice
            .generate_output(OutputFormat::UblXml, &StubFormatter)
            .unwrap();
        assert!(document.file_name.ends_with(".xml"));
    }

    #[test]
    fn rehydration_rejects_tampered_totals() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        let mut state = invoice.to_state();

        let rehydrated = Invoice::from_state(state.clone()).unwrap();
        assert_eq!(rehydrated.totals(), invoice.totals());

        state.totals = InvoiceTotals::compute(
            eur(dec!(100.00)),
            eur(dec!(0.00)),
            eur(dec!(0.00)),
            eur(dec!(20.00)),
            eur(dec!(0.00)),
            eur(dec!(0.00)),
        )
        .unwrap();
        assert!(matches!(
            Invoice::from_state(state).unwrap_err(),
            DomainError::InvariantViolation(_)
        ));
    }

    #[test]
    fn prepaid_and_rounding_flow_into_the_payable() {
        let mut invoice = draft_invoice();
        invoice.add_line_item(consulting_line()).unwrap();
        invoice.set_prepaid(eur(dec!(40.00))).unwrap();
        invoice.set_rounding(eur(dec!(-0.01))).unwrap();
        assert_eq!(invoice.totals().payable().amount(), dec!(199.99));
    }
}
