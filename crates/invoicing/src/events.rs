//! Domain events emitted by the `Invoice` aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clearbill_core::{InvoiceId, Money};
use clearbill_events::Event;

use crate::line_item::LineItemId;
use crate::number::InvoiceNumber;
use crate::status::PaymentStatus;

/// Facts about an invoice, drained from the aggregate outbox after
/// persistence and handed to audit/notification/webhook consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    LineItemAdded {
        invoice_id: InvoiceId,
        line_id: LineItemId,
        line_number: u32,
        occurred_at: DateTime<Utc>,
    },
    LineItemUpdated {
        invoice_id: InvoiceId,
        line_id: LineItemId,
        occurred_at: DateTime<Utc>,
    },
    LineItemRemoved {
        invoice_id: InvoiceId,
        line_id: LineItemId,
        occurred_at: DateTime<Utc>,
    },
    Finalized {
        invoice_id: InvoiceId,
        number: InvoiceNumber,
        payable: Money,
        occurred_at: DateTime<Utc>,
    },
    Sent {
        invoice_id: InvoiceId,
        occurred_at: DateTime<Utc>,
    },
    PaymentApplied {
        invoice_id: InvoiceId,
        amount: Money,
        remaining: Money,
        status: PaymentStatus,
        occurred_at: DateTime<Utc>,
    },
    Validated {
        invoice_id: InvoiceId,
        profile: String,
        is_valid: bool,
        error_count: usize,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::LineItemAdded { .. } => "invoicing.invoice.line_item_added",
            InvoiceEvent::LineItemUpdated { .. } => "invoicing.invoice.line_item_updated",
            InvoiceEvent::LineItemRemoved { .. } => "invoicing.invoice.line_item_removed",
            InvoiceEvent::Finalized { .. } => "invoicing.invoice.finalized",
            InvoiceEvent::Sent { .. } => "invoicing.invoice.sent",
            InvoiceEvent::PaymentApplied { .. } => "invoicing.invoice.payment_applied",
            InvoiceEvent::Validated { .. } => "invoicing.invoice.validated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::LineItemAdded { occurred_at, .. }
            | InvoiceEvent::LineItemUpdated { occurred_at, .. }
            | InvoiceEvent::LineItemRemoved { occurred_at, .. }
            | InvoiceEvent::Finalized { occurred_at, .. }
            | InvoiceEvent::Sent { occurred_at, .. }
            | InvoiceEvent::PaymentApplied { occurred_at, .. }
            | InvoiceEvent::Validated { occurred_at, .. } => *occurred_at,
        }
    }
}
