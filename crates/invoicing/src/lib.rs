//! Invoicing domain module.
//!
//! The `Invoice` aggregate root and everything it is built from: monetary
//! totals, tax breakdowns, allowances/charges, line items, payments and the
//! audit trail. Deterministic domain logic only — no IO, no HTTP, no storage.

pub mod allowance;
pub mod audit;
pub mod events;
pub mod exchange;
pub mod factory;
pub mod invoice;
pub mod line_item;
pub mod number;
pub mod output;
pub mod payment;
pub mod reference;
pub mod repository;
pub mod status;
pub mod tax_breakdown;
pub mod totals;

pub use allowance::AllowanceCharge;
pub use audit::{AuditEntry, AuditKind};
pub use events::InvoiceEvent;
pub use exchange::ExchangeRate;
pub use factory::InvoiceFactory;
pub use invoice::{Invoice, InvoiceState};
pub use line_item::{BillingPeriod, InvoiceLineItem, ItemClassification, LineItemId, LineItemUpdate};
pub use number::{InvoiceNumber, InvoiceNumberSequence};
pub use output::{Document, FormatService};
pub use payment::{Payment, PaymentInstructions, PaymentMeans};
pub use reference::{DocumentReference, ReferenceKind};
pub use repository::{InvoiceRepository, InvoiceSearchCriteria};
pub use status::{DocumentStatus, PaymentStatus, TransmissionStatus};
pub use tax_breakdown::{AMOUNT_TOLERANCE, TaxBreakdown};
pub use totals::InvoiceTotals;
