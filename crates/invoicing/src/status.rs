//! The three independent status dimensions of an invoice.

use serde::{Deserialize, Serialize};

/// Document lifecycle: editable draft, immutable finalized, cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Finalized,
    Cancelled,
}

impl DocumentStatus {
    /// Line items, allowances and document fields may only change in DRAFT.
    pub fn is_editable(&self) -> bool {
        matches!(self, DocumentStatus::Draft)
    }
}

/// Progress of the document through the delivery network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransmissionStatus {
    None,
    Queued,
    Transmitting,
    Sent,
    /// The buyer opened the document (delivery-channel feedback).
    Viewed,
    Acknowledged,
    Rejected,
}

impl TransmissionStatus {
    /// Whether the document has left the building.
    pub fn is_dispatched(&self) -> bool {
        !matches!(self, TransmissionStatus::None | TransmissionStatus::Queued | TransmissionStatus::Transmitting)
    }
}

/// Settlement progress, advancing independently of transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}
