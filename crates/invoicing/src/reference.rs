//! References to related business documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, ValueObject};

/// What a referenced document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    PurchaseOrder,
    Contract,
    DispatchAdvice,
    ReceivingAdvice,
    /// The invoice a credit note or corrective invoice amends.
    PrecedingInvoice,
    Project,
}

/// A reference to another document by its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    id: String,
    kind: ReferenceKind,
    issue_date: Option<NaiveDate>,
    uri: Option<String>,
}

impl DocumentReference {
    pub fn new(id: impl Into<String>, kind: ReferenceKind) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::validation("document reference id cannot be empty"));
        }
        Ok(Self {
            id,
            kind,
            issue_date: None,
            uri: None,
        })
    }

    pub fn with_issue_date(mut self, issue_date: NaiveDate) -> Self {
        self.issue_date = Some(issue_date);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

impl ValueObject for DocumentReference {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_id_must_be_present() {
        assert!(DocumentReference::new("  ", ReferenceKind::PurchaseOrder).is_err());
        assert!(DocumentReference::new("PO-4711", ReferenceKind::PurchaseOrder).is_ok());
    }
}
