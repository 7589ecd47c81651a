//! Immutable audit trail records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clearbill_core::{DomainError, DomainResult, UserId};

/// What happened, for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Created,
    LineItemAdded,
    LineItemUpdated,
    LineItemRemoved,
    AllowanceChargeAdded,
    AllowanceChargeRemoved,
    Finalized,
    Queued,
    Transmitting,
    Sent,
    Viewed,
    Acknowledged,
    Rejected,
    Cancelled,
    PaymentApplied,
    Validated,
}

/// One entry in an invoice's audit history.
///
/// Entries are append-only and never mutated; the timestamp may not lie in
/// the future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    id: Uuid,
    at: DateTime<Utc>,
    kind: AuditKind,
    description: String,
    status_before: Option<String>,
    status_after: Option<String>,
    actor: Option<UserId>,
}

impl AuditEntry {
    pub fn new(kind: AuditKind, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            at: Utc::now(),
            kind,
            description: description.into(),
            status_before: None,
            status_after: None,
            actor: None,
        }
    }

    /// Rebuild a persisted entry; the timestamp must not be in the future.
    pub fn from_parts(
        id: Uuid,
        at: DateTime<Utc>,
        kind: AuditKind,
        description: impl Into<String>,
        status_before: Option<String>,
        status_after: Option<String>,
        actor: Option<UserId>,
    ) -> DomainResult<Self> {
        if at > Utc::now() {
            return Err(DomainError::validation(format!(
                "audit timestamp {at} lies in the future"
            )));
        }
        Ok(Self {
            id,
            at,
            kind,
            description: description.into(),
            status_before,
            status_after,
            actor,
        })
    }

    pub fn with_status_change(
        mut self,
        before: impl core::fmt::Debug,
        after: impl core::fmt::Debug,
    ) -> Self {
        self.status_before = Some(format!("{before:?}"));
        self.status_after = Some(format!("{after:?}"));
        self
    }

    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn entry_id(&self) -> Uuid {
        self.id
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn kind(&self) -> AuditKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status_before(&self) -> Option<&str> {
        self.status_before.as_deref()
    }

    pub fn status_after(&self) -> Option<&str> {
        self.status_after.as_deref()
    }

    pub fn actor(&self) -> Option<UserId> {
        self.actor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn future_timestamps_are_rejected_on_rehydration() {
        let err = AuditEntry::from_parts(
            Uuid::now_v7(),
            Utc::now() + Duration::hours(1),
            AuditKind::Finalized,
            "finalized",
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn status_change_is_recorded_as_text() {
        use crate::status::DocumentStatus;

        let entry = AuditEntry::new(AuditKind::Finalized, "invoice finalized")
            .with_status_change(DocumentStatus::Draft, DocumentStatus::Finalized);
        assert_eq!(entry.status_before(), Some("Draft"));
        assert_eq!(entry.status_after(), Some("Finalized"));
    }
}
