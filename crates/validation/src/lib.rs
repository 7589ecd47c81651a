//! Staged invoice validation pipeline.
//!
//! Four stages, run strictly in order: structural (document shape) →
//! business rules (EN 16931 BR equivalents) → profile/CIUS rules → custom
//! rules supplied with the profile. A structural failure short-circuits;
//! everything after accumulates, so one call reports every problem at once.
//! The outcome model (`ValidationResult`/`ValidationIssue`/`Severity`) lives
//! in `clearbill-core` so the `Invoice` aggregate can keep its history.

pub mod profile;
pub mod rules;
pub mod service;

pub use profile::{ValidationProfile, ValidationRule, custom_rule};
pub use service::{InvoiceValidator, ValidationService};
