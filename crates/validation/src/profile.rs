//! Validation profiles and caller-supplied rules.

use std::sync::Arc;

use clearbill_core::{Severity, ValidationIssue};
use clearbill_invoicing::Invoice;

/// A rule the caller plugs into the pipeline's custom stage.
pub trait ValidationRule: Send + Sync {
    /// The code stamped onto issues this rule produces.
    fn code(&self) -> &str;

    /// Evaluate against an invoice; an empty result means the rule passed.
    fn evaluate(&self, invoice: &Invoice) -> Vec<ValidationIssue>;
}

/// Build a rule from a predicate: the issue is produced when the predicate
/// returns `false`.
pub fn custom_rule<F>(
    code: impl Into<String>,
    severity: Severity,
    message: impl Into<String>,
    predicate: F,
) -> Arc<dyn ValidationRule>
where
    F: Fn(&Invoice) -> bool + Send + Sync + 'static,
{
    Arc::new(PredicateRule {
        code: code.into(),
        severity,
        message: message.into(),
        predicate,
    })
}

struct PredicateRule<F> {
    code: String,
    severity: Severity,
    message: String,
    predicate: F,
}

impl<F> ValidationRule for PredicateRule<F>
where
    F: Fn(&Invoice) -> bool + Send + Sync,
{
    fn code(&self) -> &str {
        &self.code
    }

    fn evaluate(&self, invoice: &Invoice) -> Vec<ValidationIssue> {
        if (self.predicate)(invoice) {
            Vec::new()
        } else {
            vec![ValidationIssue::new(&self.code, self.severity, &self.message)]
        }
    }
}

/// A validation profile: which standard's rule set to apply, where its
/// schema/schematron artifacts live, and any custom rules to run last.
///
/// The schema paths are opaque to the core — the XSD/Schematron engines are
/// external collaborators; the structural stage here checks document shape.
#[derive(Clone)]
pub struct ValidationProfile {
    name: String,
    standard: String,
    schema_path: Option<String>,
    schematron_path: Option<String>,
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl ValidationProfile {
    pub fn new(name: impl Into<String>, standard: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            standard: standard.into(),
            schema_path: None,
            schematron_path: None,
            rules: Vec::new(),
        }
    }

    pub fn with_schema_path(mut self, path: impl Into<String>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    pub fn with_schematron_path(mut self, path: impl Into<String>) -> Self {
        self.schematron_path = Some(path.into());
        self
    }

    pub fn with_rule(mut self, rule: Arc<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn standard(&self) -> &str {
        &self.standard
    }

    pub fn schema_path(&self) -> Option<&str> {
        self.schema_path.as_deref()
    }

    pub fn schematron_path(&self) -> Option<&str> {
        self.schematron_path.as_deref()
    }

    pub fn rules(&self) -> &[Arc<dyn ValidationRule>] {
        &self.rules
    }
}

impl core::fmt::Debug for ValidationProfile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidationProfile")
            .field("name", &self.name)
            .field("standard", &self.standard)
            .field("schema_path", &self.schema_path)
            .field("schematron_path", &self.schematron_path)
            .field("rules", &self.rules.len())
            .finish()
    }
}
