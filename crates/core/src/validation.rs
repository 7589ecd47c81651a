//! Validation outcome model.
//!
//! Data-quality findings are values, not errors: a `ValidationResult` carries
//! every issue found in one pass so callers can render a complete report and
//! decide themselves whether to block finalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::ValueObject;

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single validation finding, stamped with the violated rule's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    code: String,
    severity: Severity,
    message: String,
    path: Option<String>,
    business_term: Option<String>,
    value: Option<String>,
    suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            path: None,
            business_term: None,
            value: None,
            suggestion: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_business_term(mut self, term: impl Into<String>) -> Self {
        self.business_term = Some(term.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn business_term(&self) -> Option<&str> {
        self.business_term.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }
}

impl ValueObject for ValidationIssue {}

/// Aggregated outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    profile: String,
    issues: Vec<ValidationIssue>,
    checked_at: DateTime<Utc>,
}

impl ValidationResult {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            issues: Vec::new(),
            checked_at: Utc::now(),
        }
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Valid means: not a single error across all stages that ran.
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|issue| issue.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.by_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.by_severity(Severity::Info)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity() == severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_is_absence_of_errors() {
        let mut result = ValidationResult::new("en16931");
        assert!(result.is_valid());

        result.push(ValidationIssue::warning("BR-XX", "advisory"));
        assert!(result.is_valid());

        result.push(ValidationIssue::error("BR-01", "missing number"));
        assert!(!result.is_valid());
        assert_eq!(result.errors().count(), 1);
        assert_eq!(result.warnings().count(), 1);
    }
}
