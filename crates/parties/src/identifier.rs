//! Party identifiers (GLN, DUNS, VAT, LEI, national registers).

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, ValueObject};

/// An identifier a party is known by under some scheme.
///
/// Uniqueness within a party is by `(scheme, value)`; the aggregate enforces
/// it. Construction only requires both parts to be present — scheme-specific
/// format problems are reported by [`PartyIdentifier::format_issue`] so a
/// party with a sloppy legacy identifier can still be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyIdentifier {
    scheme: String,
    value: String,
}

impl PartyIdentifier {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> DomainResult<Self> {
        let scheme = scheme.into().to_ascii_uppercase();
        let value = value.into();
        if scheme.trim().is_empty() {
            return Err(DomainError::validation("identifier scheme cannot be empty"));
        }
        if value.trim().is_empty() {
            return Err(DomainError::validation("identifier value cannot be empty"));
        }
        Ok(Self { scheme, value })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this identifier matches the given scheme/value pair.
    pub fn matches(&self, scheme: &str, value: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme) && self.value == value
    }

    /// Scheme-specific format problem, if any (non-fatal; surfaced as a
    /// warning by `Party::validate_identifiers`).
    pub fn format_issue(&self) -> Option<String> {
        let digits_only = self.value.bytes().all(|b| b.is_ascii_digit());
        match self.scheme.as_str() {
            "GLN" if self.value.len() != 13 || !digits_only => {
                Some(format!("GLN should be 13 digits, got {:?}", self.value))
            }
            "DUNS" if self.value.len() != 9 || !digits_only => {
                Some(format!("DUNS should be 9 digits, got {:?}", self.value))
            }
            "LEI" if self.value.len() != 20 => {
                Some(format!("LEI should be 20 characters, got {:?}", self.value))
            }
            "VAT" if self.value.len() < 4
                || !self.value.as_bytes()[..2].iter().all(|b| b.is_ascii_uppercase()) =>
            {
                Some(format!(
                    "VAT identifier should start with a country prefix, got {:?}",
                    self.value
                ))
            }
            _ => None,
        }
    }
}

impl ValueObject for PartyIdentifier {}

impl core::fmt::Display for PartyIdentifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.scheme, self.value)
    }
}

/// Outcome of `Party::validate_identifiers`: fatal errors plus advisory
/// warnings, accumulated rather than short-circuited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl IdentifierReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_normalized_to_uppercase() {
        let id = PartyIdentifier::new("gln", "4012345000009").unwrap();
        assert_eq!(id.scheme(), "GLN");
        assert!(id.matches("Gln", "4012345000009"));
    }

    #[test]
    fn format_issues_are_advisory_not_fatal() {
        let id = PartyIdentifier::new("GLN", "12345").unwrap();
        assert!(id.format_issue().is_some());

        let ok = PartyIdentifier::new("GLN", "4012345000009").unwrap();
        assert!(ok.format_issue().is_none());
    }

    #[test]
    fn unknown_schemes_have_no_format_rules() {
        let id = PartyIdentifier::new("HRB", "HRB 123456 B").unwrap();
        assert!(id.format_issue().is_none());
    }
}
