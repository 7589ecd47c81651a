//! Invoice numbers and the gapless numbering sequence.

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, ValueObject};

/// A validated invoice number.
///
/// Non-empty, at most 30 characters, no interior whitespace — the common
/// denominator of what downstream standards accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::validation("invoice number cannot be empty"));
        }
        if value.len() > 30 {
            return Err(DomainError::validation(format!(
                "invoice number is limited to 30 characters, got {}",
                value.len()
            )));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(format!(
                "invoice number must not contain whitespace, got {value:?}"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for InvoiceNumber {}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gapless `PREFIX-YEAR-NNNNN` numbering.
///
/// The counter only ever moves forward; skipping numbers is not possible
/// through this type, which is what tax law expects of an invoice sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumberSequence {
    prefix: String,
    year: i32,
    counter: u32,
}

impl InvoiceNumberSequence {
    pub fn new(prefix: impl Into<String>, year: i32) -> DomainResult<Self> {
        let prefix = prefix.into();
        // The widest number produced is prefix + 4-digit year + "-" + 5 digits.
        if prefix.len() > 20 || prefix.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(format!(
                "sequence prefix must be short and whitespace-free, got {prefix:?}"
            )));
        }
        Ok(Self {
            prefix,
            year,
            counter: 0,
        })
    }

    /// Resume a persisted sequence at its last issued counter value.
    pub fn resume(prefix: impl Into<String>, year: i32, counter: u32) -> DomainResult<Self> {
        let mut sequence = Self::new(prefix, year)?;
        sequence.counter = counter;
        Ok(sequence)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn last_counter(&self) -> u32 {
        self.counter
    }

    /// Issue the next number in the sequence.
    pub fn next_number(&mut self) -> DomainResult<InvoiceNumber> {
        self.counter += 1;
        InvoiceNumber::new(format!("{}{}-{:05}", self.prefix, self.year, self.counter))
    }
}
