//! Electronic delivery endpoints: electronic addresses and network ids.

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, ElectronicAddressScheme, ValueObject};

/// An electronic address under a known scheme, format-checked per scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectronicAddress {
    scheme: ElectronicAddressScheme,
    value: String,
}

impl ElectronicAddress {
    pub fn new(scheme: ElectronicAddressScheme, value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("electronic address cannot be empty"));
        }
        match scheme {
            ElectronicAddressScheme::Email => {
                if !value.contains('@') {
                    return Err(DomainError::validation(format!(
                        "email endpoint must contain '@', got {value:?}"
                    )));
                }
            }
            ElectronicAddressScheme::Gln => {
                if value.len() != 13 || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DomainError::validation(format!(
                        "GLN endpoint must be 13 digits, got {value:?}"
                    )));
                }
            }
            ElectronicAddressScheme::Duns => {
                if value.len() != 9 || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DomainError::validation(format!(
                        "DUNS endpoint must be 9 digits, got {value:?}"
                    )));
                }
            }
            ElectronicAddressScheme::VatNumber => {
                if value.len() < 4 || !value.as_bytes()[..2].iter().all(|b| b.is_ascii_uppercase()) {
                    return Err(DomainError::validation(format!(
                        "VAT endpoint must start with a country prefix, got {value:?}"
                    )));
                }
            }
        }
        Ok(Self { scheme, value })
    }

    pub fn scheme(&self) -> ElectronicAddressScheme {
        self.scheme
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl ValueObject for ElectronicAddress {}

/// Delivery-network participant identifier (Peppol endpoint id).
///
/// The scheme id is an EAS code: four digits (ISO 6523 ICD) or a two-letter
/// code such as `EM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentifier {
    scheme_id: String,
    value: String,
}

impl NetworkIdentifier {
    pub fn new(scheme_id: impl Into<String>, value: impl Into<String>) -> DomainResult<Self> {
        let scheme_id = scheme_id.into();
        let value = value.into();

        let four_digit = scheme_id.len() == 4 && scheme_id.bytes().all(|b| b.is_ascii_digit());
        let two_letter = scheme_id.len() == 2 && scheme_id.bytes().all(|b| b.is_ascii_uppercase());
        if !four_digit && !two_letter {
            return Err(DomainError::validation(format!(
                "network scheme id must be an EAS code, got {scheme_id:?}"
            )));
        }
        if value.trim().is_empty() {
            return Err(DomainError::validation("network identifier cannot be empty"));
        }
        Ok(Self { scheme_id, value })
    }

    pub fn scheme_id(&self) -> &str {
        &self.scheme_id
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl ValueObject for NetworkIdentifier {}

impl core::fmt::Display for NetworkIdentifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.scheme_id, self.value)
    }
}
