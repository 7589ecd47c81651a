//! Postal addresses.

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, ValueObject};

/// A postal address.
///
/// City, postal code and an ISO 3166-1 alpha-2 country code are mandatory;
/// everything else is optional detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: Option<String>,
    additional: Option<String>,
    city: String,
    postal_code: String,
    region: Option<String>,
    country_code: String,
}

impl Address {
    pub fn new(
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> DomainResult<Self> {
        let city = city.into();
        let postal_code = postal_code.into();
        let country_code = country_code.into();

        if city.trim().is_empty() {
            return Err(DomainError::validation("address city cannot be empty"));
        }
        if postal_code.trim().is_empty() {
            return Err(DomainError::validation("address postal code cannot be empty"));
        }
        if country_code.len() != 2 || !country_code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "country must be an ISO 3166-1 alpha-2 code, got {country_code:?}"
            )));
        }

        Ok(Self {
            street: None,
            additional: None,
            city,
            postal_code,
            region: None,
            country_code,
        })
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn with_additional(mut self, additional: impl Into<String>) -> Self {
        self.additional = Some(additional.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn street(&self) -> Option<&str> {
        self.street.as_deref()
    }

    pub fn additional(&self) -> Option<&str> {
        self.additional.as_deref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }
}

impl ValueObject for Address {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mandatory_fields_are_enforced() {
        assert!(Address::new("", "10115", "DE").is_err());
        assert!(Address::new("Berlin", " ", "DE").is_err());
        assert!(Address::new("Berlin", "10115", "DEU").is_err());
        assert!(Address::new("Berlin", "10115", "de").is_err());
    }

    #[test]
    fn optional_detail_is_chainable() {
        let address = Address::new("Berlin", "10115", "DE")
            .unwrap()
            .with_street("Friedrichstraße 123")
            .with_region("Berlin");
        assert_eq!(address.street(), Some("Friedrichstraße 123"));
        assert_eq!(address.country_code(), "DE");
    }
}
