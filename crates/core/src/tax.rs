//! Tax categories and country-level tax configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::ValueObject;
use crate::error::{DomainError, DomainResult};
use crate::percentage::Percentage;

/// VAT/GST category of a supply (UNCL5305-shaped domain vocabulary).
///
/// Each variant determines whether a rate is meaningful and whether an
/// exemption reason must accompany it; `TaxBreakdown` and `TaxRate` enforce
/// both flags at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    /// Standard rate.
    Standard,
    /// Reduced rate.
    Reduced,
    /// Zero-rated goods or services.
    Zero,
    /// Exempt from tax.
    Exempt,
    /// VAT reverse charge (buyer accounts for the tax).
    ReverseCharge,
    /// Intra-community supply / export outside the tax area.
    Export,
    /// Services outside the scope of tax.
    NotApplicable,
    /// Special scheme (e.g. margin or agricultural flat rate).
    Special,
    /// Jurisdiction-specific category not covered above.
    Custom(String),
}

impl TaxCategory {
    /// Whether a non-trivial rate is expected; categories where this is
    /// `false` must carry a zero rate.
    pub fn requires_rate(&self) -> bool {
        matches!(
            self,
            TaxCategory::Standard | TaxCategory::Reduced | TaxCategory::Special | TaxCategory::Custom(_)
        )
    }

    /// Whether an exemption reason must accompany this category.
    pub fn requires_exemption_reason(&self) -> bool {
        matches!(
            self,
            TaxCategory::Exempt
                | TaxCategory::ReverseCharge
                | TaxCategory::Export
                | TaxCategory::NotApplicable
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaxCategory::Standard => "standard",
            TaxCategory::Reduced => "reduced",
            TaxCategory::Zero => "zero",
            TaxCategory::Exempt => "exempt",
            TaxCategory::ReverseCharge => "reverse_charge",
            TaxCategory::Export => "export",
            TaxCategory::NotApplicable => "not_applicable",
            TaxCategory::Special => "special",
            TaxCategory::Custom(code) => code,
        }
    }
}

impl ValueObject for TaxCategory {}

/// A tax scheme levied by a jurisdiction (e.g. "VAT" in DE, "Sales Tax" in US).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxScheme {
    name: String,
    country_code: String,
}

impl TaxScheme {
    pub fn new(name: impl Into<String>, country_code: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let country_code = country_code.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("tax scheme name cannot be empty"));
        }
        if country_code.len() != 2 || !country_code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "tax scheme country must be an ISO 3166-1 alpha-2 code, got {country_code:?}"
            )));
        }
        Ok(Self { name, country_code })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }
}

impl ValueObject for TaxScheme {}

/// A configured tax rate with an effective date range.
///
/// Mirrors the category/rate coupling of `TaxBreakdown`: categories that
/// forbid a rate must be configured at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    scheme: TaxScheme,
    category: TaxCategory,
    rate: Percentage,
    effective_from: NaiveDate,
    effective_to: Option<NaiveDate>,
}

impl TaxRate {
    pub fn new(
        scheme: TaxScheme,
        category: TaxCategory,
        rate: Percentage,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        if !category.requires_rate() && !rate.is_zero() {
            return Err(DomainError::invariant(format!(
                "tax category {} forbids a rate, got {rate}",
                category.as_str()
            )));
        }
        if let Some(to) = effective_to {
            if to < effective_from {
                return Err(DomainError::validation(format!(
                    "tax rate effective range is inverted: {effective_from}..{to}"
                )));
            }
        }
        Ok(Self {
            scheme,
            category,
            rate,
            effective_from,
            effective_to,
        })
    }

    pub fn scheme(&self) -> &TaxScheme {
        &self.scheme
    }

    pub fn category(&self) -> &TaxCategory {
        &self.category
    }

    pub fn rate(&self) -> Percentage {
        self.rate
    }

    pub fn effective_from(&self) -> NaiveDate {
        self.effective_from
    }

    pub fn effective_to(&self) -> Option<NaiveDate> {
        self.effective_to
    }

    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date <= to)
    }
}

impl ValueObject for TaxRate {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn vat_de() -> TaxScheme {
        TaxScheme::new("VAT", "DE").unwrap()
    }

    #[test]
    fn category_flags_match_en16931_semantics() {
        assert!(TaxCategory::Standard.requires_rate());
        assert!(!TaxCategory::Standard.requires_exemption_reason());
        assert!(!TaxCategory::Exempt.requires_rate());
        assert!(TaxCategory::Exempt.requires_exemption_reason());
        assert!(!TaxCategory::Zero.requires_exemption_reason());
        assert!(TaxCategory::ReverseCharge.requires_exemption_reason());
    }

    #[test]
    fn rate_forbidding_category_must_be_zero() {
        let err = TaxRate::new(
            vat_de(),
            TaxCategory::Exempt,
            Percentage::new(dec!(19)).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        assert!(
            TaxRate::new(
                vat_de(),
                TaxCategory::Exempt,
                Percentage::ZERO,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                None,
            )
            .is_ok()
        );
    }

    #[test]
    fn effective_range_is_inclusive_on_both_ends() {
        let rate = TaxRate::new(
            vat_de(),
            TaxCategory::Standard,
            Percentage::new(dec!(19)).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
        )
        .unwrap();

        assert!(rate.is_effective_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(rate.is_effective_on(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!rate.is_effective_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(!rate.is_effective_on(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }

    #[test]
    fn inverted_effective_range_is_rejected() {
        let err = TaxRate::new(
            vat_de(),
            TaxCategory::Standard,
            Percentage::new(dec!(19)).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
