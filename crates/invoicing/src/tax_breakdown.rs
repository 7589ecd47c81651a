//! Per-category tax breakdowns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, Money, Percentage, TaxCategory, ValueObject};

/// Reconciliation tolerance for computed monetary amounts: 0.01 currency units.
pub const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Tax subtotal for one (category, rate) group.
///
/// `tax_amount` must equal `taxable_amount × rate / 100` within
/// [`AMOUNT_TOLERANCE`]; categories that forbid a rate must carry a zero rate,
/// and categories demanding an exemption reason must provide one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    taxable_amount: Money,
    tax_amount: Money,
    category: TaxCategory,
    rate: Percentage,
    exemption_reason: Option<String>,
}

impl TaxBreakdown {
    pub fn new(
        taxable_amount: Money,
        tax_amount: Money,
        category: TaxCategory,
        rate: Percentage,
        exemption_reason: Option<String>,
    ) -> DomainResult<Self> {
        if taxable_amount.currency() != tax_amount.currency() {
            return Err(DomainError::currency_mismatch(
                taxable_amount.currency().code(),
                tax_amount.currency().code(),
            ));
        }
        if !category.requires_rate() && !rate.is_zero() {
            return Err(DomainError::invariant(format!(
                "tax category {} forbids a rate, got {rate}",
                category.as_str()
            )));
        }
        if category.requires_exemption_reason()
            && exemption_reason.as_deref().is_none_or(|r| r.trim().is_empty())
        {
            return Err(DomainError::invariant(format!(
                "tax category {} requires an exemption reason",
                category.as_str()
            )));
        }

        let expected = rate.of(&taxable_amount)?;
        let delta = (tax_amount.amount() - expected.amount()).abs();
        if delta > AMOUNT_TOLERANCE {
            return Err(DomainError::invariant(format!(
                "tax amount {} deviates from {} × {rate} = {} by more than {AMOUNT_TOLERANCE}",
                tax_amount.amount(),
                taxable_amount.amount(),
                expected.amount()
            )));
        }

        Ok(Self {
            taxable_amount,
            tax_amount,
            category,
            rate,
            exemption_reason,
        })
    }

    pub fn taxable_amount(&self) -> &Money {
        &self.taxable_amount
    }

    pub fn tax_amount(&self) -> &Money {
        &self.tax_amount
    }

    pub fn category(&self) -> &TaxCategory {
        &self.category
    }

    pub fn rate(&self) -> Percentage {
        self.rate
    }

    pub fn exemption_reason(&self) -> Option<&str> {
        self.exemption_reason.as_deref()
    }
}

impl ValueObject for TaxBreakdown {}

#[cfg(test)]
mod tests {
    use super::*;
    use clearbill_core::Currency;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::from_code("EUR").unwrap()).unwrap()
    }

    #[test]
    fn tax_must_reconcile_within_a_cent() {
        // 200.00 × 20% = 40.00; 40.01 is within tolerance, 40.02 is not.
        assert!(
            TaxBreakdown::new(
                eur(dec!(200.00)),
                eur(dec!(40.01)),
                TaxCategory::Standard,
                Percentage::new(dec!(20)).unwrap(),
                None,
            )
            .is_ok()
        );
        let err = TaxBreakdown::new(
            eur(dec!(200.00)),
            eur(dec!(40.02)),
            TaxCategory::Standard,
            Percentage::new(dec!(20)).unwrap(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn rate_forbidding_categories_must_be_zero_rated() {
        let err = TaxBreakdown::new(
            eur(dec!(100.00)),
            eur(dec!(19.00)),
            TaxCategory::ReverseCharge,
            Percentage::new(dec!(19)).unwrap(),
            Some("Reverse charge".into()),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        assert!(
            TaxBreakdown::new(
                eur(dec!(100.00)),
                eur(dec!(0.00)),
                TaxCategory::ReverseCharge,
                Percentage::ZERO,
                Some("Reverse charge".into()),
            )
            .is_ok()
        );
    }

    #[test]
    fn exemption_reason_is_mandatory_where_the_category_demands_it() {
        let err = TaxBreakdown::new(
            eur(dec!(100.00)),
            eur(dec!(0.00)),
            TaxCategory::Exempt,
            Percentage::ZERO,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        // Zero-rated supplies need no reason.
        assert!(
            TaxBreakdown::new(
                eur(dec!(100.00)),
                eur(dec!(0.00)),
                TaxCategory::Zero,
                Percentage::ZERO,
                None,
            )
            .is_ok()
        );
    }

    #[test]
    fn currencies_must_match() {
        let usd = Money::new(dec!(20.00), Currency::from_code("USD").unwrap()).unwrap();
        let err = TaxBreakdown::new(
            eur(dec!(100.00)),
            usd,
            TaxCategory::Standard,
            Percentage::new(dec!(20)).unwrap(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::CurrencyMismatch { .. }));
    }
}
