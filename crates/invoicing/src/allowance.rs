//! Allowances (discounts) and charges (surcharges).

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, Money, Percentage, TaxCategory, ValueObject};

use crate::tax_breakdown::AMOUNT_TOLERANCE;

/// A document- or line-level allowance or charge.
///
/// The amount is always non-negative; [`AllowanceCharge::signed_amount`]
/// carries the sign (charges add, allowances subtract). When a percentage and
/// base amount are given, `amount` must reconcile with `percentage × base`
/// within [`AMOUNT_TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceCharge {
    is_charge: bool,
    amount: Money,
    base_amount: Option<Money>,
    percentage: Option<Percentage>,
    reason: Option<String>,
    tax_category: Option<TaxCategory>,
    tax_rate: Option<Percentage>,
}

impl AllowanceCharge {
    pub fn allowance(amount: Money) -> DomainResult<Self> {
        Self::new(false, amount)
    }

    pub fn charge(amount: Money) -> DomainResult<Self> {
        Self::new(true, amount)
    }

    fn new(is_charge: bool, amount: Money) -> DomainResult<Self> {
        if amount.is_negative() {
            return Err(DomainError::validation(format!(
                "allowance/charge amount must not be negative, got {amount}"
            )));
        }
        Ok(Self {
            is_charge,
            amount,
            base_amount: None,
            percentage: None,
            reason: None,
            tax_category: None,
            tax_rate: None,
        })
    }

    /// Attach the percentage/base pair the amount was computed from.
    pub fn with_basis(mut self, base_amount: Money, percentage: Percentage) -> DomainResult<Self> {
        if base_amount.currency() != self.amount.currency() {
            return Err(DomainError::currency_mismatch(
                self.amount.currency().code(),
                base_amount.currency().code(),
            ));
        }
        let expected = percentage.of(&base_amount)?;
        let delta = (self.amount.amount() - expected.amount()).abs();
        if delta > AMOUNT_TOLERANCE {
            return Err(DomainError::invariant(format!(
                "amount {} does not reconcile with {percentage} of {}",
                self.amount.amount(),
                base_amount.amount()
            )));
        }
        self.base_amount = Some(base_amount);
        self.percentage = Some(percentage);
        Ok(self)
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_tax(mut self, category: TaxCategory, rate: Percentage) -> DomainResult<Self> {
        if !category.requires_rate() && !rate.is_zero() {
            return Err(DomainError::invariant(format!(
                "tax category {} forbids a rate, got {rate}",
                category.as_str()
            )));
        }
        self.tax_category = Some(category);
        self.tax_rate = Some(rate);
        Ok(self)
    }

    pub fn is_charge(&self) -> bool {
        self.is_charge
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    /// Effective contribution: positive for charges, negative for allowances.
    pub fn signed_amount(&self) -> Money {
        if self.is_charge {
            self.amount.clone()
        } else {
            self.amount.negate()
        }
    }

    pub fn base_amount(&self) -> Option<&Money> {
        self.base_amount.as_ref()
    }

    pub fn percentage(&self) -> Option<Percentage> {
        self.percentage
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn tax_category(&self) -> Option<&TaxCategory> {
        self.tax_category.as_ref()
    }

    pub fn tax_rate(&self) -> Option<Percentage> {
        self.tax_rate
    }
}

impl ValueObject for AllowanceCharge {}

#[cfg(test)]
mod tests {
    use super::*;
    use clearbill_core::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::from_code("EUR").unwrap()).unwrap()
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(AllowanceCharge::allowance(eur(dec!(-1.00))).is_err());
    }

    #[test]
    fn sign_follows_kind() {
        let charge = AllowanceCharge::charge(eur(dec!(5.00))).unwrap();
        assert_eq!(charge.signed_amount().amount(), dec!(5.00));

        let allowance = AllowanceCharge::allowance(eur(dec!(5.00))).unwrap();
        assert_eq!(allowance.signed_amount().amount(), dec!(-5.00));
    }

    #[test]
    fn basis_must_reconcile_with_the_amount() {
        // 10% of 200.00 = 20.00
        let ok = AllowanceCharge::allowance(eur(dec!(20.00)))
            .unwrap()
            .with_basis(eur(dec!(200.00)), Percentage::new(dec!(10)).unwrap());
        assert!(ok.is_ok());

        let err = AllowanceCharge::allowance(eur(dec!(25.00)))
            .unwrap()
            .with_basis(eur(dec!(200.00)), Percentage::new(dec!(10)).unwrap())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
