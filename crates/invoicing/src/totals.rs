//! Document totals.

use serde::{Deserialize, Serialize};

use clearbill_core::{Currency, DomainError, DomainResult, Money, ValueObject};

/// The nine monetary totals of an invoice, all in the document currency.
///
/// The identities are exact, with no tolerance:
///
/// ```text
/// tax_exclusive = line_net − allowance_total + charge_total
/// tax_inclusive = tax_exclusive + tax_total
/// payable       = tax_inclusive − prepaid + rounding
/// ```
///
/// Construction fails if any identity does not hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    line_net: Money,
    allowance_total: Money,
    charge_total: Money,
    tax_exclusive: Money,
    tax_total: Money,
    tax_inclusive: Money,
    prepaid: Money,
    rounding: Money,
    payable: Money,
}

impl InvoiceTotals {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        line_net: Money,
        allowance_total: Money,
        charge_total: Money,
        tax_exclusive: Money,
        tax_total: Money,
        tax_inclusive: Money,
        prepaid: Money,
        rounding: Money,
        payable: Money,
    ) -> DomainResult<Self> {
        let fields = [
            &line_net,
            &allowance_total,
            &charge_total,
            &tax_exclusive,
            &tax_total,
            &tax_inclusive,
            &prepaid,
            &rounding,
            &payable,
        ];
        let currency = line_net.currency();
        for field in fields {
            if field.currency() != currency {
                return Err(DomainError::currency_mismatch(
                    currency.code(),
                    field.currency().code(),
                ));
            }
        }

        let expected_exclusive = line_net.subtract(&allowance_total)?.add(&charge_total)?;
        if tax_exclusive != expected_exclusive {
            return Err(DomainError::invariant(format!(
                "tax-exclusive total {} must equal line net − allowances + charges = {}",
                tax_exclusive.amount(),
                expected_exclusive.amount()
            )));
        }
        let expected_inclusive = tax_exclusive.add(&tax_total)?;
        if tax_inclusive != expected_inclusive {
            return Err(DomainError::invariant(format!(
                "tax-inclusive total {} must equal tax-exclusive + tax = {}",
                tax_inclusive.amount(),
                expected_inclusive.amount()
            )));
        }
        let expected_payable = tax_inclusive.subtract(&prepaid)?.add(&rounding)?;
        if payable != expected_payable {
            return Err(DomainError::invariant(format!(
                "payable {} must equal tax-inclusive − prepaid + rounding = {}",
                payable.amount(),
                expected_payable.amount()
            )));
        }

        Ok(Self {
            line_net,
            allowance_total,
            charge_total,
            tax_exclusive,
            tax_total,
            tax_inclusive,
            prepaid,
            rounding,
            payable,
        })
    }

    /// Derive the dependent totals from the independent ones.
    pub fn compute(
        line_net: Money,
        allowance_total: Money,
        charge_total: Money,
        tax_total: Money,
        prepaid: Money,
        rounding: Money,
    ) -> DomainResult<Self> {
        let tax_exclusive = line_net.subtract(&allowance_total)?.add(&charge_total)?;
        let tax_inclusive = tax_exclusive.add(&tax_total)?;
        let payable = tax_inclusive.subtract(&prepaid)?.add(&rounding)?;
        Self::new(
            line_net,
            allowance_total,
            charge_total,
            tax_exclusive,
            tax_total,
            tax_inclusive,
            prepaid,
            rounding,
            payable,
        )
    }

    /// All-zero totals in the given currency (a fresh draft).
    pub fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            line_net: zero.clone(),
            allowance_total: zero.clone(),
            charge_total: zero.clone(),
            tax_exclusive: zero.clone(),
            tax_total: zero.clone(),
            tax_inclusive: zero.clone(),
            prepaid: zero.clone(),
            rounding: zero.clone(),
            payable: zero,
        }
    }

    pub fn currency(&self) -> &Currency {
        self.line_net.currency()
    }

    pub fn line_net(&self) -> &Money {
        &self.line_net
    }

    pub fn allowance_total(&self) -> &Money {
        &self.allowance_total
    }

    pub fn charge_total(&self) -> &Money {
        &self.charge_total
    }

    pub fn tax_exclusive(&self) -> &Money {
        &self.tax_exclusive
    }

    pub fn tax_total(&self) -> &Money {
        &self.tax_total
    }

    pub fn tax_inclusive(&self) -> &Money {
        &self.tax_inclusive
    }

    pub fn prepaid(&self) -> &Money {
        &self.prepaid
    }

    pub fn rounding(&self) -> &Money {
        &self.rounding
    }

    pub fn payable(&self) -> &Money {
        &self.payable
    }
}

impl ValueObject for InvoiceTotals {}
