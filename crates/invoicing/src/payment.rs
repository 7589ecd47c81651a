//! Payments and payment instructions.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, Money, ValueObject};

/// How the invoice is to be settled (UNTDID 4461 subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMeans {
    /// Generic credit transfer (30).
    CreditTransfer,
    /// SEPA credit transfer (58).
    SepaCreditTransfer,
    /// Generic direct debit (49).
    DirectDebit,
    /// SEPA direct debit (59).
    SepaDirectDebit,
    /// Payment card (48).
    Card,
    /// Cash (10).
    Cash,
}

impl PaymentMeans {
    pub fn is_direct_debit(&self) -> bool {
        matches!(self, PaymentMeans::DirectDebit | PaymentMeans::SepaDirectDebit)
    }
}

/// Instructions printed on the invoice telling the buyer how to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstructions {
    means: PaymentMeans,
    terms: Option<String>,
    remittance_info: Option<String>,
    mandate_reference: Option<String>,
}

impl PaymentInstructions {
    pub fn new(means: PaymentMeans) -> Self {
        Self {
            means,
            terms: None,
            remittance_info: None,
            mandate_reference: None,
        }
    }

    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    pub fn with_remittance_info(mut self, info: impl Into<String>) -> Self {
        self.remittance_info = Some(info.into());
        self
    }

    pub fn with_mandate_reference(mut self, reference: impl Into<String>) -> Self {
        self.mandate_reference = Some(reference.into());
        self
    }

    pub fn means(&self) -> PaymentMeans {
        self.means
    }

    pub fn terms(&self) -> Option<&str> {
        self.terms.as_deref()
    }

    pub fn remittance_info(&self) -> Option<&str> {
        self.remittance_info.as_deref()
    }

    pub fn mandate_reference(&self) -> Option<&str> {
        self.mandate_reference.as_deref()
    }
}

impl ValueObject for PaymentInstructions {}

/// A payment received against an invoice.
///
/// The amount must be strictly positive and the value date must not lie in
/// the future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    amount: Money,
    date: NaiveDate,
    means: PaymentMeans,
    reference: Option<String>,
}

impl Payment {
    pub fn new(amount: Money, date: NaiveDate, means: PaymentMeans) -> DomainResult<Self> {
        if !amount.is_positive() {
            return Err(DomainError::validation(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        let today = Utc::now().date_naive();
        if date > today {
            return Err(DomainError::validation(format!(
                "payment date {date} lies in the future"
            )));
        }
        Ok(Self {
            amount,
            date,
            means,
            reference: None,
        })
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn means(&self) -> PaymentMeans {
        self.means
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

impl ValueObject for Payment {}

#[cfg(test)]
mod tests {
    use super::*;
    use clearbill_core::Currency;
    use rust_decimal_macros::dec;

    fn eur(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::from_code("EUR").unwrap()).unwrap()
    }

    #[test]
    fn zero_and_negative_payments_are_rejected() {
        let today = Utc::now().date_naive();
        assert!(Payment::new(eur(dec!(0.00)), today, PaymentMeans::CreditTransfer).is_err());
        assert!(Payment::new(eur(dec!(-1.00)), today, PaymentMeans::CreditTransfer).is_err());
    }

    #[test]
    fn future_dated_payments_are_rejected() {
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
        assert!(Payment::new(eur(dec!(10.00)), tomorrow, PaymentMeans::Cash).is_err());
    }
}
