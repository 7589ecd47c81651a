//! Currency conversion for reporting in a base currency.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clearbill_core::{Currency, DomainError, DomainResult, Money, ValueObject};

/// An exchange rate between two currencies on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    source: Currency,
    target: Currency,
    rate: Decimal,
    date: NaiveDate,
}

impl ExchangeRate {
    pub fn new(
        source: Currency,
        target: Currency,
        rate: Decimal,
        date: NaiveDate,
    ) -> DomainResult<Self> {
        if rate <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "exchange rate must be positive, got {rate}"
            )));
        }
        if source == target {
            return Err(DomainError::validation(format!(
                "exchange rate between {} and itself is meaningless",
                source.code()
            )));
        }
        Ok(Self {
            source,
            target,
            rate,
            date,
        })
    }

    pub fn source(&self) -> &Currency {
        &self.source
    }

    pub fn target(&self) -> &Currency {
        &self.target
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Convert an amount in the source currency, rounding half-up to the
    /// target currency's minor units.
    pub fn convert(&self, amount: &Money) -> DomainResult<Money> {
        if amount.currency() != &self.source {
            return Err(DomainError::currency_mismatch(
                self.source.code(),
                amount.currency().code(),
            ));
        }
        let raw = amount.amount() * self.rate;
        Money::new(
            clearbill_core::money::round_half_up(raw, self.target.minor_units()),
            self.target.clone(),
        )
    }
}

impl ValueObject for ExchangeRate {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn converts_into_the_target_scale() {
        let rate = ExchangeRate::new(
            Currency::from_code("EUR").unwrap(),
            Currency::from_code("JPY").unwrap(),
            dec!(161.237),
            date(),
        )
        .unwrap();
        let eur = Money::new(dec!(10.00), Currency::from_code("EUR").unwrap()).unwrap();
        let yen = rate.convert(&eur).unwrap();
        // 10.00 × 161.237 = 1612.37 -> 1612 at scale 0.
        assert_eq!(yen.amount(), dec!(1612));
        assert_eq!(yen.currency().code(), "JPY");
    }

    #[test]
    fn refuses_amounts_in_the_wrong_currency() {
        let rate = ExchangeRate::new(
            Currency::from_code("EUR").unwrap(),
            Currency::from_code("USD").unwrap(),
            dec!(1.08),
            date(),
        )
        .unwrap();
        let gbp = Money::new(dec!(5.00), Currency::from_code("GBP").unwrap()).unwrap();
        assert!(matches!(
            rate.convert(&gbp).unwrap_err(),
            DomainError::CurrencyMismatch { .. }
        ));
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        assert!(
            ExchangeRate::new(
                Currency::from_code("EUR").unwrap(),
                Currency::from_code("USD").unwrap(),
                dec!(0),
                date(),
            )
            .is_err()
        );
    }
}
