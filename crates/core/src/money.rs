//! Currency and exact-decimal monetary amounts.
//!
//! All arithmetic is on `rust_decimal::Decimal` — never binary floating point.
//! Rounding (half-up to the currency's minor units) happens only at the
//! boundary of multiply/divide; add/subtract are exact.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::aggregate::ValueObject;
use crate::error::{DomainError, DomainResult};

/// Well-known ISO 4217 currencies with a non-default number of minor units,
/// plus the majors. Codes not listed here are admitted with 2 minor units.
const KNOWN_CURRENCIES: &[(&str, &str, u32)] = &[
    ("EUR", "Euro", 2),
    ("USD", "US Dollar", 2),
    ("GBP", "Pound Sterling", 2),
    ("CHF", "Swiss Franc", 2),
    ("SEK", "Swedish Krona", 2),
    ("NOK", "Norwegian Krone", 2),
    ("DKK", "Danish Krone", 2),
    ("PLN", "Polish Zloty", 2),
    ("CZK", "Czech Koruna", 2),
    ("RON", "Romanian Leu", 2),
    ("HUF", "Hungarian Forint", 2),
    ("CAD", "Canadian Dollar", 2),
    ("AUD", "Australian Dollar", 2),
    ("NZD", "New Zealand Dollar", 2),
    ("SGD", "Singapore Dollar", 2),
    ("INR", "Indian Rupee", 2),
    ("CNY", "Yuan Renminbi", 2),
    ("BRL", "Brazilian Real", 2),
    ("ZAR", "Rand", 2),
    ("JPY", "Yen", 0),
    ("KRW", "Won", 0),
    ("ISK", "Iceland Krona", 0),
    ("VND", "Dong", 0),
    ("BHD", "Bahraini Dinar", 3),
    ("KWD", "Kuwaiti Dinar", 3),
    ("OMR", "Rial Omani", 3),
    ("TND", "Tunisian Dinar", 3),
    ("JOD", "Jordanian Dinar", 3),
    ("IQD", "Iraqi Dinar", 3),
    ("CLF", "Unidad de Fomento", 4),
    ("UYW", "Unidad Previsional", 4),
];

/// ISO 4217 currency: code, display name, number of minor units (0–4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    name: String,
    minor_units: u32,
}

impl Currency {
    /// Construct a currency explicitly.
    ///
    /// The code must be exactly three uppercase ASCII letters; minor units are
    /// capped at 4 (the widest scale ISO 4217 defines).
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        minor_units: u32,
    ) -> DomainResult<Self> {
        let code = code.into();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "currency code must be 3 uppercase letters, got {code:?}"
            )));
        }
        if minor_units > 4 {
            return Err(DomainError::validation(format!(
                "currency minor units must be 0-4, got {minor_units}"
            )));
        }
        Ok(Self {
            code,
            name: name.into(),
            minor_units,
        })
    }

    /// Look up a currency by ISO code.
    ///
    /// Unknown (but well-formed) codes are admitted with 2 minor units so the
    /// model never refuses a currency the registry simply hasn't catalogued.
    pub fn from_code(code: &str) -> DomainResult<Self> {
        match KNOWN_CURRENCIES.iter().find(|(c, _, _)| *c == code) {
            Some((c, name, units)) => Self::new(*c, *name, *units),
            None => Self::new(code, code, 2),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn minor_units(&self) -> u32 {
        self.minor_units
    }

    /// Smallest representable step in this currency (e.g. 0.01 for EUR).
    pub fn minor_unit_step(&self) -> Decimal {
        Decimal::new(1, self.minor_units)
    }
}

impl ValueObject for Currency {}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.code)
    }
}

/// An exact monetary amount in a single currency.
///
/// Immutable; every arithmetic operation returns a fresh instance. Binary
/// operations require matching currencies and fail with
/// `DomainError::CurrencyMismatch` otherwise. Amounts may be negative (credit
/// notes); types that forbid negatives enforce that themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Construct a monetary amount.
    ///
    /// The amount's effective decimal scale (ignoring trailing zeros) must not
    /// exceed the currency's minor units.
    pub fn new(amount: Decimal, currency: Currency) -> DomainResult<Self> {
        if amount.normalize().scale() > currency.minor_units() {
            return Err(DomainError::validation(format!(
                "amount {amount} exceeds the {} minor units of {}",
                currency.minor_units(),
                currency.code()
            )));
        }
        Ok(Self { amount, currency })
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Exact addition. Fails on currency mismatch.
    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::invariant("monetary addition overflow"))?;
        Ok(Self {
            amount,
            currency: self.currency.clone(),
        })
    }

    /// Exact subtraction. Fails on currency mismatch. May go negative.
    pub fn subtract(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| DomainError::invariant("monetary subtraction overflow"))?;
        Ok(Self {
            amount,
            currency: self.currency.clone(),
        })
    }

    /// Multiply by a plain factor, rounding half-up to the currency scale.
    pub fn multiply(&self, factor: Decimal) -> DomainResult<Money> {
        let raw = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| DomainError::invariant("monetary multiplication overflow"))?;
        Ok(Self {
            amount: round_half_up(raw, self.currency.minor_units()),
            currency: self.currency.clone(),
        })
    }

    /// Divide by a plain divisor, rounding half-up to the currency scale.
    pub fn divide(&self, divisor: Decimal) -> DomainResult<Money> {
        if divisor.is_zero() {
            return Err(DomainError::invariant("division of money by zero"));
        }
        let raw = self
            .amount
            .checked_div(divisor)
            .ok_or_else(|| DomainError::invariant("monetary division overflow"))?;
        Ok(Self {
            amount: round_half_up(raw, self.currency.minor_units()),
            currency: self.currency.clone(),
        })
    }

    pub fn negate(&self) -> Money {
        Self {
            amount: -self.amount,
            currency: self.currency.clone(),
        }
    }

    pub fn abs(&self) -> Money {
        Self {
            amount: self.amount.abs(),
            currency: self.currency.clone(),
        }
    }

    pub(crate) fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency.code() != other.currency.code() {
            return Err(DomainError::currency_mismatch(
                self.currency.code(),
                other.currency.code(),
            ));
        }
        Ok(())
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency.code())
    }
}

/// Half-up rounding ("midpoint away from zero") to `dp` decimal places.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
