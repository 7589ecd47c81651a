//! Percentage rates (tax rates, allowance/charge percentages).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::ValueObject;
use crate::error::{DomainError, DomainResult};
use crate::money::Money;

/// A percentage in `[0, 100]` with at most 4 decimal places.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);

    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(format!(
                "percentage must be within 0-100, got {value}"
            )));
        }
        if value.normalize().scale() > 4 {
            return Err(DomainError::validation(format!(
                "percentage scale must be at most 4, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The rate as a plain fraction (e.g. 20% -> 0.20).
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Apply this percentage to a monetary base, rounding half-up to the
    /// base's currency scale.
    pub fn of(&self, base: &Money) -> DomainResult<Money> {
        base.multiply(self.fraction())
    }
}

impl ValueObject for Percentage {}

impl core::fmt::Display for Percentage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
