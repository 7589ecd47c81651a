//! Quantities with a UN/ECE Recommendation 20 unit code.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::ValueObject;
use crate::error::{DomainError, DomainResult};

/// A non-negative quantity (scale ≤ 6) in a unit of measure.
///
/// The unit code is a UN/ECE rec-20 code such as `C62` (piece), `HUR` (hour)
/// or `KGM` (kilogram). Binary operations require matching units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    value: Decimal,
    unit: String,
}

impl Quantity {
    pub fn new(value: Decimal, unit: impl Into<String>) -> DomainResult<Self> {
        let unit = unit.into();
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::validation(format!(
                "quantity must not be negative, got {value}"
            )));
        }
        if value.normalize().scale() > 6 {
            return Err(DomainError::validation(format!(
                "quantity scale must be at most 6, got {value}"
            )));
        }
        if unit.trim().is_empty() {
            return Err(DomainError::validation("quantity unit code cannot be empty"));
        }
        Ok(Self { value, unit })
    }

    /// A quantity of whole pieces (`C62`).
    pub fn pieces(count: u32) -> Self {
        Self {
            value: Decimal::from(count),
            unit: "C62".to_string(),
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn add(&self, other: &Quantity) -> DomainResult<Quantity> {
        self.ensure_same_unit(other)?;
        Quantity::new(self.value + other.value, self.unit.clone())
    }

    /// Subtraction; the result must stay non-negative.
    pub fn subtract(&self, other: &Quantity) -> DomainResult<Quantity> {
        self.ensure_same_unit(other)?;
        if other.value > self.value {
            return Err(DomainError::invariant(format!(
                "quantity subtraction would go negative: {} - {}",
                self.value, other.value
            )));
        }
        Quantity::new(self.value - other.value, self.unit.clone())
    }

    fn ensure_same_unit(&self, other: &Quantity) -> DomainResult<()> {
        if self.unit != other.unit {
            return Err(DomainError::unit_mismatch(&self.unit, &other.unit));
        }
        Ok(())
    }
}

impl ValueObject for Quantity {}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_negative_and_over_scaled_values() {
        assert!(Quantity::new(dec!(-1), "C62").is_err());
        assert!(Quantity::new(dec!(0.1234567), "C62").is_err());
        assert!(Quantity::new(dec!(0.123456), "C62").is_ok());
    }

    #[test]
    fn arithmetic_requires_matching_units() {
        let hours = Quantity::new(dec!(8), "HUR").unwrap();
        let pieces = Quantity::pieces(3);
        let err = hours.add(&pieces).unwrap_err();
        assert!(matches!(err, DomainError::UnitMismatch { .. }));
    }

    #[test]
    fn subtraction_cannot_go_negative() {
        let a = Quantity::pieces(2);
        let b = Quantity::pieces(3);
        assert!(a.subtract(&b).is_err());
        assert_eq!(b.subtract(&a).unwrap().value(), dec!(1));
    }
}
