//! Fixed-point discount values
//!
//! Every value the game tracks (current discount, crash point, totals) is a
//! whole number of hundredths so that stepping and accumulation stay exact.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hundredths per whole discount point
pub const SCALE: u32 = 100;

/// A non-negative discount with two decimal places of precision
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(into = "f64", try_from = "f64")]
pub struct Discount(u32);

impl Discount {
    pub const ZERO: Discount = Discount(0);

    /// Create from a raw count of hundredths
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Discount(hundredths)
    }

    /// Create from whole discount points
    pub const fn from_points(points: u32) -> Self {
        Discount(points * SCALE)
    }

    /// Convert from a float, rounding to the nearest hundredth.
    /// Negative and NaN inputs become zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Discount::ZERO;
        }
        let scaled = (value * SCALE as f64).round();
        Discount(scaled.min(u32::MAX as f64) as u32)
    }

    /// Raw hundredths
    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn saturating_add(self, other: Discount) -> Discount {
        Discount(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Discount) -> Discount {
        Discount(self.0.saturating_sub(other.0))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / SCALE, self.0 % SCALE)
    }
}

impl From<Discount> for f64 {
    fn from(value: Discount) -> f64 {
        value.as_f64()
    }
}

/// Rejected float conversions during deserialization
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("discount must be a finite non-negative number, got {0}")]
pub struct InvalidDiscount(pub f64);

impl TryFrom<f64> for Discount {
    type Error = InvalidDiscount;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidDiscount(value));
        }
        Ok(Discount::from_f64(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_conversion_rounds_to_hundredths() {
        assert_eq!(Discount::from_f64(0.01).hundredths(), 1);
        assert_eq!(Discount::from_f64(4.999_999).hundredths(), 500);
        assert_eq!(Discount::from_f64(-3.0), Discount::ZERO);
        assert_eq!(Discount::from_f64(f64::NAN), Discount::ZERO);
    }

    #[test]
    fn test_display_uses_two_decimals() {
        assert_eq!(Discount::from_hundredths(5).to_string(), "0.05");
        assert_eq!(Discount::from_hundredths(1234).to_string(), "12.34");
        assert_eq!(Discount::from_points(20).to_string(), "20.00");
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&Discount::from_hundredths(350)).unwrap();
        assert_eq!(json, "3.5");
        let back: Discount = serde_json::from_str("7.25").unwrap();
        assert_eq!(back, Discount::from_hundredths(725));
        assert!(serde_json::from_str::<Discount>("-1.0").is_err());
    }
}
