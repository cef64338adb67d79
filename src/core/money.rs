//! Fixed-point money.
//!
//! Amounts are held as whole satang (1/100 baht) in an `i64`, which is also how
//! they are stored in the database. `Decimal` is only used at the edges, for
//! parsing form input and rendering payment payloads.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A non-negative amount of Thai baht with satang precision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_satang(satang: i64) -> Self {
        Self(satang)
    }

    #[must_use]
    pub const fn from_baht(baht: i64) -> Self {
        Self(baht * 100)
    }

    /// Converts a decimal baht amount.
    ///
    /// # Errors
    /// Returns `InvalidAmount` when the amount is negative, has more than two decimal
    /// places, or does not fit.
    pub fn from_decimal(amount: Decimal) -> Result<Self> {
        let satang = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(Error::InvalidAmount { amount })?;
        if amount.is_sign_negative() || !satang.fract().is_zero() {
            return Err(Error::InvalidAmount { amount });
        }
        satang
            .to_i64()
            .map(Self)
            .ok_or(Error::InvalidAmount { amount })
    }

    #[must_use]
    pub const fn satang(self) -> i64 {
        self.0
    }

    /// The amount in baht with exactly two decimal places.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Line total for `quantity` units at this unit price.
    #[must_use]
    pub const fn times(self, quantity: i32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_from_decimal_keeps_satang_precision() {
        let money = Money::from_decimal(Decimal::new(1995, 1)).unwrap();
        assert_eq!(money.satang(), 19_950);
        assert_eq!(money.to_string(), "199.50");
        assert_eq!(Money::from_baht(50).to_string(), "50.00");
    }

    #[test]
    fn test_from_decimal_rejects_bad_amounts() {
        assert!(matches!(
            Money::from_decimal(Decimal::new(-1, 0)),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            Money::from_decimal(Decimal::new(10_001, 3)),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            Money::from_decimal(Decimal::MAX),
            Err(Error::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_line_totals_and_sums() {
        let unit = Money::from_baht(100);
        assert_eq!(unit.times(2), Money::from_baht(200));

        let total: Money = [Money::from_baht(200), Money::from_satang(50)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_satang(20_050));
        assert_eq!(total + Money::from_baht(50), Money::from_satang(25_050));
    }
}
