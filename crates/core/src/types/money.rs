//! Monetary amounts using decimal arithmetic.
//!
//! Every price, discount, coupon and payment amount in the storefront is a
//! [`Money`]. The shop trades in a single currency, so no currency code is
//! carried; the display symbol comes from configuration.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in the shop currency's standard unit (dollars, not cents).
///
/// Amounts may be negative: an order whose coupon exceeds its subtotal has a
/// negative total. Use [`Money::max_zero`] where a payable amount is needed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Clamp negative amounts to zero.
    #[must_use]
    pub fn max_zero(self) -> Self {
        if self.is_negative() { Self::ZERO } else { self }
    }

    /// Format with a currency symbol, e.g. `"$12.50"` or `"-$3.00"`.
    #[must_use]
    pub fn display_with(&self, symbol: &str) -> String {
        let rounded = self.0.round_dp(2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{symbol}{:.2}", rounded.abs())
        } else {
            format!("{symbol}{:.2}", rounded.abs())
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// NUMERIC(10, 2) columns
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_times_quantity() {
        assert_eq!(money("19.99").times(3), money("59.97"));
        assert_eq!(money("19.99").times(0), Money::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Money = [money("1.10"), money("2.20"), money("3.30")].iter().sum();
        assert_eq!(total, money("6.60"));
    }

    #[test]
    fn test_sub_can_go_negative() {
        let diff = money("5.00") - money("7.50");
        assert!(diff.is_negative());
        assert_eq!(diff.max_zero(), Money::ZERO);
    }

    #[test]
    fn test_zero_is_not_negative() {
        assert!(!Money::ZERO.is_negative());
        assert!(!(money("1.00") - money("1.00")).is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(money("12.5").to_string(), "12.50");
        assert_eq!(money("12.5").display_with("$"), "$12.50");
        assert_eq!(money("-3").display_with("€"), "-€3.00");
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(1999), money("19.99"));
    }

    #[test]
    fn test_serde_uses_string() {
        let json = serde_json::to_string(&money("10.25")).unwrap();
        assert_eq!(json, "\"10.25\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money("10.25"));
    }
}
