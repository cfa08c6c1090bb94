//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Wire Format vs. Internal Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The shop API sends prices as JSON floats in major units:              │
//! │                                                                         │
//! │    { "price": 1299.99 }                                                │
//! │                                                                         │
//! │  Inside the client every amount is integer minor units (kopiyky,       │
//! │  cents). The conversion happens once, at deserialization, and totals   │
//! │  are summed as integers:                                               │
//! │                                                                         │
//! │    1299.99 ──► Money(129999) ──► × qty ──► Σ lines ──► cart total      │
//! │                                                                         │
//! │  Adding floats line by line drifts (0.1 + 0.2 != 0.3). Integer sums    │
//! │  never do.                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.cents(), 3297);
//!
//! let parsed = Money::from_major(10.99);
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units of the shop's base currency.
///
/// The base currency is whatever the API prices in (UAH for the reference
/// backend). Display conversion into other currencies lives in
/// [`crate::settings::CurrencyCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a major-unit float as sent by the API.
    ///
    /// Rounds half away from zero to the nearest minor unit, so `10.995`
    /// becomes `1100`. Non-finite input maps to zero.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(100.0).cents(), 10000);
    /// assert_eq!(Money::from_major(0.1 + 0.2).cents(), 30);
    /// ```
    pub fn from_major(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        Money((amount * 100.0).round() as i64)
    }

    /// Returns the value as a major-unit float (for the wire and display).
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a cart quantity.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

// =============================================================================
// Serde helper for float prices
// =============================================================================

/// Serializes `Money` as a major-unit JSON number.
///
/// ```rust,ignore
/// #[serde(with = "crate::money::major_units")]
/// pub price: Money,
/// ```
pub mod major_units {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_major())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Ok(Money::from_major(amount))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `major.minor` rendering without a currency symbol.
///
/// Use [`crate::settings::CurrencyCode::format`] for what the user sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_to_nearest_cent() {
        assert_eq!(Money::from_major(10.99).cents(), 1099);
        assert_eq!(Money::from_major(0.125).cents(), 13);
        assert_eq!(Money::from_major(-5.5).cents(), -550);
        assert_eq!(Money::from_major(f64::NAN), Money::zero());
    }

    #[test]
    fn test_float_sums_do_not_drift() {
        let total: Money = [0.1, 0.2, 0.3]
            .iter()
            .map(|p| Money::from_major(*p))
            .sum();
        assert_eq!(total.cents(), 60);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn test_arithmetic() {
        let mut a = Money::from_cents(1000);
        a += Money::from_cents(250);
        a -= Money::from_cents(50);
        assert_eq!(a.cents(), 1200);
        assert_eq!((a * 3).cents(), 3600);
    }

    #[test]
    fn test_major_units_serde() {
        #[derive(Serialize, Deserialize)]
        struct Priced {
            #[serde(with = "major_units")]
            price: Money,
        }

        let parsed: Priced = serde_json::from_str(r#"{"price": 1299.99}"#).unwrap();
        assert_eq!(parsed.price.cents(), 129999);

        let json = serde_json::to_string(&Priced { price: Money::from_cents(5000) }).unwrap();
        assert_eq!(json, r#"{"price":50.0}"#);
    }
}
