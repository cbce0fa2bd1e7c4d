//! # Money Module
//!
//! Integer money and exact per-unit prices.
//!
//! ## Why a Rational Unit Price?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE PER-TABLET PROBLEM                                                 │
//! │                                                                         │
//! │  Strip of 3 tablets costs 10.00                                         │
//! │    per tablet = 3.333...  → stored as 3.33                              │
//! │    sell 3 tablets = 9.99  → one strip and three tablets disagree       │
//! │                                                                         │
//! │  OUR SOLUTION: keep the fraction, round once                            │
//! │    UnitPrice { cents: 1000, per: 3 }                                    │
//! │    total_for(3) = round(1000 × 3 / 3) = 1000                            │
//! │    total_for(1) = round(1000 / 3)     = 333                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmstock_core::money::{Money, UnitPrice};
//!
//! let strip = Money::from_cents(10_000); // 100.00 per strip of 10
//! let per_tablet = UnitPrice::fraction(strip, 10);
//!
//! assert_eq!(per_tablet.per_unit().cents(), 1_000);
//! assert_eq!(per_tablet.total_for(11).cents(), 11_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise, cents).
///
/// Signed so report deltas can go negative; prices themselves are validated
/// non-negative at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ```rust
    /// use pharmstock_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(42, 50).cents(), 4_250);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole major units (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Minor part, always 0-99.
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Formats with a currency symbol, e.g. `₹42.50`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, symbol, self.major().abs(), self.minor())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Price
// =============================================================================

/// Exact price of one sale unit: `cents` buys `per` units.
///
/// Container and opaque prices have `per == 1`. A base-unit price keeps the
/// container price over the container size, so `total_for` rounds a whole
/// line exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitPrice {
    /// Price in minor units for `per` units.
    pub cents: i64,
    /// Number of units `cents` pays for. Always >= 1.
    pub per: i64,
}

impl UnitPrice {
    /// Price of one whole unit.
    #[inline]
    pub const fn whole(price: Money) -> Self {
        UnitPrice {
            cents: price.cents(),
            per: 1,
        }
    }

    /// `price` spread over `per` units. A non-positive `per` is treated as 1.
    #[inline]
    pub const fn fraction(price: Money, per: i64) -> Self {
        UnitPrice {
            cents: price.cents(),
            per: if per > 0 { per } else { 1 },
        }
    }

    /// Per-unit price rounded half-up to the minor unit. For display and for
    /// the single-unit receipt line.
    pub fn per_unit(&self) -> Money {
        self.total_for(1)
    }

    /// Line total for `quantity` units, rounded half-up once.
    ///
    /// Clamps to the `i64` range; use [`Self::checked_total_for`] where an
    /// out-of-range total must be rejected.
    pub fn total_for(&self, quantity: i64) -> Money {
        let rounded = self.rounded_total(quantity);
        Money::from_cents(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Line total for `quantity` units, or `None` when it does not fit in
    /// `i64` minor units.
    pub fn checked_total_for(&self, quantity: i64) -> Option<Money> {
        i64::try_from(self.rounded_total(quantity))
            .ok()
            .map(Money::from_cents)
    }

    fn rounded_total(&self, quantity: i64) -> i128 {
        let numerator = self.cents as i128 * quantity as i128;
        let per = self.per.max(1) as i128;
        if numerator >= 0 {
            (numerator + per / 2) / per
        } else {
            (numerator - per / 2) / per
        }
    }

    /// True when the per-unit price has no fractional minor units.
    pub fn is_exact(&self) -> bool {
        self.cents % self.per.max(1) == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
