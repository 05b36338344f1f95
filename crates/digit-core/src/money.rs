//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The browser storefront computed commission as `total * 0.15`:          │
//! │    35.00 * 0.15 = 5.25, but 0.1 + 0.2 = 0.30000000000000004            │
//! │                                                                         │
//! │  Repeated over every order, the company and seller running totals      │
//! │  drift away from the order totals they were derived from.              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer qəpik (1/100 AZN)                               │
//! │    commission = round(total × 1500 / 10000)                            │
//! │    seller     = total − commission        (always sums back exactly)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use digit_core::money::Money;
//!
//! let price = Money::from_cents(1500); // 15.00 AZN
//! let total = price + Money::from_cents(3500);
//! assert_eq!(total.to_string(), "50.00 AZN");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Currency code used for display.
pub const CURRENCY_CODE: &str = "AZN";

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (qəpik).
///
/// ## Design Decisions
/// - **i64 (signed)**: balances go negative when a seller over-withdraws
///   on legacy data, and we want to see that rather than clamp it
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price_cents ──► cart total (live) ──► frozen item price        │
/// │                                                    │                    │
/// │                                                    ▼                    │
/// │                         Payment.total ──► Order.total ──► split 15/85   │
/// │                                                                 │       │
/// │                         seller balance ◄── minus withdrawals ◄──┘       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

/// Result of splitting an amount between the platform and the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionSplit {
    /// Platform share (commission).
    pub company: Money,
    /// Seller share (the remainder).
    pub seller: Money,
}

impl Money {
    /// Creates a Money value from qəpik (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use digit_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99 AZN
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use digit_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(35, 0).cents(), 3500);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in qəpik.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (manat) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `bps` basis points of this amount, rounded half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// rounding (5000/10000 = 0.5). i128 prevents overflow.
    ///
    /// ## Example
    /// ```rust
    /// use digit_core::money::Money;
    ///
    /// // 15% of 35.00 = 5.25
    /// assert_eq!(Money::from_cents(3500).percentage(1500).cents(), 525);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Example
    /// ```rust
    /// use digit_core::money::Money;
    ///
    /// let price = Money::from_cents(1500); // 15.00 AZN
    /// assert_eq!(price.apply_percentage_discount(1000).cents(), 1350);
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        *self - self.percentage(discount_bps)
    }

    /// Splits this amount into platform commission and seller share.
    ///
    /// The commission is rounded; the seller receives the exact remainder,
    /// so `company + seller == self` always holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Admin confirms payment (total 35.00)
    ///      │
    ///      ▼
    /// split_commission(1500) ← THIS FUNCTION
    ///      │
    ///      ├──► company: 5.25  → RevenueLedger.company_revenue
    ///      └──► seller: 29.75  → RevenueLedger.seller_revenue
    /// ```
    pub fn split_commission(&self, commission_bps: u32) -> CommissionSplit {
        let company = self.percentage(commission_bps);
        CommissionSplit {
            company,
            seller: *self - company,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `12.34 AZN`.
///
/// ## Note
/// This is for logs and messages. The storefront formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            self.major().abs(),
            self.minor(),
            CURRENCY_CODE
        )
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

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3500).to_string(), "35.00 AZN");
        assert_eq!(Money::from_cents(2975).to_string(), "29.75 AZN");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50 AZN");
        assert_eq!(Money::zero().to_string(), "0.00 AZN");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_commission_split_reference_order() {
        let split = Money::from_cents(3500).split_commission(1500);
        assert_eq!(split.company.cents(), 525);
        assert_eq!(split.seller.cents(), 2975);
    }

    #[test]
    fn test_commission_split_always_sums_back() {
        for cents in [1, 7, 99, 333, 1001, 1999, 12345, 99999] {
            let total = Money::from_cents(cents);
            let split = total.split_commission(1500);
            assert_eq!(split.company + split.seller, total, "cents = {}", cents);
        }
    }

    #[test]
    fn test_commission_rounds_half_up() {
        // 15% of 0.03 = 0.0045 → 0.00; 15% of 0.10 = 0.015 → 0.02
        assert_eq!(Money::from_cents(3).percentage(1500).cents(), 0);
        assert_eq!(Money::from_cents(10).percentage(1500).cents(), 2);
    }

    #[test]
    fn test_percentage_discount() {
        assert_eq!(Money::from_cents(1500).apply_percentage_discount(1000).cents(), 1350);
        assert_eq!(Money::from_cents(999).apply_percentage_discount(1000).cents(), 899);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }
}
