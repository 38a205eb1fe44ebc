//! Monetary amounts as integers in the smallest currency unit.
//!
//! All money in this domain is stored in cents. Fractional rates (commission,
//! redemption cost, tax) are expressed in basis points so every computation
//! stays in integer arithmetic.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// A signed monetary amount in cents.
///
/// Signed on purpose: customer balances and seller commissions may be driven
/// negative by the operations that are contractually allowed to do so.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Amount in whole currency units (e.g. `from_major(5000)` is $5000.00).
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Scale by a rate in basis points (1 bps = 0.01%), truncating toward zero.
    ///
    /// `scale_bps(50)` is 0.5%, `scale_bps(6_000)` is 60%, `scale_bps(11_900)`
    /// is the 1.19 tax multiplier.
    pub const fn scale_bps(self, bps: i64) -> Money {
        Money(self.0 * bps / 10_000)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl ValueObject for Money {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_units_are_cents_times_one_hundred() {
        assert_eq!(Money::from_major(1_000).cents(), 100_000);
    }

    #[test]
    fn commission_rate_is_exact_for_whole_prices() {
        // 0.5% of 1000.00 is 5.00.
        assert_eq!(Money::from_major(1_000).scale_bps(50), Money::from_major(5));
    }

    #[test]
    fn redemption_rate_is_sixty_percent() {
        assert_eq!(
            Money::from_major(20_000).scale_bps(6_000),
            Money::from_major(12_000)
        );
    }

    #[test]
    fn display_renders_cents_and_sign() {
        assert_eq!(Money::from_cents(123_456).to_string(), "1234.56");
        assert_eq!(Money::from_cents(-50).to_string(), "-0.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn arithmetic_is_signed() {
        let balance = Money::from_major(500) - Money::from_major(1_000);
        assert!(balance.is_negative());
        assert_eq!(-balance, Money::from_major(500));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: scaling by up to 100% never exceeds the base amount.
            #[test]
            fn partial_rates_never_exceed_base(cents in 0i64..1_000_000_000, bps in 0i64..=10_000) {
                let base = Money::from_cents(cents);
                prop_assert!(base.scale_bps(bps) <= base);
                prop_assert!(base.scale_bps(bps) >= Money::ZERO);
            }

            /// Property: addition and subtraction are inverses.
            #[test]
            fn add_sub_round_trip(a in -1_000_000_000i64..1_000_000_000, b in -1_000_000_000i64..1_000_000_000) {
                let (a, b) = (Money::from_cents(a), Money::from_cents(b));
                prop_assert_eq!(a + b - b, a);
            }
        }
    }
}
