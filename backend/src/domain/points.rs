//! Signed point amounts.
//!
//! Points are stored as exact decimals so fractional awards (for example a
//! percentage of a purchase) never accumulate rounding drift.

use std::fmt;
use std::ops::Neg;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Signed amount of points.
///
/// Addition is checked: balances are folded with [`Points::checked_sum`],
/// which reports overflow instead of panicking.
///
/// # Examples
/// ```
/// use rewards_backend::domain::Points;
///
/// let balance = Points::checked_sum([Points::from(100_u32), -Points::from(30_u32)]);
/// assert_eq!(balance, Some(Points::from(70_u32)));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Points(Decimal);

impl Points {
    /// Zero points.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a single award may credit.
    pub const MAX_AWARD: Self = Self(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether the amount is strictly less than zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Absolute value of the amount.
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Add two amounts, or `None` when the result exceeds the decimal range.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Sum amounts, or `None` on overflow.
    #[must_use]
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl From<u32> for Points {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<Decimal> for Points {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Neg for Points {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.normalize(), f)
    }
}
