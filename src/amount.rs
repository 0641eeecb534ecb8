//! Monetary amounts with exactly 2 fractional digits.
//!
//! Amounts are validated and rounded once, at construction. Everything
//! downstream (rendering, running totals) works on integer minor units so
//! that a trailer total is always the exact sum of the rendered detail amounts.

use crate::error::{CodecError, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative currency amount rounded to 2 decimal places.
///
/// Rounding uses round-half-away-from-zero, so `1000.005` becomes
/// `1000.01` (`100001` minor units).
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use flatfile_records::Amount;
///
/// let amount = Amount::from_str("1500").unwrap();
/// assert_eq!(amount.to_string(), "1500.00");
/// assert_eq!(amount.minor_units(), 150000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Creates an amount, rejecting negatives and rounding to 2 places.
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CodecError::InvalidAmount(format!(
                "{} is negative",
                value
            )));
        }

        let mut rounded = value
            .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero)
            .abs();
        rounded.rescale(Self::SCALE);

        if u64::try_from(rounded.mantissa()).is_err() {
            return Err(CodecError::InvalidAmount(format!(
                "{} exceeds the range of minor units",
                value
            )));
        }

        Ok(Amount(rounded))
    }

    /// Creates an amount from a float, rejecting NaN and infinities.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(CodecError::InvalidAmount(format!("{} is not finite", value)));
        }
        let decimal = Decimal::from_f64(value)
            .ok_or_else(|| CodecError::InvalidAmount(format!("{} is not representable", value)))?;
        Self::new(decimal)
    }

    /// Creates an amount from integer minor units (cents).
    pub fn from_minor_units(units: u64) -> Self {
        Amount(Decimal::from_i128_with_scale(units as i128, Self::SCALE))
    }

    /// Returns the amount as integer minor units.
    pub fn minor_units(&self) -> u64 {
        let mut scaled = self.0;
        scaled.rescale(Self::SCALE);
        // Range was checked when the amount was built.
        u64::try_from(scaled.mantissa()).unwrap_or(u64::MAX)
    }

    /// Returns the underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, returning `None` if the sum leaves the minor-unit range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.minor_units()
            .checked_add(rhs.minor_units())
            .map(Self::from_minor_units)
    }
}

impl FromStr for Amount {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)
            .map_err(|e| CodecError::InvalidAmount(format!("{:?}: {}", trimmed, e)))?;
        Amount::new(decimal)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}
