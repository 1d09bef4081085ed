use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, ops::Mul};
use thiserror::Error;

/// Number of cents in one unit of deposit.
pub const CENTS_PER_UNIT: u64 = 100;

/// Error converting a floating point value into an [Amount].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum AmountError {
    #[error("amount must be finite (got {0})")]
    NotFinite(f64),
    #[error("amount must not be negative (got {0})")]
    Negative(f64),
    #[error("amount is too large (got {0})")]
    Overflow(f64),
}

/// Non-negative balance in hundredths of a unit.
///
/// Deposits, stakes, play costs and rewards are all expressed as amounts so
/// that reward rates like 0.1 or 0.5 per point are exact and a balance can
/// never go below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn from_units(units: u64) -> Self {
        Self(units * CENTS_PER_UNIT)
    }

    /// Convert a value in units (as stored by the browser) into an amount,
    /// rounding to the nearest cent.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value));
        }
        let cents = (value * CENTS_PER_UNIT as f64).round();
        if cents >= u64::MAX as f64 {
            return Err(AmountError::Overflow(value));
        }
        Ok(Self(cents as u64))
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

impl Mul<u64> for Amount {
    type Output = Amount;

    fn mul(self, rhs: u64) -> Amount {
        Amount(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::from_f64(value).map_err(de::Error::custom)
    }
}
