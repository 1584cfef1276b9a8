//! Amount type for handling monetary magnitudes with optional currency symbols.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a dollar sign and thousands separators. An `Amount` is never negative:
//! whether money went in or out is carried by the transaction type, not by the sign.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The number of decimal places used when an amount is written out.
const SCALE: u32 = 2;

/// Represents a non-negative amount of money in some currency.
///
/// # Examples
///
/// ```
/// # use mintwise::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,234.5").unwrap();
/// assert_eq!(amount.to_string(), "1234.50");
/// assert_eq!(amount.with_commas(), "1,234.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new `Amount` rounded to the cent. Fails if `value` is negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        let mut cents =
            value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        cents.rescale(SCALE);
        Ok(Self(cents))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Formats the amount with thousands separators, e.g. `60,000.00`.
    pub fn with_commas(&self) -> String {
        format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default())
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// The text was not a number once symbols and separators were removed.
    Parse(String, rust_decimal::Error),
    /// The value was a valid number, but negative.
    Negative(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(s, e) => {
                write!(f, "amount \"{s}\" cannot be converted into a number: {e}")
            }
            AmountError::Negative(d) => write!(f, "amount {d} is negative"),
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Parse(_, e) => Some(e),
            AmountError::Negative(_) => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_dollar = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(without_commas.trim())
            .map_err(|e| AmountError::Parse(s.to_string(), e))?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}
