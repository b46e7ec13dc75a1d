//! Amount type for handling monetary values that may carry a currency symbol.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a currency symbol and thousands separators, e.g. `₹1,200.50`, `$5` or
//! `-40`. Display is handled by `Money`, which attaches a currency symbol at render time.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The currency symbol used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Represents a monetary amount read from an `Amount` cell.
///
/// Arithmetic is exact decimal arithmetic. Rounding only happens when the value is displayed.
///
/// # Examples
///
/// Parsing with a currency symbol and thousands separators:
/// ```
/// # use smartspend::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₹1,200.50").unwrap();
/// assert_eq!(amount.value().to_string(), "1200.50");
/// ```
///
/// Parsing a negative amount with a dollar sign:
/// ```
/// # use smartspend::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$50.00").unwrap();
/// assert!(amount.is_negative());
/// assert_eq!(amount.money("$").to_string(), "-$50.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the value as an `f64`, for statistics that are not money arithmetic.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Pairs the amount with a currency symbol for display, e.g. `₹1,234.56`.
    pub fn money<'a>(&self, symbol: &'a str) -> Money<'a> {
        Money {
            amount: *self,
            symbol,
        }
    }

    /// Adds `rhs`, or returns `None` if the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Subtracts `rhs`, or returns `None` if the difference does not fit in a `Decimal`.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Parses a cell leniently: empty or unparseable cells become `None`.
    pub fn parse_cell(cell: &str) -> Option<Self> {
        if cell.trim().is_empty() {
            return None;
        }
        Amount::from_str(cell).ok()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    source: Option<rust_decimal::Error>,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmountError")
            .field("input", &self.input)
            .field("source", &self.source)
            .finish()
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "Unable to parse '{}' as an amount: {e}", self.input),
            None => write!(f, "Unable to parse '{}' as an amount", self.input),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |source| AmountError {
            input: s.to_string(),
            source,
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(err(None));
        }

        // The sign may come before or after the currency symbol: "-$50" or "$-50"
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(after_minus) => (true, after_minus),
            None => (false, trimmed),
        };
        let rest = rest.trim_matches(|c: char| !is_numeric_char(c));
        let (negative, rest) = match rest.strip_prefix('-') {
            Some(after_minus) => (!negative, after_minus),
            None => (negative, rest.strip_prefix('+').unwrap_or(rest)),
        };

        // Remove commas (thousand separators)
        let without_commas = rest.replace(',', "");
        if without_commas.is_empty() {
            return Err(err(None));
        }

        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(|e| err(Some(e)))?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-' || c == '+'
}

/// Plain decimal rendering, e.g. `40` or `1200.5`, as used in mapping literals.
impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0.normalize(), f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Serialize::serialize(&self.0.normalize(), serializer)
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

/// An `Amount` rendered with a currency symbol, two decimal places and thousands separators.
///
/// # Examples
///  - `₹1,234.56`
///  - `-₹40.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money<'a> {
    amount: Amount,
    symbol: &'a str,
}

impl Display for Money<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self.amount.value().round_dp(2);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        write!(
            f,
            "{sign}{}{}.{fraction}",
            self.symbol,
            group_thousands(whole)
        )
    }
}

/// Inserts a comma between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (ix, c) in digits.chars().enumerate() {
        if ix > 0 && (digits.len() - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
