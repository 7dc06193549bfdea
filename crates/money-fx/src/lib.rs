//! money-fx: currency conversion over a static rate table.
//!
//! This library converts monetary amounts between currency codes using a
//! configuration-supplied table of multipliers. It has no I/O and no
//! side effects; all arithmetic is performed on [`rust_decimal::Decimal`]
//! so repeated sums do not accumulate binary floating-point drift.
//!
//! # Quick Start
//!
//! ```
//! use money_fx::{convert, RateTable};
//! use rust_decimal::Decimal;
//!
//! let table = RateTable::new()
//!     .with_rate("USD", "NGN", Decimal::from(800))
//!     .unwrap();
//!
//! let result = convert(Decimal::from(10), "USD", "NGN", &table);
//! assert_eq!(result.amount, Decimal::from(8000));
//! assert!(result.converted);
//! ```
//!
//! # Missing rates are not errors
//!
//! A pair absent from the table is a defined "no rate" state: the amount
//! passes through unchanged and [`Conversion::converted`] is `false`.
//! Callers that display such values must not claim currency correctness.
//! Nothing in this crate panics or returns an error at conversion time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Error returned when a rate cannot be added to a [`RateTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// Rates must be strictly positive multipliers.
    NonPositiveRate { from: String, to: String, rate: Decimal },
    /// A currency code was empty after trimming.
    EmptyCurrencyCode,
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateError::NonPositiveRate { from, to, rate } => {
                write!(f, "rate {from}->{to} must be positive, got {rate}")
            }
            RateError::EmptyCurrencyCode => write!(f, "currency code must not be empty"),
        }
    }
}

impl std::error::Error for RateError {}

/// Table of conversion multipliers keyed by ordered (from, to) currency pairs.
///
/// Currency codes are normalized to uppercase ASCII, so `"usd"` and `"USD"`
/// address the same entry. The table is directional: a `USD -> NGN` rate does
/// not imply the reverse pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, Decimal>,
}

fn pair_key(from: &str, to: &str) -> String {
    format!("{}:{}", normalize(from), normalize(to))
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl RateTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rate, replacing any existing entry for the pair.
    pub fn insert(&mut self, from: &str, to: &str, rate: Decimal) -> Result<(), RateError> {
        if normalize(from).is_empty() || normalize(to).is_empty() {
            return Err(RateError::EmptyCurrencyCode);
        }
        if rate <= Decimal::ZERO {
            return Err(RateError::NonPositiveRate {
                from: normalize(from),
                to: normalize(to),
                rate,
            });
        }
        self.rates.insert(pair_key(from, to), rate);
        Ok(())
    }

    /// Builder-style insert.
    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Result<Self, RateError> {
        self.insert(from, to, rate)?;
        Ok(self)
    }

    /// Look up the forward rate for an ordered pair.
    pub fn rate(&self, from: &str, to: &str) -> Option<Decimal> {
        self.rates.get(&pair_key(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Result of a conversion attempt.
///
/// `converted` is `true` when the amount is denominated in the requested
/// target currency (identity conversion counts), and `false` when no rate
/// was available and the amount passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub amount: Decimal,
    pub converted: bool,
}

/// Convert `amount` from one currency to another using `table`.
///
/// - `from == to` (case-insensitive): identity, no table lookup.
/// - Forward rate present: `amount * rate`.
/// - No rate: `amount` unchanged, flagged as unconverted.
pub fn convert(amount: Decimal, from: &str, to: &str, table: &RateTable) -> Conversion {
    if normalize(from) == normalize(to) {
        return Conversion {
            amount,
            converted: true,
        };
    }

    match table.rate(from, to) {
        Some(rate) => Conversion {
            amount: amount * rate,
            converted: true,
        },
        None => Conversion {
            amount,
            converted: false,
        },
    }
}
