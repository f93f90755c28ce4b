//! Money amounts stored as integer cents in a single implicit currency.

use std::{fmt::Display, ops::Add};

use serde::{Serialize, Serializer};

use crate::Error;

/// The number of cents in one unit of currency.
const CENTS_PER_UNIT: i64 = 100;

/// How far a scaled amount may drift from a whole number of cents and still be
/// treated as having at most two decimal places, e.g. `0.1 + 0.2`.
const CENT_TOLERANCE: f64 = 1e-6;

/// An amount of money in cents.
///
/// Wire formats (JSON) use decimal currency units, e.g. `12.34`, while the
/// database stores the integer number of cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero cents.
    pub const ZERO: Money = Money(0);

    /// Create an amount from a whole number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a decimal amount of currency, e.g. `30.25`, into [Money].
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `amount` is NaN or infinite, has more
    /// than two decimal places, or does not fit in a 64 bit number of cents.
    pub fn from_decimal(amount: f64) -> Result<Self, Error> {
        if !amount.is_finite() {
            return Err(Error::InvalidAmount(format!("{amount} is not a finite number")));
        }

        let scaled = amount * CENTS_PER_UNIT as f64;
        let cents = scaled.round();

        if (scaled - cents).abs() > CENT_TOLERANCE {
            return Err(Error::InvalidAmount(format!(
                "{amount} has more than two decimal places"
            )));
        }

        // Doubles lose integer precision past 2^53 so anything larger cannot be
        // represented exactly in cents.
        if cents.abs() > 9_007_199_254_740_992.0 {
            return Err(Error::InvalidAmount(format!("{amount} is too large")));
        }

        Ok(Self(cents as i64))
    }

    /// The amount in currency units, e.g. `1234` cents is `12.34`.
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    /// Whether the amount is strictly greater than zero.
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(
            f,
            "{sign}{}.{:02}",
            cents / CENTS_PER_UNIT as u64,
            cents % CENTS_PER_UNIT as u64
        )
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl rusqlite::ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl rusqlite::types::FromSql for Money {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        i64::column_result(value).map(Money)
    }
}


#[cfg(test)]
mod display_tests {
    use super::Money;

    #[test]
    fn formats_with_two_decimal_places() {
        assert_eq!(Money::from_cents(7000).to_string(), "70.00");
        assert_eq!(Money::from_cents(1).to_string(), "0.01");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn serializes_as_decimal_number() {
        let json = serde_json::to_string(&Money::from_cents(8050)).unwrap();

        assert_eq!(json, "80.5");
    }
}
