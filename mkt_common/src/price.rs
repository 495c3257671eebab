use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "ETB";

//--------------------------------------       Price       -----------------------------------------------------------
/// A monetary amount in minor units (cents). Storage precision is fixed at two decimal places; all arithmetic is
/// integer arithmetic on the minor-unit value.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Price(i64);

op!(binary Price, Add, add);
op!(binary Price, Sub, sub);
op!(inplace Price, SubAssign, sub_assign);
op!(unary Price, Neg, neg);

impl Mul<i64> for Price {
    type Output = Self;

    // Saturating: callers that must reject overflow use `checked_mul` instead.
    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.value().saturating_mul(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a 2-decimal price: {0}")]
pub struct PriceConversionError(String);

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Price {}

impl TryFrom<u64> for Price {
    type Error = PriceConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(PriceConversionError(format!("Value {value} is too large to convert to Price")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

/// Prices arrive over the wire as decimal strings, e.g. "149.99".
impl FromStr for Price {
    type Err = PriceConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if frac.len() > 2 {
            return Err(PriceConversionError(format!("{s} has more than 2 decimal places")));
        }
        let whole_units =
            whole.parse::<i64>().map_err(|e| PriceConversionError(format!("Invalid price value: {s}. {e}.")))?;
        let cents = match frac {
            "" => 0,
            f => {
                let padded = format!("{f:0<2}");
                padded.parse::<i64>().map_err(|e| PriceConversionError(format!("Invalid price value: {s}. {e}.")))?
            },
        };
        let sign = if s.starts_with('-') { -1 } else { 1 };
        Ok(Self(whole_units * 100 + sign * cents))
    }
}

impl Price {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_whole_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Multiply by a count, returning `None` when the total cannot be represented.
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }
}
