use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "CNY";
pub const FEN_PER_YUAN: i64 = 100;

//--------------------------------------        Fen          ---------------------------------------------------------
/// An amount of money in fen (1/100 of a yuan).
///
/// Keeping amounts as whole fen means that "equal to 2 decimal places" is plain integer equality. On the wire, amounts
/// are written as a number of yuan, e.g. `110` or `59.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fen(i64);

op!(binary Fen, Add, add);
op!(binary Fen, Sub, sub);
op!(inplace Fen, AddAssign, add_assign);
op!(unary Fen, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in fen: {0}")]
pub struct FenConversionError(String);

impl From<i64> for Fen {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Fen {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_yuan(yuan: i64) -> Self {
        Self(yuan * FEN_PER_YUAN)
    }

    /// Convert a decimal amount of yuan, rounding half away from zero to the nearest fen.
    pub fn from_decimal(yuan: f64) -> Result<Self, FenConversionError> {
        if !yuan.is_finite() {
            return Err(FenConversionError(format!("{yuan} is not a finite number")));
        }
        let fen = (yuan * FEN_PER_YUAN as f64).round();
        if fen.abs() >= i64::MAX as f64 {
            return Err(FenConversionError(format!("{yuan} is too large")));
        }
        Ok(Self(fen as i64))
    }

    /// Addition that reports overflow instead of wrapping.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn as_yuan(&self) -> f64 {
        self.0 as f64 / FEN_PER_YUAN as f64
    }

    pub fn is_whole_yuan(&self) -> bool {
        self.0 % FEN_PER_YUAN == 0
    }
}

impl Display for Fen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_yuan = FEN_PER_YUAN.unsigned_abs();
        write!(f, "{sign}¥{}.{:02}", abs / per_yuan, abs % per_yuan)
    }
}

impl Serialize for Fen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole_yuan() {
            serializer.serialize_i64(self.0 / FEN_PER_YUAN)
        } else {
            serializer.serialize_f64(self.as_yuan())
        }
    }
}

impl<'de> Deserialize<'de> for Fen {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let yuan = f64::deserialize(deserializer)?;
        Fen::from_decimal(yuan).map_err(serde::de::Error::custom)
    }
}
