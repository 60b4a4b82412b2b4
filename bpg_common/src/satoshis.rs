use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const BTC_CURRENCY_CODE: &str = "BTC";
pub const BTC_CURRENCY_CODE_LOWER: &str = "btc";

/// Number of satoshis in one whole coin.
pub const COIN: i64 = 100_000_000;

//--------------------------------------     Satoshis       ----------------------------------------------------------
/// A monetary amount in satoshis, i.e. a fixed-point value with 8 decimal places.
///
/// All invoice prices, payment-method amounts and wallet balances in the gateway are stored in this representation,
/// which matches the `NUMERIC(16,8)` columns of the database schema exactly and avoids floating-point drift.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Satoshis(i64);

op!(binary Satoshis, Add, add);
op!(binary Satoshis, Sub, sub);
op!(inplace Satoshis, SubAssign, sub_assign);
op!(unary Satoshis, Neg, neg);

impl Mul<i64> for Satoshis {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Satoshis {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in satoshis: {0}")]
pub struct SatoshisConversionError(String);

impl From<i64> for Satoshis {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Satoshis {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Satoshis {}

impl TryFrom<u64> for Satoshis {
    type Error = SatoshisConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(SatoshisConversionError(format!("Value {value} is too large to convert to Satoshis")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Satoshis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.abs() < 10_000 {
            write!(f, "{} sats", self.0)
        } else {
            let btc = self.0 as f64 / COIN as f64;
            write!(f, "{btc:0.8} {BTC_CURRENCY_CODE}")
        }
    }
}

impl Satoshis {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_coins(coins: i64) -> Self {
        Self(coins * COIN)
    }
}
