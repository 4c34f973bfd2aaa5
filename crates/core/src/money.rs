//! # Money Module
//!
//! Định nghĩa `Amount` - số tiền dương dùng cho TopUp, Payment và Transfer.
//! Balance dùng `Decimal` trực tiếp, không bao giờ âm sau một operation thành công.

use crate::error::AmountError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Số chữ số thập phân tối đa của một amount (đơn vị tiền nhỏ nhất = 0.01)
pub const MAX_SCALE: u32 = 2;

/// A strictly positive monetary amount with at most [`MAX_SCALE`] fractional digits.
///
/// # Invariant
/// The inner value is always > 0. This is enforced by the constructor.
///
/// # Examples
/// ```
/// use paybank_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::new(Decimal::new(4050, 2)).unwrap();
/// assert_eq!(amount.to_string(), "40.50");
///
/// assert!(Amount::new(Decimal::ZERO).is_err());
/// assert!(Amount::new(Decimal::new(1, 3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Tạo Amount, từ chối số <= 0 hoặc quá 2 chữ số thập phân
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        if value.normalize().scale() > MAX_SCALE {
            return Err(AmountError::TooPrecise {
                value,
                max_scale: MAX_SCALE,
            });
        }
        Ok(Self(value))
    }

    /// Giá trị Decimal bên trong
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|_| AmountError::Unparseable(s.to_string()))?;
        Self::new(value)
    }
}
