//! Fiat amounts stored in integer minor units.

use std::fmt;

use num_traits::CheckedAdd;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::fiat_currency::FiatCurrency;

/// An error that can occur when parsing a string into a `FiatAmount`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseFiatAmountError {
    #[error("invalid fiat amount format")]
    InvalidFormat,
    #[error("too many decimal places for the currency")]
    TooManyDecimals,
}

/// A monetary value in a specific fiat currency.
///
/// The amount is kept in the currency's smallest unit (cents for USD) so that
/// display and arithmetic never go through floating point. `Display` renders
/// the bare number, e.g. `"25.34"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiatAmount {
    amount: i64,
    currency: FiatCurrency,
}

impl FiatAmount {
    pub fn currency(&self) -> FiatCurrency {
        self.currency
    }

    /// Raw amount in the currency's smallest unit.
    pub fn as_minor_units(&self) -> i64 {
        self.amount
    }

    /// Builds an amount from a float quote, rounding to the nearest minor unit.
    ///
    /// Price providers report floats; this is the only place they enter.
    pub fn new_from_float(value: f64, currency: FiatCurrency) -> Self {
        let multiplier = 10_f64.powi(currency.decimals() as i32);
        let amount = (value * multiplier).round() as i64;

        Self { amount, currency }
    }

    pub fn new_from_minor(amount: i64, currency: FiatCurrency) -> Self {
        Self { amount, currency }
    }

    /// Parses `"123.45"`-style input. Rejects more decimals than the currency has.
    pub fn new_from_str(s: &str, currency: FiatCurrency) -> Result<Self, ParseFiatAmountError> {
        let decimals = currency.decimals() as u32;

        let (is_negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let mut parts = s.split('.');
        let major_str = parts.next().unwrap_or("");
        let minor_str = parts.next().unwrap_or("");

        if parts.next().is_some() || (major_str.is_empty() && minor_str.is_empty()) {
            return Err(ParseFiatAmountError::InvalidFormat);
        }
        if minor_str.len() > decimals as usize {
            return Err(ParseFiatAmountError::TooManyDecimals);
        }

        let parse_part = |part: &str| -> Result<i64, ParseFiatAmountError> {
            if part.is_empty() {
                Ok(0)
            } else {
                part.parse::<i64>()
                    .map_err(|_| ParseFiatAmountError::InvalidFormat)
            }
        };
        let major_units = parse_part(major_str)?;
        let minor_units = parse_part(minor_str)?;

        let scaled_minor_units = minor_units
            .checked_mul(10_i64.pow(decimals - minor_str.len() as u32))
            .ok_or(ParseFiatAmountError::InvalidFormat)?;
        let total = major_units
            .checked_mul(10_i64.pow(decimals))
            .and_then(|v| v.checked_add(scaled_minor_units))
            .ok_or(ParseFiatAmountError::InvalidFormat)?;

        Ok(Self::new_from_minor(
            if is_negative { -total } else { total },
            currency,
        ))
    }

    /// e.g. "$25.34"
    pub fn to_string_with_symbol(&self) -> String {
        format!("{}{}", self.currency.symbol(), self)
    }

    /// e.g. "25.34 USD"
    pub fn to_string_with_code(&self) -> String {
        format!("{} {}", self, self.currency.code())
    }
}

impl fmt::Display for FiatAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = self.currency.decimals() as usize;

        if decimals == 0 {
            return write!(f, "{}", self.amount);
        }

        let divisor = 10_i64.pow(decimals as u32);
        let sign = if self.amount < 0 { "-" } else { "" };
        let major_units = (self.amount / divisor).abs();
        let minor_units = self.amount.abs() % divisor;

        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            major_units,
            minor_units,
            width = decimals
        )
    }
}

/// Returns `None` on currency mismatch or overflow.
impl CheckedAdd for FiatAmount {
    fn checked_add(&self, v: &Self) -> Option<Self> {
        if self.currency != v.currency {
            return None;
        }
        self.amount.checked_add(v.amount).map(|amount| Self {
            amount,
            currency: self.currency,
        })
    }
}

/// Saturates on overflow.
///
/// # Panics
///
/// When the currencies differ. Use [`CheckedAdd`] for untrusted operands.
impl std::ops::Add for FiatAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(
            self.currency, rhs.currency,
            "cannot add amounts of different currencies"
        );
        Self {
            amount: self.amount.saturating_add(rhs.amount),
            currency: self.currency,
        }
    }
}
