//! Native-currency amounts held in wei.

use std::fmt;
use std::ops::Add;

use alloy_primitives::utils::format_ether;
use alloy_primitives::utils::parse_ether;
use alloy_primitives::utils::Unit;
use alloy_primitives::U256;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::fiat_amount::FiatAmount;

/// Decimal places between wei and one ether.
pub const NATIVE_DECIMALS: usize = 18;

/// Ticker shown next to native amounts.
pub const NATIVE_SYMBOL: &str = "ETH";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseNativeAmountError {
    #[error("invalid amount format")]
    InvalidFormat,
    #[error("more than {NATIVE_DECIMALS} decimal places")]
    TooManyDecimals,
    #[error("amount does not fit in 256 bits")]
    Overflow,
}

/// A precision-preserving amount of the native currency.
///
/// `Display` gives ether with trailing zeros trimmed (`"1.00025"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeAmount(U256);

impl NativeAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parses an ether quantity such as `"2.2"`.
    ///
    /// Stricter than [`parse_ether`], which truncates extra decimals and
    /// accepts a sign.
    pub fn from_ether_str(s: &str) -> Result<Self, ParseNativeAmountError> {
        let s = s.trim();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(ParseNativeAmountError::InvalidFormat);
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(ParseNativeAmountError::InvalidFormat);
        }
        if frac.len() > NATIVE_DECIMALS {
            return Err(ParseNativeAmountError::TooManyDecimals);
        }

        parse_ether(s)
            .map(Self)
            .map_err(|_| ParseNativeAmountError::Overflow)
    }

    /// Formats as `"<amount> ETH"`.
    pub fn to_string_with_symbol(&self) -> String {
        format!("{} {}", self, NATIVE_SYMBOL)
    }

    /// Converts to fiat at `rate`, the price of one ether.
    ///
    /// Rounds toward zero at the currency's minor unit. Saturates at `i64::MAX`.
    pub fn to_fiat(&self, rate: &FiatAmount) -> FiatAmount {
        let rate_minor = rate.as_minor_units();
        if rate_minor <= 0 {
            return FiatAmount::new_from_minor(0, rate.currency());
        }
        let minor = self
            .0
            .checked_mul(U256::from(rate_minor as u64))
            .map(|product| product / Unit::ETHER.wei())
            .and_then(|minor| i64::try_from(minor).ok())
            .unwrap_or(i64::MAX);

        FiatAmount::new_from_minor(minor, rate.currency())
    }

    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

/// Converts a gwei quantity to wei.
pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * Unit::GWEI.wei()
}

/// Drops trailing fractional zeros from a `format_units` string: `"1.500"`
/// becomes `"1.5"` and `"2.000"` becomes `"2"`.
pub fn trim_fraction(formatted: &str) -> &str {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.')
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(trim_fraction(&format_ether(self.0)))
    }
}

/// Saturating; amounts near 2^256 wei do not occur.
impl Add for NativeAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl From<U256> for NativeAmount {
    fn from(wei: U256) -> Self {
        Self(wei)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiat_currency::FiatCurrency;

    fn eth(s: &str) -> NativeAmount {
        NativeAmount::from_ether_str(s).unwrap()
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(eth("1").to_string(), "1");
        assert_eq!(eth("1.00025").to_string(), "1.00025");
        assert_eq!(eth("0.0008").to_string(), "0.0008");
        assert_eq!(NativeAmount::from_wei(U256::from(1u64)).to_string(), "0.000000000000000001");
        assert_eq!(NativeAmount::ZERO.to_string(), "0");
        assert_eq!(eth("2.2008").to_string_with_symbol(), "2.2008 ETH");
    }

    #[test]
    fn parses_ether_strings() {
        assert_eq!(eth("2.2").wei(), U256::from(2_200_000_000_000_000_000u64));
        assert_eq!(eth(".5").wei(), U256::from(500_000_000_000_000_000u64));
        assert_eq!(
            NativeAmount::from_ether_str("1.0000000000000000001"),
            Err(ParseNativeAmountError::TooManyDecimals)
        );
        assert_eq!(
            NativeAmount::from_ether_str("-1"),
            Err(ParseNativeAmountError::InvalidFormat)
        );
        assert_eq!(
            NativeAmount::from_ether_str("1e5"),
            Err(ParseNativeAmountError::InvalidFormat)
        );
        assert_eq!(
            NativeAmount::from_ether_str("1.2.3"),
            Err(ParseNativeAmountError::InvalidFormat)
        );
        assert_eq!(
            NativeAmount::from_ether_str("."),
            Err(ParseNativeAmountError::InvalidFormat)
        );
    }

    #[test]
    fn gwei_helper() {
        assert_eq!(gwei(8), U256::from(8_000_000_000u64));
    }

    #[test]
    fn trims_formatted_fractions() {
        assert_eq!(trim_fraction("1.500000000"), "1.5");
        assert_eq!(trim_fraction("2.000000000"), "2");
        assert_eq!(trim_fraction("100"), "100");
    }

    #[test]
    fn converts_to_fiat_in_minor_units() {
        let rate = FiatAmount::new_from_minor(250_000, FiatCurrency::USD); // $2500.00
        let fiat = eth("1.00025").to_fiat(&rate);
        assert_eq!(fiat.as_minor_units(), 250_062); // $2500.625 rounds toward zero
        assert_eq!(fiat.to_string_with_symbol(), "$2500.62");

        let zero_rate = FiatAmount::new_from_minor(0, FiatCurrency::USD);
        assert_eq!(eth("5").to_fiat(&zero_rate).as_minor_units(), 0);
    }
}
