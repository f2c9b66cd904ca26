//! Text-field parsing for the gas editor. Prices are entered in gwei.

use alloy_primitives::utils::format_units;
use alloy_primitives::utils::parse_units;
use alloy_primitives::U256;
use api::native_amount::trim_fraction;
use thiserror::Error;

const GWEI_DECIMALS: usize = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GasInputError {
    #[error("enter a value")]
    Empty,
    #[error("'{0}' is not a valid number")]
    Invalid(String),
    #[error("at most 9 decimal places")]
    TooPrecise,
}

pub fn parse_gas_limit(input: &str) -> Result<u64, GasInputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GasInputError::Empty);
    }
    input
        .parse()
        .map_err(|_| GasInputError::Invalid(input.to_string()))
}

/// Parses a decimal gwei figure into wei.
pub fn parse_gwei(input: &str) -> Result<U256, GasInputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GasInputError::Empty);
    }
    let invalid = || GasInputError::Invalid(input.to_string());

    // `parse_units` would truncate extra decimals and accept a sign.
    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > GWEI_DECIMALS {
        return Err(GasInputError::TooPrecise);
    }

    parse_units(input, "gwei")
        .map(Into::into)
        .map_err(|_| invalid())
}

/// Formats wei as gwei without trailing zeros.
pub fn format_gwei(wei: U256) -> String {
    format_units(wei, "gwei")
        .map(|gwei| trim_fraction(&gwei).to_string())
        .unwrap_or_else(|_| wei.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_figures() {
        assert_eq!(parse_gwei("10").unwrap(), U256::from(10_000_000_000u64));
        assert_eq!(parse_gwei(" 1.5 ").unwrap(), U256::from(1_500_000_000u64));
        assert_eq!(parse_gwei(".000000001").unwrap(), U256::from(1u64));
        assert_eq!(parse_gwei("0").unwrap(), U256::ZERO);
    }

    #[test]
    fn bad_gwei_input() {
        assert_eq!(parse_gwei(""), Err(GasInputError::Empty));
        assert_eq!(parse_gwei("."), Err(GasInputError::Invalid(".".into())));
        assert_eq!(parse_gwei("-1"), Err(GasInputError::Invalid("-1".into())));
        assert_eq!(parse_gwei("1.2.3"), Err(GasInputError::Invalid("1.2.3".into())));
        assert_eq!(parse_gwei("0.0000000001"), Err(GasInputError::TooPrecise));
    }

    #[test]
    fn formats_back_to_gwei() {
        assert_eq!(format_gwei(U256::from(10_000_000_000u64)), "10");
        assert_eq!(format_gwei(U256::from(1_500_000_000u64)), "1.5");
        assert_eq!(format_gwei(U256::from(1u64)), "0.000000001");
        assert_eq!(format_gwei(U256::ZERO), "0");
    }

    #[test]
    fn gas_limits() {
        assert_eq!(parse_gas_limit("21000"), Ok(21_000));
        assert_eq!(parse_gas_limit("  "), Err(GasInputError::Empty));
        assert_eq!(parse_gas_limit("2.5"), Err(GasInputError::Invalid("2.5".into())));
    }
}
