//! Fiat currencies a conversion rate can be quoted in.

use serde::Deserialize;
use serde::Serialize;

/// A fiat currency with its code, symbol and minor-unit precision.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Default,
    strum::EnumIs,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum FiatCurrency {
    AUD,
    BRL,
    CAD,
    CHF,
    CNY,
    EUR,
    GBP,
    INR,
    JPY,
    KRW,
    KWD,
    #[default]
    USD,
}

impl FiatCurrency {
    /// Number of decimal digits in the minor unit (cents for USD, none for JPY).
    pub fn decimals(&self) -> u8 {
        match self {
            Self::JPY | Self::KRW => 0,
            Self::KWD => 3,
            _ => 2,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::AUD | Self::CAD | Self::USD => "$",
            Self::BRL => "R$",
            Self::CHF => "CHF",
            Self::CNY | Self::JPY => "¥",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::INR => "₹",
            Self::KRW => "₩",
            Self::KWD => "د.ك",
        }
    }

    /// ISO 4217 code, e.g. "USD".
    pub fn code(&self) -> &'static str {
        self.into()
    }

    /// Lower-case code as used in price provider query strings.
    pub fn query_code(&self) -> String {
        self.code().to_ascii_lowercase()
    }
}
