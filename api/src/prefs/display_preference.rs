use std::env;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::fiat_currency::FiatCurrency;
use crate::price_providers::PriceProviderKind;

/// How amounts on the confirmation screens are shown.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize, strum::EnumIs)]
pub enum DisplayPreference {
    /// Native currency only. No fiat rates are fetched or shown.
    NativeOnly,

    FiatEnabled {
        fiat: FiatCurrency,

        /// `true` to show fiat as the primary figure, `false` for native.
        display_as_fiat: bool,

        provider: PriceProviderKind,
    },
}

impl DisplayPreference {
    /// Reads the preference from the environment.
    ///
    /// - `NATIVE_ONLY`: "true"/"1" disables fiat entirely (default false).
    /// - `FIAT_CURRENCY`: ISO code, e.g. "EUR" (default USD).
    /// - `DISPLAY_AS_FIAT`: "true"/"1" makes fiat primary (default false).
    /// - `PRICE_PROVIDER`: "coingecko" or "coinpaprika".
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key).map(|val| val.eq_ignore_ascii_case("true") || val == "1")
        };

        if flag("NATIVE_ONLY").unwrap_or(false) {
            return Self::NativeOnly;
        }

        let fiat = lookup("FIAT_CURRENCY")
            .and_then(|s| FiatCurrency::from_str(&s).ok())
            .unwrap_or_default();
        let provider = lookup("PRICE_PROVIDER")
            .and_then(|s| PriceProviderKind::from_str(&s).ok())
            .unwrap_or_default();

        Self::FiatEnabled {
            fiat,
            display_as_fiat: flag("DISPLAY_AS_FIAT").unwrap_or(false),
            provider,
        }
    }

    /// The fiat currency to convert into, if any.
    pub fn fiat(&self) -> Option<FiatCurrency> {
        match self {
            Self::NativeOnly => None,
            Self::FiatEnabled { fiat, .. } => Some(*fiat),
        }
    }
}

impl Default for DisplayPreference {
    fn default() -> Self {
        Self::from_env()
    }
}
