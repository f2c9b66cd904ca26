//! External sources for the native-currency conversion rate.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::fiat_amount::FiatAmount;
use crate::fiat_currency::FiatCurrency;
use crate::price_map::PriceMap;
use crate::ApiError;

/// Currencies requested from every provider.
const QUOTED: [FiatCurrency; 3] = [FiatCurrency::USD, FiatCurrency::EUR, FiatCurrency::JPY];

/// A service that can quote the price of one ether in fiat.
#[allow(async_fn_in_trait)]
pub trait PriceProvider {
    async fn get_prices(&self) -> Result<PriceMap, ApiError>;
}

/// Which provider the user picked.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum PriceProviderKind {
    #[default]
    CoinGecko,
    CoinPaprika,
}

impl PriceProviderKind {
    pub async fn get_prices(&self) -> Result<PriceMap, ApiError> {
        match self {
            Self::CoinGecko => coin_gecko::CoinGecko.get_prices().await,
            Self::CoinPaprika => coin_paprika::CoinPaprika.get_prices().await,
        }
    }
}

/// Public CoinGecko simple-price API.
pub mod coin_gecko {
    use super::*;

    #[derive(Deserialize, Debug)]
    pub(super) struct CoinGeckoResponse {
        pub(super) ethereum: HashMap<String, f64>,
    }

    pub struct CoinGecko;

    impl CoinGecko {
        pub(super) fn to_price_map(resp: &CoinGeckoResponse) -> PriceMap {
            let mut price_map = PriceMap::new();
            for currency in QUOTED {
                if let Some(price) = resp.ethereum.get(&currency.query_code()) {
                    price_map.insert(FiatAmount::new_from_float(*price, currency));
                }
            }
            price_map
        }
    }

    impl PriceProvider for CoinGecko {
        async fn get_prices(&self) -> Result<PriceMap, ApiError> {
            const URL: &str =
                "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd,eur,jpy";

            let resp = reqwest::Client::new()
                .get(URL)
                .send()
                .await?
                .json::<CoinGeckoResponse>()
                .await?;

            Ok(Self::to_price_map(&resp))
        }
    }
}

/// CoinPaprika ticker API.
pub mod coin_paprika {
    use serde_json::Value;

    use super::*;

    pub struct CoinPaprika;

    impl CoinPaprika {
        // resp["quotes"][CODE]["price"]
        pub(super) fn to_price_map(resp: &Value) -> PriceMap {
            let mut price_map = PriceMap::new();
            for currency in QUOTED {
                let price = resp
                    .get("quotes")
                    .and_then(|q| q.get(currency.code()))
                    .and_then(|q| q.get("price"))
                    .and_then(Value::as_f64);
                if let Some(price) = price {
                    price_map.insert(FiatAmount::new_from_float(price, currency));
                }
            }
            price_map
        }
    }

    impl PriceProvider for CoinPaprika {
        async fn get_prices(&self) -> Result<PriceMap, ApiError> {
            const URL: &str = "https://api.coinpaprika.com/v1/tickers/eth-ethereum?quotes=EUR,USD,JPY";

            let resp: Value = reqwest::Client::new()
                .get(URL)
                .send()
                .await?
                .json::<Value>()
                .await?;

            Ok(Self::to_price_map(&resp))
        }
    }
}
