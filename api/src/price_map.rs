//! Prices of one unit of the native currency in various fiat currencies.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::fiat_amount::FiatAmount;
use crate::fiat_currency::FiatCurrency;

/// The price of one ether in each fiat currency a provider quoted.
///
/// Only minor-unit integers are stored; lookups hand back full `FiatAmount`s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMap(HashMap<FiatCurrency, i64>);

impl PriceMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Inserts or replaces the price for `price.currency()`, returning the old one.
    pub fn insert(&mut self, price: FiatAmount) -> Option<FiatAmount> {
        let currency = price.currency();
        self.0
            .insert(currency, price.as_minor_units())
            .map(|old_amount| FiatAmount::new_from_minor(old_amount, currency))
    }

    /// The conversion rate for `currency`, if quoted.
    pub fn get(&self, currency: FiatCurrency) -> Option<FiatAmount> {
        self.0
            .get(&currency)
            .map(|&amount| FiatAmount::new_from_minor(amount, currency))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FiatAmount> + '_ {
        self.0
            .iter()
            .map(|(currency, &amount)| FiatAmount::new_from_minor(amount, *currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut map = PriceMap::new();
        assert!(map.is_empty());
        assert_eq!(
            map.insert(FiatAmount::new_from_minor(250_000, FiatCurrency::USD)),
            None
        );
        let old = map.insert(FiatAmount::new_from_minor(260_000, FiatCurrency::USD));
        assert_eq!(old.map(|p| p.as_minor_units()), Some(250_000));
        assert_eq!(
            map.get(FiatCurrency::USD).map(|p| p.as_minor_units()),
            Some(260_000)
        );
        assert_eq!(map.get(FiatCurrency::EUR), None);
        assert_eq!(map.iter().count(), 1);
    }
}
