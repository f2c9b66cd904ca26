//! Read-through cache in front of the configured price provider.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::OnceCell;
use tokio::sync::RwLock;

use crate::price_map::PriceMap;
use crate::price_providers::PriceProviderKind;
use crate::ApiError;

const CACHE_DURATION: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
struct CachedPrices {
    provider: PriceProviderKind,
    price_map: PriceMap,
    last_fetched: Instant,
}

impl CachedPrices {
    fn fresh_for(&self, provider: PriceProviderKind) -> Option<&PriceMap> {
        (self.provider == provider && self.last_fetched.elapsed() < CACHE_DURATION)
            .then_some(&self.price_map)
    }
}

/// Returns conversion rates, hitting `provider` at most once per minute.
pub async fn get_cached_fiat_prices(provider: PriceProviderKind) -> Result<PriceMap, ApiError> {
    static CACHE: OnceCell<Arc<RwLock<Option<CachedPrices>>>> = OnceCell::const_new();

    let cache_lock = CACHE
        .get_or_init(|| async { Arc::new(RwLock::new(None)) })
        .await;

    if let Some(prices) = cache_lock
        .read()
        .await
        .as_ref()
        .and_then(|c| c.fresh_for(provider))
    {
        return Ok(prices.clone());
    }

    let mut write_lock = cache_lock.write().await;

    // another task may have refreshed while we waited for the write lock.
    if let Some(prices) = write_lock.as_ref().and_then(|c| c.fresh_for(provider)) {
        return Ok(prices.clone());
    }

    let price_map = provider.get_prices().await?;
    dioxus_logger::tracing::debug!("refreshed {} fiat prices", price_map.iter().count());

    *write_lock = Some(CachedPrices {
        provider,
        price_map: price_map.clone(),
        last_fetched: Instant::now(),
    });

    Ok(price_map)
}
