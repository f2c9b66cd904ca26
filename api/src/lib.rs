//! This crate contains the confirmation domain and all shared fullstack server
//! functions.

pub mod backend;
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod fee;
pub mod fiat_amount;
pub mod fiat_currency;
pub mod method;
pub mod native_amount;
pub mod navigation;
pub mod nonce;
pub mod prefs;
#[cfg(not(target_arch = "wasm32"))]
mod price_caching;
pub mod price_map;
pub mod price_providers;
pub mod route;
pub mod telemetry;
pub mod tx;
pub mod validity;
pub mod view_model;
pub mod wallet_state;

use alloy_primitives::Address;
use backend::PollingToken;
use config::ConfirmConfig;
use dioxus::prelude::*;
use prefs::user_prefs::UserPrefs;
use price_map::PriceMap;
use tx::ChainId;
use tx::GasCustomization;
use tx::PendingTransaction;
use tx::TxId;
use wallet_state::WalletState;

pub type ApiError = anyhow::Error;

/// Retrieves the user's preferences.
///
/// In the future this may read from a settings file.  For now it just
/// returns the default settings, which read from env vars.
#[post("/api/get_user_prefs")]
pub async fn get_user_prefs() -> Result<UserPrefs, ApiError> {
    Ok(UserPrefs::from_env())
}

#[post("/api/confirm_config")]
pub async fn confirm_config() -> Result<ConfirmConfig, ApiError> {
    Ok(ConfirmConfig::from_env())
}

/// Everything the confirmation screen renders from, in one round trip.
#[post("/api/wallet_state")]
pub async fn wallet_state() -> Result<WalletState, ApiError> {
    Ok(controller::shared().await.wallet_state().await)
}

#[post("/api/pending_transactions")]
pub async fn pending_transactions(chain_id: ChainId) -> Result<Vec<PendingTransaction>, ApiError> {
    Ok(controller::shared().await.pending(chain_id).await)
}

#[post("/api/approve_transaction")]
pub async fn approve_transaction(id: TxId, custom_nonce: Option<u64>) -> Result<(), ApiError> {
    controller::shared()
        .await
        .approve_tx(id, custom_nonce)
        .await?;
    Ok(())
}

#[post("/api/cancel_transaction")]
pub async fn cancel_transaction(id: TxId) -> Result<(), ApiError> {
    controller::shared().await.reject_tx(id).await?;
    Ok(())
}

#[post("/api/cancel_all_transactions")]
pub async fn cancel_all_transactions(ids: Vec<TxId>) -> Result<usize, ApiError> {
    Ok(controller::shared().await.reject_all(&ids).await?)
}

#[post("/api/next_nonce")]
pub async fn next_nonce() -> Result<u64, ApiError> {
    Ok(controller::shared().await.next_nonce_value().await)
}

#[post("/api/update_gas_fees")]
pub async fn update_gas_fees(id: TxId, gas: GasCustomization) -> Result<(), ApiError> {
    controller::shared().await.update_gas(id, gas).await?;
    Ok(())
}

#[post("/api/reverse_resolve")]
pub async fn reverse_resolve(address: Address) -> Result<Option<String>, ApiError> {
    Ok(controller::shared().await.name_of(address).await)
}

#[post("/api/start_gas_fee_polling")]
pub async fn start_gas_fee_polling() -> Result<PollingToken, ApiError> {
    Ok(controller::shared().await.start_polling())
}

#[post("/api/stop_gas_fee_polling")]
pub async fn stop_gas_fee_polling(token: PollingToken) -> Result<(), ApiError> {
    controller::shared().await.stop_polling(&token)?;
    Ok(())
}

/// Native-to-fiat rates from the configured provider.
///
/// Empty when the user wants native amounts only.
#[post("/api/fiat_prices")]
pub async fn fiat_prices() -> Result<PriceMap, ApiError> {
    match UserPrefs::from_env().display_preference() {
        prefs::display_preference::DisplayPreference::NativeOnly => Ok(PriceMap::new()),
        prefs::display_preference::DisplayPreference::FiatEnabled { provider, .. } => {
            price_caching::get_cached_fiat_prices(*provider).await
        }
    }
}
