//! Capabilities the confirmation coordinator depends on.
//!
//! All of them are single-threaded: futures need not be `Send`.

use std::fmt;

use alloy_primitives::Address;
use serde::Deserialize;
use serde::Serialize;

use crate::route::Route;
use crate::tx::ChainId;
use crate::tx::GasCustomization;
use crate::tx::PendingTransaction;
use crate::tx::TxId;
use crate::ApiError;

/// Handle for one gas fee estimate subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollingToken(pub String);

impl fmt::Display for PollingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The transaction-management service.
///
/// Owns the pending set and the active network; the coordinator only asks.
#[allow(async_fn_in_trait)]
pub trait TransactionBackend {
    /// Pending transactions on `chain_id`, in creation order.
    async fn pending_transactions(
        &self,
        chain_id: ChainId,
    ) -> Result<Vec<PendingTransaction>, ApiError>;

    async fn approve(&self, id: TxId, custom_nonce: Option<u64>) -> Result<(), ApiError>;

    async fn cancel(&self, id: TxId) -> Result<(), ApiError>;

    async fn cancel_all(&self, ids: Vec<TxId>) -> Result<(), ApiError>;

    /// Suggested nonce for the selected account.
    async fn next_nonce(&self) -> Result<u64, ApiError>;

    async fn update_gas_fees(&self, id: TxId, gas: GasCustomization) -> Result<(), ApiError>;

    async fn start_gas_fee_polling(&self) -> Result<PollingToken, ApiError>;

    /// Releases a subscription. Fire-and-forget so it can run during teardown.
    fn stop_gas_fee_polling(&self, token: PollingToken);
}

#[allow(async_fn_in_trait)]
pub trait NameResolver {
    /// Human-readable name for `address`, if one is registered.
    async fn reverse_resolve(&self, address: Address) -> Option<String>;
}

pub trait Router {
    fn navigate(&self, route: Route);
}

#[allow(async_fn_in_trait)]
pub trait Dialogs {
    /// Asks whether to reject `count` transactions. `true` means go ahead.
    async fn confirm_reject_all(&self, count: usize) -> bool;

    /// Shows the one-shot "transaction confirmed" notice and waits for dismissal.
    async fn acknowledge_confirmed(&self);
}
