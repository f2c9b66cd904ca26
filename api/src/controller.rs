//! In-memory transaction controller backing the server functions.
//!
//! Stands in for the wallet's real transaction service: it holds the pending
//! set, balances and gas data, and applies approve/reject decisions.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use dioxus_logger::tracing::debug;
use dioxus_logger::tracing::info;
use dioxus_logger::tracing::warn;
use tokio::sync::OnceCell;
use tokio::sync::RwLock;

use crate::backend::NameResolver;
use crate::backend::PollingToken;
use crate::backend::TransactionBackend;
use crate::config::ConfirmConfig;
use crate::error::ControllerError;
use crate::method::decode_token_data;
use crate::method::IERC20;
use crate::native_amount::gwei;
use crate::native_amount::NativeAmount;
use crate::tx::ChainId;
use crate::tx::GasCustomization;
use crate::tx::GasPricing;
use crate::tx::PendingTransaction;
use crate::tx::SimulationFailure;
use crate::tx::TxId;
use crate::tx::TxParams;
use crate::tx::TxStatus;
use crate::tx::UserFeeLevel;
use crate::tx::WALLET_ORIGIN;
use crate::wallet_state::AccountBalance;
use crate::wallet_state::AddressBookEntry;
use crate::wallet_state::WalletState;
use crate::ApiError;

#[derive(Debug, Default)]
struct ControllerState {
    chain_id: ChainId,
    transactions: Vec<PendingTransaction>,
    balances: HashMap<Address, U256>,
    base_fee: Option<U256>,
    gas_price_fetch_failed: bool,
    no_gas_price: bool,
    next_nonce: u64,
    address_book: Vec<AddressBookEntry>,
    names: HashMap<Address, String>,
    next_id: u64,
}

#[derive(Debug, Default)]
struct PollingRegistry {
    active: HashSet<PollingToken>,
    issued: u64,
}

#[derive(Debug, Default)]
pub struct MemoryTxController {
    state: RwLock<ControllerState>,
    polling: Mutex<PollingRegistry>,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl MemoryTxController {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            state: RwLock::new(ControllerState {
                chain_id,
                next_id: 1,
                ..Default::default()
            }),
            polling: Mutex::default(),
        }
    }

    /// A controller pre-filled with a handful of requests, for running the app
    /// without a wallet behind it.
    pub fn with_demo_data(chain_id: ChainId) -> Self {
        let account = Address::repeat_byte(0x5a);
        let friend = Address::repeat_byte(0xb0);
        let token = Address::repeat_byte(0xd1);
        let spender = Address::repeat_byte(0xe7);

        let mut state = ControllerState {
            chain_id,
            next_id: 1,
            base_fee: Some(gwei(9)),
            next_nonce: 14,
            ..Default::default()
        };
        state.balances.insert(account, U256::from(3u64) * gwei(1_000_000_000));
        state.address_book.push(AddressBookEntry {
            address: friend,
            name: "Savings".to_string(),
        });
        state.names.insert(spender, "uniswap.eth".to_string());

        let legacy = |price: u64| GasPricing::Legacy {
            gas_price: gwei(price),
        };
        let erc20_transfer = IERC20::transferCall {
            to: friend,
            value: U256::from(250_000_000u64),
        }
        .abi_encode();
        let approve = IERC20::approveCall {
            spender,
            value: U256::MAX,
        }
        .abi_encode();

        let requests = [
            (WALLET_ORIGIN, chain_id, Some(friend), "1", 25_000, legacy(10), Bytes::new(), None),
            (
                "https://app.example",
                chain_id,
                Some(token),
                "0",
                65_000,
                GasPricing::FeeMarket {
                    max_fee_per_gas: gwei(40),
                    max_priority_fee_per_gas: gwei(2),
                },
                Bytes::from(erc20_transfer),
                None,
            ),
            (
                "https://swap.example",
                chain_id,
                Some(token),
                "0",
                48_000,
                legacy(12),
                Bytes::from(approve),
                Some(SimulationFailure {
                    reason: Some("execution reverted".to_string()),
                }),
            ),
            ("https://app.example", chain_id, Some(spender), "0.2", 21_000, legacy(11), Bytes::new(), None),
            ("https://other.example", chain_id.wrapping_add(4), Some(friend), "0.5", 21_000, legacy(3), Bytes::new(), None),
        ];

        for (origin, chain, to, value, gas_limit, pricing, data, simulation_failure) in requests {
            let value = NativeAmount::from_ether_str(value)
                .map(|v| v.wei())
                .unwrap_or_default();
            let params = TxParams {
                from: account,
                to,
                value,
                gas_limit,
                pricing,
                nonce: None,
                data,
            };
            state.push(origin, chain, params, simulation_failure);
        }

        Self {
            state: RwLock::new(state),
            polling: Mutex::default(),
        }
    }

    pub async fn add_transaction(
        &self,
        origin: &str,
        chain_id: ChainId,
        params: TxParams,
    ) -> TxId {
        self.state.write().await.push(origin, chain_id, params, None)
    }

    pub async fn set_balance(&self, address: Address, wei: U256) {
        self.state.write().await.balances.insert(address, wei);
    }

    pub async fn set_gas_price_fetch_failed(&self, failed: bool) {
        self.state.write().await.gas_price_fetch_failed = failed;
    }

    pub async fn set_name(&self, address: Address, name: &str) {
        self.state
            .write()
            .await
            .names
            .insert(address, name.to_string());
    }

    /// Moves a submitted transaction along, e.g. when a block includes it.
    pub async fn set_status(&self, id: TxId, status: TxStatus) -> Result<(), ControllerError> {
        let mut state = self.state.write().await;
        let tx = state.find_mut(id)?;
        debug!("tx {id}: {} -> {status}", tx.status);
        tx.status = status;
        Ok(())
    }

    pub async fn wallet_state(&self) -> WalletState {
        let state = self.state.read().await;
        WalletState {
            chain_id: state.chain_id,
            transactions: state.transactions.clone(),
            balances: state
                .balances
                .iter()
                .map(|(address, balance)| AccountBalance {
                    address: *address,
                    balance: *balance,
                })
                .collect(),
            base_fee: state.base_fee,
            gas_price_fetch_failed: state.gas_price_fetch_failed,
            no_gas_price: state.no_gas_price,
            next_nonce: Some(state.next_nonce),
            address_book: state.address_book.clone(),
            signing_or_submitting: false,
        }
    }

    pub async fn pending(&self, chain_id: ChainId) -> Vec<PendingTransaction> {
        self.state
            .read()
            .await
            .transactions
            .iter()
            .filter(|tx| tx.chain_id == chain_id && tx.status.is_unapproved())
            .cloned()
            .collect()
    }

    /// Signs and broadcasts in the real wallet; here it assigns the nonce and
    /// marks the transaction submitted.
    pub async fn approve_tx(
        &self,
        id: TxId,
        custom_nonce: Option<u64>,
    ) -> Result<(), ControllerError> {
        let mut state = self.state.write().await;
        let nonce = custom_nonce.unwrap_or(state.next_nonce);
        // 2^64 - 1 is reserved, no transaction can follow it
        let following = nonce
            .checked_add(1)
            .ok_or(ControllerError::NonceOutOfRange(nonce))?;

        let tx = state.find_unapproved_mut(id)?;
        tx.params.nonce = Some(nonce);
        tx.status = TxStatus::Submitted;
        state.next_nonce = state.next_nonce.max(following);

        info!("approved tx {id} with nonce {nonce}");
        Ok(())
    }

    pub async fn reject_tx(&self, id: TxId) -> Result<(), ControllerError> {
        let mut state = self.state.write().await;
        state.find_unapproved_mut(id)?.status = TxStatus::Rejected;
        info!("rejected tx {id}");
        Ok(())
    }

    /// Rejects every listed transaction that is still unapproved.
    ///
    /// Unknown ids fail the whole call before anything changes.
    pub async fn reject_all(&self, ids: &[TxId]) -> Result<usize, ControllerError> {
        let mut state = self.state.write().await;
        for id in ids {
            state.find_mut(*id)?;
        }

        let mut rejected = 0;
        for id in ids {
            let tx = state.find_mut(*id)?;
            if tx.status.is_unapproved() {
                tx.status = TxStatus::Rejected;
                rejected += 1;
            }
        }
        info!("rejected {rejected} of {} transactions", ids.len());
        Ok(rejected)
    }

    pub async fn next_nonce_value(&self) -> u64 {
        self.state.read().await.next_nonce
    }

    pub async fn update_gas(
        &self,
        id: TxId,
        gas: GasCustomization,
    ) -> Result<(), ControllerError> {
        let mut state = self.state.write().await;
        let tx = state.find_unapproved_mut(id)?;
        tx.params.gas_limit = gas.gas_limit;
        tx.params.pricing = gas.pricing;
        tx.user_fee_level = Some(UserFeeLevel::Custom);
        debug!("tx {id}: gas updated to limit {}", gas.gas_limit);
        Ok(())
    }

    pub async fn name_of(&self, address: Address) -> Option<String> {
        self.state.read().await.names.get(&address).cloned()
    }

    pub fn start_polling(&self) -> PollingToken {
        let mut polling = self.polling.lock().unwrap_or_else(|e| e.into_inner());
        polling.issued += 1;
        let token = PollingToken(format!("gas-poll-{}", polling.issued));
        polling.active.insert(token.clone());
        debug!("gas fee polling started: {token} ({} active)", polling.active.len());
        token
    }

    pub fn stop_polling(&self, token: &PollingToken) -> Result<(), ControllerError> {
        let mut polling = self.polling.lock().unwrap_or_else(|e| e.into_inner());
        if !polling.active.remove(token) {
            return Err(ControllerError::UnknownPollingToken(token.0.clone()));
        }
        debug!("gas fee polling stopped: {token} ({} active)", polling.active.len());
        Ok(())
    }

    pub fn active_polling_count(&self) -> usize {
        self.polling
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .active
            .len()
    }
}

impl ControllerState {
    fn push(
        &mut self,
        origin: &str,
        chain_id: ChainId,
        params: TxParams,
        simulation_failure: Option<SimulationFailure>,
    ) -> TxId {
        let id = TxId(self.next_id);
        self.next_id += 1;

        let token_data = params
            .to
            .and_then(|to| decode_token_data(to, &params.data));
        self.transactions.push(PendingTransaction {
            id,
            origin: origin.to_string(),
            time: now_millis(),
            chain_id,
            status: TxStatus::Unapproved,
            params,
            simulation_failure,
            user_fee_level: Some(UserFeeLevel::Medium),
            token_data,
        });
        id
    }

    fn find_mut(&mut self, id: TxId) -> Result<&mut PendingTransaction, ControllerError> {
        self.transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or(ControllerError::UnknownTransaction(id))
    }

    fn find_unapproved_mut(
        &mut self,
        id: TxId,
    ) -> Result<&mut PendingTransaction, ControllerError> {
        let tx = self.find_mut(id)?;
        if !tx.status.is_unapproved() {
            return Err(ControllerError::NotUnapproved {
                id,
                status: tx.status,
            });
        }
        Ok(tx)
    }
}

impl TransactionBackend for MemoryTxController {
    async fn pending_transactions(
        &self,
        chain_id: ChainId,
    ) -> Result<Vec<PendingTransaction>, ApiError> {
        Ok(self.pending(chain_id).await)
    }

    async fn approve(&self, id: TxId, custom_nonce: Option<u64>) -> Result<(), ApiError> {
        Ok(self.approve_tx(id, custom_nonce).await?)
    }

    async fn cancel(&self, id: TxId) -> Result<(), ApiError> {
        Ok(self.reject_tx(id).await?)
    }

    async fn cancel_all(&self, ids: Vec<TxId>) -> Result<(), ApiError> {
        self.reject_all(&ids).await?;
        Ok(())
    }

    async fn next_nonce(&self) -> Result<u64, ApiError> {
        Ok(self.next_nonce_value().await)
    }

    async fn update_gas_fees(&self, id: TxId, gas: GasCustomization) -> Result<(), ApiError> {
        Ok(self.update_gas(id, gas).await?)
    }

    async fn start_gas_fee_polling(&self) -> Result<PollingToken, ApiError> {
        Ok(self.start_polling())
    }

    fn stop_gas_fee_polling(&self, token: PollingToken) {
        if let Err(e) = self.stop_polling(&token) {
            warn!("{e}");
        }
    }
}

impl NameResolver for MemoryTxController {
    async fn reverse_resolve(&self, address: Address) -> Option<String> {
        self.name_of(address).await
    }
}

/// The process-wide controller behind the server functions.
pub async fn shared() -> &'static MemoryTxController {
    static CONTROLLER: OnceCell<MemoryTxController> = OnceCell::const_new();

    CONTROLLER
        .get_or_init(|| async {
            let config = ConfirmConfig::from_env();
            info!("seeding demo transactions on chain {}", config.chain_id);
            MemoryTxController::with_demo_data(config.chain_id)
        })
        .await
}
