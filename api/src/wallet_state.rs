//! Snapshot of backend state the confirmation screen renders from.

use alloy_primitives::Address;
use alloy_primitives::U256;
use serde::Deserialize;
use serde::Serialize;

use crate::native_amount::NativeAmount;
use crate::tx::ChainId;
use crate::tx::PendingTransaction;
use crate::tx::TxId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: Address,
    pub balance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookEntry {
    pub address: Address,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletState {
    pub chain_id: ChainId,
    /// Every known transaction on every chain, in creation order.
    pub transactions: Vec<PendingTransaction>,
    pub balances: Vec<AccountBalance>,
    /// Current base fee per gas on `chain_id`, when the network reports one.
    pub base_fee: Option<U256>,
    /// Gas estimates could not be fetched and the network gas price is used.
    pub gas_price_fetch_failed: bool,
    /// No gas price at all is available.
    pub no_gas_price: bool,
    pub next_nonce: Option<u64>,
    pub address_book: Vec<AddressBookEntry>,
    /// Hardware signing or broadcasting is in progress elsewhere.
    pub signing_or_submitting: bool,
}

impl WalletState {
    pub fn transaction(&self, id: TxId) -> Option<&PendingTransaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    /// Unapproved transactions on the active chain.
    pub fn unapproved(&self) -> impl Iterator<Item = &PendingTransaction> + '_ {
        self.transactions
            .iter()
            .filter(|tx| tx.chain_id == self.chain_id && tx.status.is_unapproved())
    }

    pub fn unapproved_count(&self) -> usize {
        self.unapproved().count()
    }

    pub fn balance_of(&self, address: &Address) -> Option<NativeAmount> {
        self.balances
            .iter()
            .find(|entry| entry.address == *address)
            .map(|entry| NativeAmount::from_wei(entry.balance))
    }

    pub fn address_book_name(&self, address: &Address) -> Option<&str> {
        self.address_book
            .iter()
            .find(|entry| entry.address == *address)
            .map(|entry| entry.name.as_str())
    }
}
