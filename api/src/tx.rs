//! Pending transactions as reported by the transaction backend.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::U256;
use serde::Deserialize;
use serde::Serialize;

pub type ChainId = u64;

/// Origin recorded for transactions the wallet itself created.
pub const WALLET_ORIGIN: &str = "wallet";

/// Protocol minimum for a plain value transfer.
pub const MIN_GAS_LIMIT: u64 = 21_000;

/// Backend-assigned transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub u64);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TxId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIs,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TxStatus {
    Unapproved,
    Approved,
    Submitted,
    Confirmed,
    Failed,
    Dropped,
    Rejected,
}

impl TxStatus {
    /// Statuses that end the confirmation flow with an acknowledgment.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Dropped)
    }
}

/// How the transaction pays for gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GasPricing {
    Legacy {
        gas_price: U256,
    },
    FeeMarket {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
}

impl GasPricing {
    pub fn is_fee_market(&self) -> bool {
        matches!(self, Self::FeeMarket { .. })
    }
}

/// Where the current gas values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserFeeLevel {
    Low,
    Medium,
    High,
    Custom,
    DappSuggested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParams {
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub pricing: GasPricing,
    pub nonce: Option<u64>,
    #[serde(default)]
    pub data: Bytes,
}

/// Result of a dry run that predicts the transaction will fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationFailure {
    pub reason: Option<String>,
}

/// Decoded token transfer/approval payload, when the data could be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub method: String,
    pub token_address: Address,
    pub recipient: Option<Address>,
    pub amount: Option<U256>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: TxId,
    /// Requesting site, or [`WALLET_ORIGIN`].
    pub origin: String,
    /// Creation time, milliseconds since the epoch.
    pub time: u64,
    pub chain_id: ChainId,
    pub status: TxStatus,
    pub params: TxParams,
    #[serde(default)]
    pub simulation_failure: Option<SimulationFailure>,
    #[serde(default)]
    pub user_fee_level: Option<UserFeeLevel>,
    #[serde(default)]
    pub token_data: Option<TokenData>,
}

impl PendingTransaction {
    pub fn is_wallet_initiated(&self) -> bool {
        self.origin == WALLET_ORIGIN
    }

    pub fn gas_fee_is_custom(&self) -> bool {
        self.user_fee_level == Some(UserFeeLevel::Custom)
    }
}

/// Candidate gas values while the user edits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasCustomization {
    pub gas_limit: u64,
    pub pricing: GasPricing,
}

impl From<&TxParams> for GasCustomization {
    fn from(params: &TxParams) -> Self {
        Self {
            gas_limit: params.gas_limit,
            pricing: params.pricing,
        }
    }
}
