//! Error types shared by the confirmation flow and the in-memory backend.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::tx::TxId;
use crate::tx::TxStatus;

/// Reasons a pending transaction cannot be approved as-is.
///
/// These are computed, never raised: the validity checker reports at most one.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmErrorKind {
    #[error("insufficient funds for gas and amount")]
    InsufficientFunds,
    #[error("gas limit must be at least {}", crate::tx::MIN_GAS_LIMIT)]
    GasLimitTooLow,
    #[error("this transaction is expected to fail{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    SimulationFailure { reason: Option<String> },
    #[error("gas price estimation failed")]
    GasPriceFetchFailure,
    #[error("a transaction is already being signed or submitted")]
    SigningOrSubmitting,
}

impl ConfirmErrorKind {
    /// Whether this kind prevents submission.
    pub fn blocks_submission(&self) -> bool {
        !matches!(self, Self::SimulationFailure { .. })
    }
}

/// Failures of the in-memory transaction controller.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ControllerError {
    #[error("unknown transaction {0}")]
    UnknownTransaction(TxId),
    #[error("transaction {id} is {status}, not unapproved")]
    NotUnapproved { id: TxId, status: TxStatus },
    #[error("nonce {0} leaves no room for a following transaction")]
    NonceOutOfRange(u64),
    #[error("unknown gas fee polling token {0}")]
    UnknownPollingToken(String),
}
