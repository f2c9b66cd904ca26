//! Decides whether the focused transaction may be approved.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfirmErrorKind;
use crate::native_amount::NativeAmount;
use crate::tx::SimulationFailure;
use crate::tx::MIN_GAS_LIMIT;

/// Everything the checker looks at, already resolved by the caller.
#[derive(Debug, Clone, Copy)]
pub struct ValidityInput<'a> {
    pub value: NativeAmount,
    /// Worst-case fee for the gas values in effect.
    pub max_fee: NativeAmount,
    /// Sender balance; `None` while unknown, which skips the balance check.
    pub balance: Option<NativeAmount>,
    pub gas_limit: u64,
    pub simulation_failure: Option<&'a SimulationFailure>,
    /// The backend could not fetch a gas price for this network.
    pub no_gas_price: bool,
    /// The user entered gas values by hand, so a missing quote does not matter.
    pub gas_fee_is_custom: bool,
    pub signing_or_submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    pub valid: bool,
    pub error: Option<ConfirmErrorKind>,
}

impl Validity {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn failed(kind: ConfirmErrorKind) -> Self {
        Self {
            valid: !kind.blocks_submission(),
            error: Some(kind),
        }
    }
}

/// Returns the first matching problem, in priority order.
///
/// Balance comes before the gas-limit floor, a failed simulation is reported
/// but stays valid, and a missing gas price only matters for non-custom fees.
pub fn check_validity(input: &ValidityInput<'_>) -> Validity {
    let insufficient_balance = input
        .balance
        .is_some_and(|balance| input.value + input.max_fee > balance);
    if insufficient_balance {
        return Validity::failed(ConfirmErrorKind::InsufficientFunds);
    }

    if input.gas_limit < MIN_GAS_LIMIT {
        return Validity::failed(ConfirmErrorKind::GasLimitTooLow);
    }

    if let Some(failure) = input.simulation_failure {
        return Validity::failed(ConfirmErrorKind::SimulationFailure {
            reason: failure.reason.clone(),
        });
    }

    if input.no_gas_price && !input.gas_fee_is_custom {
        return Validity::failed(ConfirmErrorKind::GasPriceFetchFailure);
    }

    if input.signing_or_submitting {
        return Validity::failed(ConfirmErrorKind::SigningOrSubmitting);
    }

    Validity::ok()
}
