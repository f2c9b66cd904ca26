//! Fee and total derivation for a pending transaction.

use alloy_primitives::U256;
use serde::Deserialize;
use serde::Serialize;

use crate::fiat_amount::FiatAmount;
use crate::native_amount::NativeAmount;
use crate::tx::GasCustomization;
use crate::tx::GasPricing;

/// Fiat side of a displayed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiatDisplay {
    Converted(FiatAmount),
    /// No conversion rate was available; show a marker instead of a figure.
    NoConversionRate,
}

impl FiatDisplay {
    pub fn amount(&self) -> Option<FiatAmount> {
        match self {
            Self::Converted(amount) => Some(*amount),
            Self::NoConversionRate => None,
        }
    }
}

/// A native amount together with its fiat rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAmount {
    pub native: NativeAmount,
    pub fiat: FiatDisplay,
}

impl DisplayAmount {
    pub fn new(native: NativeAmount, rate: Option<&FiatAmount>) -> Self {
        let fiat = match rate {
            Some(rate) => FiatDisplay::Converted(native.to_fiat(rate)),
            None => FiatDisplay::NoConversionRate,
        };
        Self { native, fiat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSummary {
    /// Fee at the currently quoted price and limit.
    pub min_fee: DisplayAmount,
    /// Worst-case fee; equals `min_fee` for legacy pricing.
    pub max_fee: DisplayAmount,
    /// Value plus `min_fee`.
    pub total: DisplayAmount,
    /// Value plus `max_fee`.
    pub max_total: DisplayAmount,
}

/// Computes the fee summary.
///
/// `base_fee` is the network's current base fee per gas, when known; it only
/// matters for fee-market pricing. `rate` is the price of one ether.
pub fn calculate_fees(
    value: NativeAmount,
    gas: &GasCustomization,
    base_fee: Option<U256>,
    rate: Option<&FiatAmount>,
) -> FeeSummary {
    let limit = U256::from(gas.gas_limit);

    let (min_per_gas, max_per_gas) = match gas.pricing {
        GasPricing::Legacy { gas_price } => (gas_price, gas_price),
        GasPricing::FeeMarket {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => {
            let effective = base_fee
                .map(|base| {
                    base.saturating_add(max_priority_fee_per_gas)
                        .min(max_fee_per_gas)
                })
                .unwrap_or(max_fee_per_gas);
            (effective, max_fee_per_gas)
        }
    };

    let min_fee = NativeAmount::from_wei(limit.saturating_mul(min_per_gas));
    let max_fee = NativeAmount::from_wei(limit.saturating_mul(max_per_gas));

    FeeSummary {
        min_fee: DisplayAmount::new(min_fee, rate),
        max_fee: DisplayAmount::new(max_fee, rate),
        total: DisplayAmount::new(value + min_fee, rate),
        max_total: DisplayAmount::new(value + max_fee, rate),
    }
}
