//! Everything the confirmation screen renders, assembled in one place.

use alloy_primitives::hex;
use alloy_primitives::Address;
use serde::Deserialize;
use serde::Serialize;

use crate::backend::Dialogs;
use crate::backend::NameResolver;
use crate::backend::Router;
use crate::backend::TransactionBackend;
use crate::coordinator::ConfirmationCoordinator;
use crate::fee::calculate_fees;
use crate::fee::FeeSummary;
use crate::fiat_amount::FiatAmount;
use crate::method;
use crate::native_amount::NativeAmount;
use crate::navigation::Navigation;
use crate::prefs::user_prefs::UserPrefs;
use crate::telemetry::Telemetry;
use crate::tx::GasCustomization;
use crate::tx::PendingTransaction;
use crate::validity::check_validity;
use crate::validity::Validity;
use crate::validity::ValidityInput;
use crate::wallet_state::WalletState;

pub const GAS_PRICE_FALLBACK_WARNING: &str =
    "Backup gas fees are shown because the main gas estimation service is unavailable.";

/// An address with whatever name the wallet knows for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub address: Address,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmViewModel {
    pub transaction: PendingTransaction,
    pub from: Counterparty,
    /// `None` for contract creation.
    pub to: Option<Counterparty>,
    /// Decoded contract method, if the call data is recognised.
    pub method_name: Option<String>,
    /// Classification shown above the raw call data.
    pub function_type: String,
    /// `0x`-prefixed call data; `None` for a plain value transfer.
    pub data_hex: Option<String>,
    pub gas: GasCustomization,
    pub editing_gas: bool,
    pub fees: FeeSummary,
    pub validity: Validity,
    pub navigation: Navigation,
    pub custom_nonce: Option<u64>,
    pub next_nonce: Option<u64>,
    /// Custom nonce when set, else the suggestion.
    pub displayed_nonce: Option<u64>,
    pub show_nonce_field: bool,
    pub nonce_warning: Option<String>,
    pub gas_price_warning: Option<String>,
    pub submit_error: Option<String>,
    pub submitting: bool,
    pub can_edit: bool,
    /// A predicted failure the user has not yet chosen to ignore.
    pub needs_failure_acknowledgment: bool,
    pub confirm_disabled: bool,
    pub unapproved_count: usize,
}

/// Builds the view model for the coordinator's focus, or `None` when nothing
/// is focused or the focus is missing from `state`.
pub fn compose_view_model<B, N, T, R, D>(
    state: &WalletState,
    coordinator: &ConfirmationCoordinator<B, N, T, R, D>,
    prefs: &UserPrefs,
    rate: Option<&FiatAmount>,
) -> Option<ConfirmViewModel>
where
    B: TransactionBackend,
    N: NameResolver,
    T: Telemetry,
    R: Router,
    D: Dialogs,
{
    let id = coordinator.focused_id()?;
    let transaction = state.transaction(id)?.clone();

    let draft = coordinator.gas_draft();
    let gas = draft.unwrap_or_else(|| GasCustomization::from(&transaction.params));
    let value = NativeAmount::from_wei(transaction.params.value);
    let fees = calculate_fees(value, &gas, state.base_fee, rate);

    let validity = check_validity(&ValidityInput {
        value,
        max_fee: fees.max_fee.native,
        balance: state.balance_of(&transaction.params.from),
        gas_limit: gas.gas_limit,
        simulation_failure: transaction.simulation_failure.as_ref(),
        no_gas_price: state.no_gas_price,
        gas_fee_is_custom: transaction.gas_fee_is_custom() || draft.is_some(),
        signing_or_submitting: state.signing_or_submitting,
    });

    let counterparty = |address: Address| Counterparty {
        address,
        name: state
            .address_book_name(&address)
            .map(str::to_string)
            .or_else(|| coordinator.resolved_name(&address)),
    };

    let custom_nonce = coordinator.custom_nonce();
    let next_nonce = coordinator.next_nonce().or(state.next_nonce);
    let submitting = coordinator.is_submitting();
    let needs_failure_acknowledgment =
        transaction.simulation_failure.is_some() && !coordinator.gas_missing_acknowledged();

    Some(ConfirmViewModel {
        from: counterparty(transaction.params.from),
        to: transaction.params.to.map(counterparty),
        method_name: method::method_name(&transaction.params.data).map(str::to_string),
        function_type: method::function_type(None, &transaction.params.data),
        data_hex: (!transaction.params.data.is_empty())
            .then(|| hex::encode_prefixed(&transaction.params.data)),
        gas,
        editing_gas: draft.is_some(),
        fees,
        navigation: Navigation::compute(&state.transactions, state.chain_id, id),
        custom_nonce,
        next_nonce,
        displayed_nonce: custom_nonce.or(next_nonce),
        show_nonce_field: prefs.use_nonce_field(),
        nonce_warning: coordinator.nonce_warning(),
        gas_price_warning: coordinator
            .gas_price_warning()
            .then(|| GAS_PRICE_FALLBACK_WARNING.to_string()),
        submit_error: coordinator.submit_error(),
        submitting,
        can_edit: coordinator.can_edit(),
        needs_failure_acknowledgment,
        confirm_disabled: !validity.valid || submitting || needs_failure_acknowledgment,
        unapproved_count: state.unapproved_count(),
        validity,
        transaction,
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;
    use crate::config::EnvironmentType;
    use crate::coordinator::tests::mounted;
    use crate::coordinator::tests::snapshot;
    use crate::coordinator::tests::Harness;
    use crate::fiat_currency::FiatCurrency;
    use crate::native_amount::gwei;
    use crate::tx::GasPricing;
    use crate::tx::SimulationFailure;
    use crate::wallet_state::AccountBalance;
    use crate::wallet_state::AddressBookEntry;

    fn eth(s: &str) -> U256 {
        NativeAmount::from_ether_str(s).unwrap().wei()
    }

    /// Focus tx 1 sending 1 ETH at 25000 x 10 gwei, with 5 ETH available.
    async fn funded() -> (Harness, WalletState) {
        let h = mounted(EnvironmentType::Popup).await;
        {
            let mut txs = h.backend.transactions.borrow_mut();
            txs[0].params.value = eth("1");
            txs[0].params.gas_limit = 25_000;
            txs[0].params.pricing = GasPricing::Legacy { gas_price: gwei(10) };
        }
        let mut state = snapshot(&h);
        state.balances.push(AccountBalance {
            address: state.transactions[0].params.from,
            balance: eth("5"),
        });
        (h, state)
    }

    fn prefs() -> UserPrefs {
        UserPrefs::default()
    }

    #[tokio::test]
    async fn composes_fees_validity_and_navigation() {
        let (h, state) = funded().await;
        let rate = FiatAmount::new_from_minor(200_000, FiatCurrency::USD);

        let view = compose_view_model(&state, &h.coordinator, &prefs(), Some(&rate)).unwrap();

        assert_eq!(view.fees.min_fee.native.to_string(), "0.00025");
        assert_eq!(view.fees.total.native.to_string_with_symbol(), "1.00025 ETH");
        assert_eq!(view.validity, Validity { valid: true, error: None });
        assert_eq!(view.navigation.position, Some(1));
        assert_eq!(view.navigation.total(), 4);
        assert_eq!(view.unapproved_count, 4);
        assert_eq!(view.displayed_nonce, Some(5));
        assert!(!view.confirm_disabled);
        assert!(!view.editing_gas);
    }

    #[tokio::test]
    async fn gas_draft_drives_the_figures() {
        let (h, mut state) = funded().await;
        state.transactions[0].params.value = eth("2.2");

        h.coordinator.handle_edit_gas(None);
        h.coordinator.update_gas_draft(GasCustomization {
            gas_limit: 100_000,
            pricing: GasPricing::Legacy { gas_price: gwei(8) },
        });

        let view = compose_view_model(&state, &h.coordinator, &prefs(), None).unwrap();
        assert!(view.editing_gas);
        assert_eq!(view.fees.min_fee.native.to_string(), "0.0008");
        assert_eq!(view.fees.total.native.to_string(), "2.2008");
    }

    #[tokio::test]
    async fn insufficient_balance_disables_confirm() {
        let (h, mut state) = funded().await;
        state.balances[0].balance = eth("1");

        let view = compose_view_model(&state, &h.coordinator, &prefs(), None).unwrap();
        assert!(!view.validity.valid);
        assert!(view.confirm_disabled);
    }

    #[tokio::test]
    async fn predicted_failure_needs_acknowledgment() {
        let (h, mut state) = funded().await;
        state.transactions[0].simulation_failure = Some(SimulationFailure { reason: None });

        let view = compose_view_model(&state, &h.coordinator, &prefs(), None).unwrap();
        assert!(view.validity.valid);
        assert!(view.needs_failure_acknowledgment);
        assert!(view.confirm_disabled);

        h.coordinator.acknowledge_gas_missing();
        let view = compose_view_model(&state, &h.coordinator, &prefs(), None).unwrap();
        assert!(!view.confirm_disabled);
    }

    #[tokio::test]
    async fn names_prefer_the_address_book() {
        let (h, mut state) = funded().await;
        let to = state.transactions[0].params.to.unwrap();
        state.address_book.push(AddressBookEntry {
            address: to,
            name: "Savings".into(),
        });

        let view = compose_view_model(&state, &h.coordinator, &prefs(), None).unwrap();
        assert_eq!(view.to.unwrap().name.as_deref(), Some("Savings"));
        assert_eq!(view.from.name, None);
    }

    #[tokio::test]
    async fn call_data_is_shown_as_hex() {
        let (h, mut state) = funded().await;
        let view = compose_view_model(&state, &h.coordinator, &prefs(), None).unwrap();
        assert_eq!(view.data_hex, None);
        assert_eq!(view.function_type, method::CONTRACT_INTERACTION);

        state.transactions[0].params.data =
            alloy_primitives::Bytes::from_static(&[0x09, 0x5e, 0xa7, 0xb3, 0x00, 0x2a]);
        let view = compose_view_model(&state, &h.coordinator, &prefs(), None).unwrap();
        assert_eq!(view.data_hex.as_deref(), Some("0x095ea7b3002a"));
        assert_eq!(view.function_type, "approve");
    }

    #[tokio::test]
    async fn nothing_to_show_without_focus() {
        let (h, state) = funded().await;
        h.coordinator.unmount();
        assert!(compose_view_model(&state, &h.coordinator, &prefs(), None).is_none());
    }
}
