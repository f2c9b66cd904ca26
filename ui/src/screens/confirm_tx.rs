//=============================================================================
// File: src/screens/confirm_tx.rs
//=============================================================================
//! Review and decide on one pending transaction.
//!
//! The screen owns a [`UiCoordinator`] for as long as it shows a given
//! transaction. Coordinator state is not reactive, so every action bumps a
//! revision signal once it settles.

use std::rc::Rc;

use api::coordinator::EditRequest;
use api::coordinator::SubmitOutcome;
use api::fee::DisplayAmount;
use api::native_amount::NativeAmount;
use api::prefs::user_prefs::UserPrefs;
use api::route::Route;
use api::telemetry::LogTelemetry;
use api::tx::GasCustomization;
use api::tx::GasPricing;
use api::tx::PendingTransaction;
use api::tx::TxId;
use api::tx::TxStatus;
use api::view_model::compose_view_model;
use api::view_model::ConfirmViewModel;
use dioxus::prelude::*;
use dioxus_logger::tracing::warn;

use crate::app_state::AppState;
use crate::app_state_mut::AppStateMut;
use crate::components::address::Address;
use crate::components::amount::Amount;
use crate::components::pico::Button;
use crate::components::pico::ButtonType;
use crate::components::pico::Card;
use crate::components::pico::Grid;
use crate::components::pico::Input;
use crate::components::pico::Modal;
use crate::components::pico::Notice;
use crate::components::pico::NoticeKind;
use crate::components::tx_navigation::TxNavigation;
use crate::gas_input::format_gwei;
use crate::gas_input::parse_gas_limit;
use crate::gas_input::parse_gwei;
use crate::hooks::use_before_unload::use_before_unload;
use crate::services::Prompt;
use crate::services::PromptKind;
use crate::services::ServerBackend;
use crate::services::ServerNames;
use crate::services::SignalDialogs;
use crate::services::SignalRouter;
use crate::services::UiCoordinator;
use crate::Screen;

#[allow(non_snake_case)]
#[component]
pub fn ConfirmTxScreen(tx_id: TxId) -> Element {
    let app_state_mut = use_context::<AppStateMut>();
    let mut active_screen = use_context::<Signal<Screen>>();

    let transaction = app_state_mut
        .wallet_state
        .read()
        .as_ref()
        .and_then(|state| state.transaction(tx_id).cloned());

    match transaction {
        Some(initial) => rsx! {
            ConfirmTx { initial }
        },
        None => rsx! {
            Card {
                h3 { "Transaction not found" }
                p { "Transaction {tx_id} is not pending on this network." }
                Button {
                    on_click: move |_| active_screen.set(Screen::default()),
                    "Back"
                }
            }
        },
    }
}

/// Spawns `action` against the coordinator and re-renders once it settles.
fn run<F, Fut>(coordinator: &Rc<UiCoordinator>, mut revision: Signal<u64>, action: F)
where
    F: FnOnce(Rc<UiCoordinator>) -> Fut,
    Fut: std::future::Future<Output = ()> + 'static,
{
    let fut = action(coordinator.clone());
    spawn(async move {
        fut.await;
        revision += 1;
    });
}

#[component]
fn ConfirmTx(initial: PendingTransaction) -> Element {
    let app_state = use_context::<AppState>();
    let app_state_mut = use_context::<AppStateMut>();
    let user_prefs = use_context::<UserPrefs>();
    let active_screen = use_context::<Signal<Screen>>();
    let prompt = use_signal(|| None::<Prompt>);
    let mut revision = use_signal(|| 0u64);
    let mut nonce_text = use_signal(String::new);

    let coordinator = use_hook(|| {
        let coordinator = UiCoordinator::new(
            ServerBackend,
            ServerNames,
            LogTelemetry,
            SignalRouter {
                screen: active_screen,
            },
            SignalDialogs { prompt },
            app_state.environment(),
        );
        let coordinator = if initial.is_wallet_initiated() {
            coordinator.with_edit_handler(move |request: EditRequest| {
                let mut screen = active_screen;
                screen.set(Screen::EditTransaction(request.transaction.id));
            })
        } else {
            coordinator
        };
        coordinator.set_most_recent_overview(Route::Home(*app_state_mut.last_overview.peek()));
        Rc::new(coordinator)
    });

    use_hook(|| {
        let tx = initial.clone();
        run(&coordinator, revision, |c| async move { c.mount(&tx).await });
    });

    use_drop({
        let coordinator = coordinator.clone();
        move || coordinator.unmount()
    });

    let on_unload = use_callback({
        let coordinator = coordinator.clone();
        move |_: ()| run(&coordinator, revision, |c| async move { c.handle_window_unload().await })
    });
    use_before_unload(on_unload);

    use_effect({
        let coordinator = coordinator.clone();
        move || {
            let Some(state) = app_state_mut.wallet_state.read().clone() else {
                return;
            };
            run(&coordinator, revision, |c| async move { c.sync(&state).await });
        }
    });

    // Subscribe to coordinator changes.
    let _ = revision();

    let rate = app_state_mut.rate();
    let view = app_state_mut
        .wallet_state
        .read()
        .as_ref()
        .and_then(|state| compose_view_model(state, &*coordinator, &user_prefs, rate.as_ref()));
    let Some(view) = view else {
        return rsx! {
            Card {
                p { "Loading..." }
                progress {}
            }
        };
    };

    let value = DisplayAmount::new(NativeAmount::from_wei(view.transaction.params.value), rate.as_ref());
    let is_fee_market = view.gas.pricing.is_fee_market();
    let title = view
        .method_name
        .clone()
        .unwrap_or_else(|| match view.to {
            Some(_) => "Send".to_string(),
            None => "Contract deployment".to_string(),
        });

    let c = coordinator.clone();
    let on_select = move |id: TxId| c.handle_next_tx(Some(id));

    let c = coordinator.clone();
    let on_edit = move |evt: MouseEvent| {
        evt.prevent_default();
        c.handle_edit();
    };

    let c = coordinator.clone();
    let on_edit_gas = move |evt: MouseEvent| {
        evt.prevent_default();
        c.handle_edit_gas(None);
        revision += 1;
    };

    let c = coordinator.clone();
    let on_nonce = move |text: String| {
        nonce_text.set(text.clone());
        run(&c, revision, |c| async move { c.set_custom_nonce_input(&text).await });
    };

    let c = coordinator.clone();
    let on_proceed = move |_: FormEvent| {
        c.acknowledge_gas_missing();
        revision += 1;
    };

    let c = coordinator.clone();
    let on_reject = move |_: MouseEvent| run(&c, revision, |c| async move { c.handle_cancel().await });

    let c = coordinator.clone();
    let on_reject_all = move |evt: MouseEvent| {
        evt.prevent_default();
        run(&c, revision, |c| async move {
            c.handle_cancel_all().await;
        });
    };

    let c = coordinator.clone();
    let on_confirm = move |_: MouseEvent| {
        run(&c, revision, move |c| async move {
            if let SubmitOutcome::Failed(e) = c.handle_submit().await {
                warn!("confirm failed: {e}");
            }
            let mut field = nonce_text;
            let typed = field.peek().clone();
            field.set(nonce_field_text(typed, c.custom_nonce()));
        })
    };

    let nonce_placeholder = view
        .next_nonce
        .map(|n| n.to_string())
        .unwrap_or_default();
    let status = view.transaction.status;

    rsx! {
        Card {
            TxNavigation {
                navigation: view.navigation.clone(),
                on_select,
            }

            header {
                hgroup {
                    h3 { "{title}" }
                    p { "{view.transaction.origin}" }
                }
                if view.can_edit {
                    a { href: "#", onclick: on_edit, "Edit" }
                }
            }

            Grid {
                div {
                    small { "From" }
                    br {}
                    Address { party: view.from.clone() }
                }
                div {
                    small { "To" }
                    br {}
                    match view.to.clone() {
                        Some(party) => rsx! { Address { party } },
                        None => rsx! { em { "New contract" } },
                    }
                }
            }

            if let Some(token) = view.transaction.token_data.as_ref() {
                p {
                    small {
                        "{token.method} "
                        code { "{token.token_address}" }
                        if let Some(symbol) = token.symbol.as_ref() { " ({symbol})" }
                    }
                }
            }

            if let Some(data) = view.data_hex.as_ref() {
                details {
                    summary { "Data" }
                    p { small { "Function type: " strong { "{view.function_type}" } } }
                    pre {
                        style: "white-space: pre-wrap; word-break: break-all;",
                        code { "{data}" }
                    }
                }
            }

            if let Some(warning) = view.gas_price_warning.as_ref() {
                Notice { "{warning}" }
            }

            table {
                class: "fee-table",
                tbody {
                    tr {
                        td { "Amount" }
                        td { Amount { amount: value } }
                    }
                    tr {
                        td {
                            "Estimated gas fee "
                            a { href: "#", onclick: on_edit_gas, "Edit" }
                        }
                        td { Amount { amount: view.fees.min_fee } }
                    }
                    if is_fee_market {
                        tr {
                            td { small { "Max fee" } }
                            td { small { Amount { amount: view.fees.max_fee } } }
                        }
                    }
                    tr {
                        td { strong { "Total" } }
                        td { strong { Amount { amount: view.fees.total } } }
                    }
                    if is_fee_market {
                        tr {
                            td { small { "Max amount" } }
                            td { small { Amount { amount: view.fees.max_total } } }
                        }
                    }
                }
            }

            if view.show_nonce_field {
                Input {
                    label: "Nonce".to_string(),
                    name: "nonce".to_string(),
                    input_type: "number".to_string(),
                    value: nonce_text(),
                    placeholder: nonce_placeholder,
                    invalid: view.nonce_warning.is_some(),
                    on_input: on_nonce,
                }
                if let Some(warning) = view.nonce_warning.as_ref() {
                    Notice { "{warning}" }
                }
            }

            if let Some(error) = view.validity.error.as_ref() {
                if error.blocks_submission() {
                    Notice { kind: NoticeKind::Error, "{error}" }
                } else {
                    Notice { "{error}" }
                }
            }

            if view.needs_failure_acknowledgment {
                label {
                    input {
                        r#type: "checkbox",
                        onchange: on_proceed,
                    }
                    "I understand and want to proceed anyway"
                }
            }

            if let Some(error) = view.submit_error.as_ref() {
                Notice { kind: NoticeKind::Error, "{error}" }
            }

            footer {
                Grid {
                    Button {
                        button_type: ButtonType::Secondary,
                        outline: true,
                        disabled: view.submitting,
                        on_click: on_reject,
                        "Reject"
                    }
                    Button {
                        disabled: view.confirm_disabled,
                        busy: view.submitting,
                        on_click: on_confirm,
                        "Confirm"
                    }
                }
                if view.unapproved_count > 1 {
                    p {
                        style: "text-align: center;",
                        a {
                            href: "#",
                            onclick: on_reject_all,
                            "Reject {view.unapproved_count} transactions"
                        }
                    }
                }
            }
        }

        if view.editing_gas {
            GasEditor {
                view: view.clone(),
                coordinator: CoordinatorHandle(coordinator.clone()),
                revision,
            }
        }

        PromptModal { prompt, status, revision }
    }
}

/// What the nonce field shows once the coordinator has settled a nonce.
/// A dropped custom nonce must not linger as text a retry would ignore.
fn nonce_field_text(typed: String, applied: Option<u64>) -> String {
    match applied {
        Some(_) => typed,
        None => String::new(),
    }
}

/// Lets the coordinator travel as a prop; identity is the only equality.
#[derive(Clone)]
struct CoordinatorHandle(Rc<UiCoordinator>);

impl PartialEq for CoordinatorHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Text of each gas field as typed, so partial input survives re-renders.
#[derive(Clone, Default, PartialEq)]
struct GasFields {
    gas_limit: String,
    /// Legacy gas price, or the fee-market max fee.
    price: String,
    priority: String,
}

impl GasFields {
    fn from_gas(gas: &GasCustomization) -> Self {
        match gas.pricing {
            GasPricing::Legacy { gas_price } => Self {
                gas_limit: gas.gas_limit.to_string(),
                price: format_gwei(gas_price),
                priority: String::new(),
            },
            GasPricing::FeeMarket {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => Self {
                gas_limit: gas.gas_limit.to_string(),
                price: format_gwei(max_fee_per_gas),
                priority: format_gwei(max_priority_fee_per_gas),
            },
        }
    }

    /// The customization these fields describe, or the first field error.
    fn parse(&self, fee_market: bool) -> Result<GasCustomization, String> {
        let gas_limit = parse_gas_limit(&self.gas_limit).map_err(|e| format!("Gas limit: {e}"))?;
        let price = parse_gwei(&self.price).map_err(|e| format!("Gas price: {e}"))?;
        let pricing = if fee_market {
            GasPricing::FeeMarket {
                max_fee_per_gas: price,
                max_priority_fee_per_gas: parse_gwei(&self.priority)
                    .map_err(|e| format!("Priority fee: {e}"))?,
            }
        } else {
            GasPricing::Legacy { gas_price: price }
        };
        Ok(GasCustomization { gas_limit, pricing })
    }
}

/// Mounted only while gas editing is open, so the fields start from the
/// values in effect at opening.
#[component]
fn GasEditor(view: ConfirmViewModel, coordinator: CoordinatorHandle, revision: Signal<u64>) -> Element {
    let mut revision = revision;
    let mut fields = use_signal(|| GasFields::from_gas(&view.gas));
    let mut field_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let fee_market = view.gas.pricing.is_fee_market();

    let c = coordinator.0.clone();
    let mut edit = move |update: &dyn Fn(&mut GasFields)| {
        update(&mut fields.write());
        match fields.peek().parse(fee_market) {
            Ok(gas) => {
                field_error.set(None);
                c.update_gas_draft(gas);
                revision += 1;
            }
            Err(e) => field_error.set(Some(e)),
        }
    };
    let mut edit_limit = edit.clone();
    let mut edit_priority = edit.clone();

    let c = coordinator.0.clone();
    let on_close = move |_: ()| {
        c.close_edit_gas();
        revision += 1;
    };

    let c = coordinator.0.clone();
    let on_save = move |_: MouseEvent| {
        if field_error.peek().is_some() {
            return;
        }
        saving.set(true);
        run(&c, revision, move |c| async move {
            if let Err(e) = c.save_gas_draft().await {
                field_error.set(Some(e.to_string()));
            }
            saving.set(false);
        });
    };

    let current = fields();
    rsx! {
        Modal {
            open: true,
            title: "Edit gas fee".to_string(),
            on_close,
            Input {
                label: "Gas limit".to_string(),
                name: "gas_limit".to_string(),
                value: current.gas_limit.clone(),
                on_input: move |text: String| edit_limit(&move |f: &mut GasFields| f.gas_limit = text.clone()),
            }
            Input {
                label: if fee_market { "Max fee (gwei)".to_string() } else { "Gas price (gwei)".to_string() },
                name: "gas_price".to_string(),
                value: current.price.clone(),
                on_input: move |text: String| edit(&move |f: &mut GasFields| f.price = text.clone()),
            }
            if fee_market {
                Input {
                    label: "Priority fee (gwei)".to_string(),
                    name: "priority_fee".to_string(),
                    value: current.priority.clone(),
                    on_input: move |text: String| edit_priority(&move |f: &mut GasFields| f.priority = text.clone()),
                }
            }
            p {
                "Estimated fee: "
                Amount { amount: view.fees.min_fee }
            }
            if let Some(error) = field_error() {
                Notice { kind: NoticeKind::Error, "{error}" }
            }
            footer {
                Button {
                    disabled: field_error().is_some(),
                    busy: saving(),
                    on_click: on_save,
                    "Save"
                }
            }
        }
    }
}

#[component]
fn PromptModal(prompt: Signal<Option<Prompt>>, status: TxStatus, revision: Signal<u64>) -> Element {
    let mut prompt = prompt;
    let mut revision = revision;
    let kind = prompt.read().as_ref().map(|p| p.kind);
    let mut answer = move |yes: bool| {
        if let Some(pending) = prompt.write().take() {
            pending.answer(yes);
        }
        revision += 1;
    };

    match kind {
        None => rsx! {},
        Some(PromptKind::RejectAll(count)) => rsx! {
            Modal {
                open: true,
                title: format!("Reject {count} transactions?"),
                on_close: move |_| answer(false),
                p { "All transactions awaiting approval on this network will be rejected." }
                footer {
                    Button {
                        button_type: ButtonType::Secondary,
                        outline: true,
                        on_click: move |_| answer(false),
                        "Cancel"
                    }
                    Button {
                        on_click: move |_| answer(true),
                        "Reject all"
                    }
                }
            }
        },
        Some(PromptKind::Settled) => {
            let message = match status {
                TxStatus::Dropped => "This transaction was dropped and will not be processed.",
                _ => "This transaction was already confirmed.",
            };
            rsx! {
                Modal {
                    open: true,
                    title: "Transaction no longer pending".to_string(),
                    on_close: move |_| answer(true),
                    p { "{message}" }
                    footer {
                        Button {
                            on_click: move |_| answer(true),
                            "OK"
                        }
                    }
                }
            }
        }
    }
}
