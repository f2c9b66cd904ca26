//=============================================================================
// File: src/screens/edit_tx.rs
//=============================================================================
use crate::app_state_mut::AppStateMut;
use crate::components::pico::Button;
use crate::components::pico::ButtonType;
use crate::components::pico::Card;
use crate::Screen;
use api::native_amount::NativeAmount;
use api::tx::TxId;
use dioxus::prelude::*;

/// Where the "Edit" link of a wallet-initiated transaction leads: the send
/// details as they stand, with a way back to the review.
#[allow(non_snake_case)]
#[component]
pub fn EditTxScreen(tx_id: TxId) -> Element {
    let app_state_mut = use_context::<AppStateMut>();
    let mut active_screen = use_context::<Signal<Screen>>();

    let wallet = app_state_mut.wallet_state.read();
    let Some(tx) = wallet.as_ref().and_then(|state| state.transaction(tx_id)) else {
        return rsx! {
            Card {
                h3 { "Transaction not found" }
                Button {
                    on_click: move |_| active_screen.set(Screen::default()),
                    "Back"
                }
            }
        };
    };

    let value = NativeAmount::from_wei(tx.params.value).to_string_with_symbol();
    let recipient = tx
        .params
        .to
        .map(|to| to.to_checksum(None))
        .unwrap_or_else(|| "New contract".to_string());

    rsx! {
        Card {
            h3 { "Edit transaction" }
            table {
                tbody {
                    tr { td { "Recipient" } td { code { "{recipient}" } } }
                    tr { td { "Amount" } td { "{value}" } }
                    tr { td { "Gas limit" } td { "{tx.params.gas_limit}" } }
                    if let Some(token) = tx.token_data.as_ref() {
                        tr { td { "Token" } td { code { "{token.token_address}" } } }
                        if let Some(amount) = token.amount {
                            tr { td { "Token amount" } td { "{amount}" } }
                        }
                    }
                }
            }
            footer {
                Button {
                    button_type: ButtonType::Secondary,
                    on_click: move |_| active_screen.set(Screen::Confirm(tx_id)),
                    "Back to review"
                }
            }
        }
    }
}
