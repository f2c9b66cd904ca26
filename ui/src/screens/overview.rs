//=============================================================================
// File: src/screens/overview.rs
//=============================================================================
use crate::app_state_mut::AppStateMut;
use crate::components::pico::Button;
use crate::components::pico::Card;
use crate::Screen;
use api::native_amount::NativeAmount;
use api::route::HomeTab;
use api::tx::PendingTransaction;
use api::wallet_state::WalletState;
use chrono::DateTime;
use dioxus::prelude::*;

fn format_time(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[component]
fn TxRow(tx: PendingTransaction, review: bool) -> Element {
    let mut active_screen = use_context::<Signal<Screen>>();
    let value = NativeAmount::from_wei(tx.params.value).to_string_with_symbol();
    let id = tx.id;

    rsx! {
        tr {
            td { title: "{tx.origin}", "{format_time(tx.time)}" }
            td { "{tx.origin}" }
            td { "{value}" }
            td {
                if review {
                    Button {
                        on_click: move |_| active_screen.set(Screen::Confirm(id)),
                        "Review"
                    }
                } else {
                    "{tx.status}"
                }
            }
        }
    }
}

#[component]
fn TxTable(title: String, transactions: Vec<PendingTransaction>, review: bool, empty: String) -> Element {
    rsx! {
        Card {
            h3 { "{title}" }
            if transactions.is_empty() {
                p { "{empty}" }
            } else {
                table {
                    thead { tr {
                        th { "Date" }
                        th { "Origin" }
                        th { "Amount" }
                        th { if review { "" } else { "Status" } }
                    }}
                    tbody {
                        for tx in transactions {
                            TxRow { key: "{tx.id}", tx, review }
                        }
                    }
                }
            }
        }
    }
}

fn assets(state: &WalletState) -> Element {
    let pending: Vec<PendingTransaction> = state.unapproved().cloned().collect();
    rsx! {
        Card {
            h3 { "Accounts" }
            table {
                tbody {
                    for account in state.balances.iter() {
                        tr {
                            td { code { "{account.address}" } }
                            td { "{NativeAmount::from_wei(account.balance).to_string_with_symbol()}" }
                        }
                    }
                }
            }
        }
        TxTable {
            title: "Awaiting approval".to_string(),
            transactions: pending,
            review: true,
            empty: "Nothing to approve.".to_string(),
        }
    }
}

fn activity(state: &WalletState) -> Element {
    let settled: Vec<PendingTransaction> = state
        .transactions
        .iter()
        .filter(|tx| tx.chain_id == state.chain_id && !tx.status.is_unapproved())
        .rev()
        .cloned()
        .collect();
    rsx! {
        TxTable {
            title: "Activity".to_string(),
            transactions: settled,
            review: false,
            empty: "No activity yet.".to_string(),
        }
    }
}

#[allow(non_snake_case)]
#[component]
pub fn OverviewScreen(tab: HomeTab) -> Element {
    let app_state_mut = use_context::<AppStateMut>();
    let wallet_state = app_state_mut.wallet_state.read();

    match wallet_state.as_ref() {
        None => rsx! {
            Card {
                p { "Loading..." }
                progress {}
            }
        },
        Some(state) => match tab {
            HomeTab::Assets => assets(state),
            HomeTab::Activity => activity(state),
        },
    }
}
