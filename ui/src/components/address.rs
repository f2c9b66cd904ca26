use crate::compat;
use crate::components::pico::Button;
use crate::components::pico::ButtonType;
use crate::components::pico::Modal;
use alloy_primitives::Address as EvmAddress;
use api::view_model::Counterparty;
use dioxus::prelude::*;

/// `0x1234…cdef`
fn abbreviate(address: &EvmAddress) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

#[component]
pub fn CopyButton(text_to_copy: String) -> Element {
    let mut copied = use_signal(|| false);
    let clipboard = compat::use_clipboard_handle();
    rsx! {
        Button {
            button_type: ButtonType::Secondary,
            outline: true,
            on_click: move |_| {
                let text = text_to_copy.clone();
                spawn(async move {
                    copied.set(clipboard.copy(text).await);
                });
            },
            if copied() { "Copied" } else { "Copy" }
        }
    }
}

/// A counterparty's name, or its abbreviated address when it has none.
/// Clicking opens the full checksummed address.
#[component]
pub fn Address(party: Counterparty) -> Element {
    let mut is_modal_open = use_signal(|| false);
    let full_address = party.address.to_checksum(None);
    let label = party.name.clone().unwrap_or_else(|| abbreviate(&party.address));

    rsx! {
        Modal {
            open: is_modal_open(),
            title: party.name.clone().unwrap_or_else(|| "Address".to_string()),
            on_close: move |_| is_modal_open.set(false),
            code {
                style: "display: block; word-break: break-all; padding: 1rem; margin-bottom: 1rem;",
                "{full_address}"
            }
            div {
                style: "display: flex; justify-content: center; gap: 0.5rem;",
                CopyButton { text_to_copy: full_address.clone() }
                Button {
                    on_click: move |_| is_modal_open.set(false),
                    "Close"
                }
            }
        }

        span {
            style: "cursor: pointer;",
            title: "{full_address}",
            onclick: move |_| is_modal_open.set(true),
            if party.name.is_some() {
                strong { "{label}" }
            } else {
                code { "{label}" }
            }
        }
    }
}
