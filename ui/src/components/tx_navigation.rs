//! First/previous/next/last controls across the unapproved queue.

use api::navigation::Navigation;
use api::tx::TxId;
use dioxus::prelude::*;

#[component]
fn NavLink(label: &'static str, title: &'static str, target: Option<TxId>, on_select: EventHandler<TxId>) -> Element {
    let disabled = target.is_none();
    rsx! {
        a {
            href: "#",
            title: "{title}",
            "aria-disabled": if disabled { "true" } else { "false" },
            style: if disabled { "pointer-events: none; opacity: 0.4;" } else { "" },
            onclick: move |evt| {
                evt.prevent_default();
                if let Some(id) = target {
                    on_select.call(id);
                }
            },
            "{label}"
        }
    }
}

/// Hidden unless more than one transaction awaits approval.
#[component]
pub fn TxNavigation(navigation: Navigation, on_select: EventHandler<TxId>) -> Element {
    if !navigation.show_navigation() {
        return rsx! {};
    }

    let position = navigation
        .position
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    rsx! {
        nav {
            ul {
                li { NavLink { label: "«", title: "First", target: navigation.first, on_select } }
                li { NavLink { label: "‹", title: "Previous", target: navigation.prev, on_select } }
            }
            ul {
                li { small { "{position} of {navigation.total()}" } }
            }
            ul {
                li { NavLink { label: "›", title: "Next", target: navigation.next, on_select } }
                li { NavLink { label: "»", title: "Last", target: navigation.last, on_select } }
            }
        }
    }
}
