// The client-side Dioxus application logic.

use dioxus::prelude::*;

mod app_state;
mod app_state_mut;
pub mod compat;
mod components;
pub mod hooks;
mod screens;
mod gas_input;
mod services;

use api::config::ConfirmConfig;
use api::prefs::user_prefs::UserPrefs;
use api::price_map::PriceMap;
use api::route::HomeTab;
use api::route::Route;
use api::tx::TxId;
use api::wallet_state::WalletState;
use app_state::AppState;
use app_state_mut::AppStateMut;
use components::pico::Container;
use screens::confirm_tx::ConfirmTxScreen;
use screens::edit_tx::EditTxScreen;
use screens::overview::OverviewScreen;

/// How often the pending set is re-read from the backend.
const WALLET_REFRESH_SECS: u64 = 3;

/// Enum to represent the different screens in our application.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum Screen {
    Overview(HomeTab),
    Confirm(TxId),
    EditTransaction(TxId),
}

impl Default for Screen {
    fn default() -> Self {
        Self::Overview(HomeTab::default())
    }
}

impl From<Route> for Screen {
    fn from(route: Route) -> Self {
        match route {
            Route::Home(tab) => Self::Overview(tab),
            Route::Confirm(id) => Self::Confirm(id),
            Route::EditTransaction(id) => Self::EditTransaction(id),
        }
    }
}

impl Screen {
    /// Helper to get the display name for each screen.
    fn name(&self) -> &'static str {
        match self {
            Screen::Overview(HomeTab::Assets) => "Assets",
            Screen::Overview(HomeTab::Activity) => "Activity",
            Screen::Confirm(_) => "Confirm Transaction",
            Screen::EditTransaction(_) => "Edit Transaction",
        }
    }

    /// Where to start: the first transaction awaiting approval, if any.
    fn initial(state: &WalletState) -> Self {
        state
            .unapproved()
            .next()
            .map(|tx| Self::Confirm(tx.id))
            .unwrap_or_default()
    }
}

const ALL_TABS: [Screen; 2] = [
    Screen::Overview(HomeTab::Assets),
    Screen::Overview(HomeTab::Activity),
];

/// The overview navigation tabs component.
#[component]
fn Tabs(active_screen: Signal<Screen>) -> Element {
    rsx! {
        nav {
            class: "tab-menu",
            ul {
                for screen in ALL_TABS {
                    li {
                        a {
                            href: "#",
                            class: if active_screen() == screen { "active-tab" } else { "" },
                            "aria-current": if active_screen() == screen { "page" } else { "false" },
                            onclick: move |event| {
                                event.prevent_default();
                                active_screen.set(screen);
                            },
                            "{screen.name()}"
                        }
                    }
                }
            }
        }
    }
}

//=============================================================================
// MAIN APPLICATION COMPONENT (Client-side)
//=============================================================================

#[allow(non_snake_case)]
pub fn App() -> Element {
    let confirm_css = r#"
    html, body { height: 100%; margin: 0; }

    /* Popup-sized column; fullscreen windows just get wider margins. */
    .confirm-frame {
        display: flex;
        flex-direction: column;
        height: 100vh;
        max-width: 40rem;
        margin: 0 auto;
    }

    .confirm-frame header { flex-shrink: 0; }
    .confirm-frame .content { flex: 1; overflow-y: auto; min-height: 0; }

    .tab-menu a { border-bottom: 3px solid transparent; }
    .tab-menu a.active-tab {
        color: var(--pico-primary);
        border-bottom-color: var(--pico-primary);
    }

    .fee-table td:last-child { text-align: right; }
"#;

    rsx! {
        document::Meta {
            name: "viewport",
            content: "width=device-width, initial-scale=1.0",
        }
        document::Stylesheet {
            href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.cyan.min.css",
        }
        style {
            "{confirm_css}"
        }
        AppBody {}
    }
}

#[component]
fn AppBody() -> Element {
    // this will be processed on server before initial page is delivered.
    let initial_data_future = use_server_future(move || async move {
        // call the server apis concurrently
        let (config_result, prefs_result, wallet_result) = tokio::join!(
            api::confirm_config(),
            api::get_user_prefs(),
            api::wallet_state()
        );

        let config = config_result?;
        let user_prefs = prefs_result?;
        let wallet = wallet_result?;

        dioxus_logger::tracing::info!("prefs: {:#?}", user_prefs);

        Ok::<_, api::ApiError>((config, user_prefs, wallet))
    })?;

    // Read from the single future to ensure it's polled during SSR.
    let body = match &*initial_data_future.read() {
        Some(Ok((config, prefs, wallet))) => {
            rsx! {
                LoadedApp {
                    config: *config,
                    user_prefs: *prefs,
                    wallet: wallet.clone(),
                }
            }
        }
        Some(Err(e)) => rsx! {
            p {
                "An error occurred: {e}"
            }
        },
        _ => rsx! {
            p {
                "Loading..."
            }
        },
    };
    body
}

/// This component holds the main app logic and only runs when data is ready.
#[component]
fn LoadedApp(config: ConfirmConfig, user_prefs: UserPrefs, wallet: WalletState) -> Element {
    // Provide the stable, non-reactive AppState.
    use_context_provider(|| AppState::new(config));
    use_context_provider(|| user_prefs);

    let active_screen = use_signal(|| Screen::initial(&wallet));

    // Create signals for mutable state at the top level of the component.
    let prices_signal = use_signal(|| None);
    let display_preference_signal = use_signal(|| user_prefs.display_preference().to_owned());
    let wallet_signal = use_signal(|| Some(wallet.clone()));
    let last_overview_signal = use_signal(HomeTab::default);

    use_context_provider(|| AppStateMut {
        prices: prices_signal,
        display_preference: display_preference_signal,
        wallet_state: wallet_signal,
        last_overview: last_overview_signal,
    });
    let mut app_state_mut = use_context::<AppStateMut>();

    let prices_resource = use_resource(move || async move {
        if display_preference_signal.peek().is_fiat_enabled() {
            // Fetch fiat prices from the backend ONLY if fiat mode is enabled.
            api::fiat_prices().await
        } else {
            Ok(PriceMap::default())
        }
    });

    let wallet_resource = use_resource(move || async move { api::wallet_state().await });

    use_coroutine(move |_rx: UnboundedReceiver<()>| {
        let mut res = prices_resource;
        async move {
            loop {
                compat::sleep(std::time::Duration::from_secs(60)).await;
                if display_preference_signal.read().is_fiat_enabled() {
                    res.restart();
                }
            }
        }
    });

    use_coroutine(move |_rx: UnboundedReceiver<()>| {
        let mut res = wallet_resource;
        async move {
            loop {
                compat::sleep(std::time::Duration::from_secs(WALLET_REFRESH_SECS)).await;
                res.restart();
            }
        }
    });

    use_effect(move || {
        if display_preference_signal.read().is_fiat_enabled() {
            if let Some(Ok(price_map)) = prices_resource.read().as_ref() {
                // This check prevents infinite loops if the resource returns the same data.
                if app_state_mut.prices.peek().as_ref() != Some(price_map) {
                    app_state_mut.prices.set(Some(price_map.clone()));
                }
            }
        } else if app_state_mut.prices.peek().is_some() {
            app_state_mut.prices.set(None);
        }
    });

    use_effect(move || match wallet_resource.read().as_ref() {
        Some(Ok(state)) => {
            if app_state_mut.wallet_state.peek().as_ref() != Some(state) {
                app_state_mut.wallet_state.set(Some(state.clone()));
            }
        }
        Some(Err(e)) => dioxus_logger::tracing::warn!("wallet state refresh failed: {e}"),
        None => {}
    });

    // Remember the overview tab so decisions land back where the user was.
    use_effect(move || {
        if let Screen::Overview(tab) = active_screen() {
            if *app_state_mut.last_overview.peek() != tab {
                app_state_mut.last_overview.set(tab);
            }
        }
    });

    use_context_provider(|| active_screen);

    rsx! {
        div {
            class: "confirm-frame",
            Container {
                header {
                    nav {
                        ul {
                            li { strong { "{active_screen().name()}" } }
                        }
                        ul {
                            li {
                                Tabs {
                                    active_screen,
                                }
                            }
                        }
                    }
                }
                div {
                    class: "content",
                    match active_screen() {
                        Screen::Overview(tab) => rsx! {
                            OverviewScreen {
                                tab,
                            }
                        },
                        Screen::Confirm(tx_id) => rsx! {
                            ConfirmTxScreen {
                                key: "{tx_id}",
                                tx_id,
                            }
                        },
                        Screen::EditTransaction(tx_id) => rsx! {
                            EditTxScreen {
                                key: "edit-{tx_id}",
                                tx_id,
                            }
                        },
                    }
                }
            }
        }
    }
}
