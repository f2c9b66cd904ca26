//! Defines the mutable, reactive state for the application's UI.

use api::fiat_amount::FiatAmount;
use api::prefs::display_preference::DisplayPreference;
use api::price_map::PriceMap;
use api::route::HomeTab;
use api::wallet_state::WalletState;
use dioxus::prelude::*;

/// A reactive state provided as a Dioxus context for mutable UI data.
///
/// Holds `Signal`s for anything that changes while the window is open. It is
/// separate from the immutable `AppState`.
#[derive(Clone, Copy)]
pub struct AppStateMut {
    /// Latest fiat prices. `None` while loading or when fiat is disabled.
    pub prices: Signal<Option<PriceMap>>,
    pub display_preference: Signal<DisplayPreference>,
    /// Latest snapshot from the transaction backend. `None` until first load.
    pub wallet_state: Signal<Option<WalletState>>,
    /// The overview tab the user last visited.
    pub last_overview: Signal<HomeTab>,
}

impl AppStateMut {
    /// Price of one native coin in the preferred fiat currency, if known.
    pub fn rate(&self) -> Option<FiatAmount> {
        let fiat = self.display_preference.read().fiat()?;
        self.prices.read().as_ref()?.get(fiat)
    }
}
