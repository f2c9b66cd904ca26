//! A component for displaying currency amounts with a toggle-on-hover feature.

use crate::app_state_mut::AppStateMut;
use api::fee::DisplayAmount;
use api::fee::FiatDisplay;
use api::native_amount::NativeAmount;
use api::prefs::display_preference::DisplayPreference;
use dioxus::prelude::*;

const NO_CONVERSION_RATE: &str = "No conversion rate available";

/// Displays a native amount and flips to its fiat equivalent on hover or
/// tap-and-hold, following the user's display preference.
///
/// When fiat is enabled but no rate was available, the fiat side shows a
/// marker instead of a figure.
#[component]
pub fn Amount(amount: DisplayAmount) -> Element {
    let app_state_mut = use_context::<AppStateMut>();
    let mut is_flipped = use_signal(|| false);

    let preference = *app_state_mut.display_preference.read();

    let format_native = |amt: NativeAmount| amt.to_string_with_symbol();
    let format_fiat = |fiat: FiatDisplay| match fiat {
        FiatDisplay::Converted(amt) => amt.to_string_with_symbol(),
        FiatDisplay::NoConversionRate => NO_CONVERSION_RATE.to_string(),
    };

    let DisplayPreference::FiatEnabled { display_as_fiat, .. } = preference else {
        // Native-only mode: a plain span without hover effects.
        let native = format_native(amount.native);
        return rsx! {
            span {
                title: "{amount.native} ETH",
                "{native}"
            }
        };
    };

    let show_fiat = if is_flipped() {
        !display_as_fiat
    } else {
        display_as_fiat
    };
    let main_text = if show_fiat {
        format_fiat(amount.fiat)
    } else {
        format_native(amount.native)
    };

    // Always the lossless native figure, plus the fiat side and the rate.
    let tooltip_text = match (amount.fiat, app_state_mut.rate()) {
        (FiatDisplay::Converted(fiat), Some(rate)) => format!(
            "{} ETH\n\n{}\n\n1 ETH = {}",
            amount.native,
            fiat.to_string_with_code(),
            rate.to_string_with_code()
        ),
        _ => format!("{} ETH\n\n{NO_CONVERSION_RATE}", amount.native),
    };

    rsx! {
        span {
            onmouseenter: move |_| is_flipped.set(true),
            onmouseleave: move |_| is_flipped.set(false),
            ontouchstart: move |_| is_flipped.set(true),
            ontouchend: move |_| is_flipped.set(false),
            oncontextmenu: move |e| e.stop_propagation(),

            title: "{tooltip_text}",
            cursor: "pointer",
            "{main_text}"
        }
    }
}
