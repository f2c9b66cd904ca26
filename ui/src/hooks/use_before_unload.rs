//! Runs a callback when the window hosting the app is about to close.

// Conditionally export the correct module based on the target platform.

#[cfg(target_arch = "wasm32")]
pub use self::wasm32::*;

#[cfg(all(not(target_arch = "wasm32"), feature = "dioxus-desktop"))]
pub use self::desktop::*;

// Fallback for platforms without a closable window, such as the server.
#[cfg(all(not(target_arch = "wasm32"), not(feature = "dioxus-desktop")))]
pub use self::fallback::*;

/// # Desktop Implementation
/// Listens for the native window's close request.
#[cfg(all(not(target_arch = "wasm32"), feature = "dioxus-desktop"))]
mod desktop {
    use dioxus::prelude::*;
    use dioxus_desktop::tao::event::Event;
    use dioxus_desktop::tao::event::WindowEvent;
    use dioxus_desktop::use_wry_event_handler;

    pub fn use_before_unload(on_unload: Callback<()>) {
        use_wry_event_handler(move |event, _| {
            if let Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } = event
            {
                on_unload.call(());
            }
        });
    }
}

/// # WebAssembly (WASM) Implementation
/// Registers a `beforeunload` listener on the browser window for as long as
/// the calling component is mounted.
#[cfg(target_arch = "wasm32")]
mod wasm32 {
    use std::rc::Rc;

    use dioxus::prelude::*;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::JsValue;

    pub fn use_before_unload(on_unload: Callback<()>) {
        let listener = use_hook(|| {
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                on_unload.call(());
            });
            if let Some(window) = web_sys::window() {
                let _ = window.add_event_listener_with_callback(
                    "beforeunload",
                    closure.as_ref().unchecked_ref(),
                );
            }
            Rc::new(closure)
        });

        use_drop(move || {
            let callback: &JsValue = listener.as_ref().as_ref();
            if let Some(window) = web_sys::window() {
                let _ = window
                    .remove_event_listener_with_callback("beforeunload", callback.unchecked_ref());
            }
        });
    }
}

/// # Fallback/Server Implementation
#[cfg(all(not(target_arch = "wasm32"), not(feature = "dioxus-desktop")))]
mod fallback {
    use dioxus::prelude::*;

    pub fn use_before_unload(_on_unload: Callback<()>) {}
}
