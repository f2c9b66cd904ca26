//! Platform seams: timers and the clipboard differ between the browser and
//! native targets.

#[cfg(target_arch = "wasm32")]
pub use wasm32::*;

#[cfg(not(target_arch = "wasm32"))]
pub use non_wasm32::*;

#[cfg(target_arch = "wasm32")]
pub mod wasm32 {
    use std::time::Duration;

    use wasm_bindgen_futures::JsFuture;

    pub async fn sleep(duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }

    /// The browser clipboard needs no per-component state.
    #[derive(Clone, Copy)]
    pub struct ClipboardHandle;

    pub fn use_clipboard_handle() -> ClipboardHandle {
        ClipboardHandle
    }

    impl ClipboardHandle {
        /// `false` when the page has no clipboard access.
        pub async fn copy(self, text: String) -> bool {
            let Some(window) = web_sys::window() else {
                return false;
            };
            let promise = window.navigator().clipboard().write_text(&text);
            JsFuture::from(promise).await.is_ok()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod non_wasm32 {
    use std::time::Duration;

    use dioxus_clipboard::prelude::use_clipboard;
    use dioxus_clipboard::prelude::UseClipboard;

    pub async fn sleep(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Must be created during render, like any hook.
    #[derive(Clone, Copy)]
    pub struct ClipboardHandle(UseClipboard);

    pub fn use_clipboard_handle() -> ClipboardHandle {
        ClipboardHandle(use_clipboard())
    }

    impl ClipboardHandle {
        pub async fn copy(self, text: String) -> bool {
            let mut clipboard = self.0;
            clipboard.set(text).is_ok()
        }
    }
}
