//! Thin Dioxus wrappers over Pico.css markup. The stylesheet is linked by
//! [`crate::App`].

use dioxus::html::input_data::keyboard_types::Key;
use dioxus::prelude::*;

/// `<main class="container">`
#[component]
pub fn Container(children: Element) -> Element {
    rsx! { main { class: "container", {children} } }
}

/// Pico lays the children out in equal columns.
#[component]
pub fn Grid(children: Element) -> Element {
    rsx! { div { class: "grid", {children} } }
}

#[component]
pub fn Card(children: Element) -> Element {
    rsx! { article { {children} } }
}

#[derive(PartialEq, Clone, Copy, Default)]
pub enum NoticeKind {
    #[default]
    Warning,
    Error,
}

/// A warning or error line with a colored edge.
#[component]
pub fn Notice(#[props(default)] kind: NoticeKind, children: Element) -> Element {
    let (role, color) = match kind {
        NoticeKind::Warning => ("status", "var(--pico-ins-color)"),
        NoticeKind::Error => ("alert", "var(--pico-del-color)"),
    };
    rsx! {
        p {
            role: role,
            style: "border-left: 4px solid {color}; padding-left: 0.75rem;",
            {children}
        }
    }
}

#[derive(PartialEq, Clone, Copy, Default)]
pub enum ButtonType {
    #[default]
    Primary,
    Secondary,
    Contrast,
}

impl ButtonType {
    fn class(self, outline: bool) -> &'static str {
        match (self, outline) {
            (Self::Primary, false) => "",
            (Self::Primary, true) => "outline",
            (Self::Secondary, false) => "secondary",
            (Self::Secondary, true) => "secondary outline",
            (Self::Contrast, false) => "contrast",
            (Self::Contrast, true) => "contrast outline",
        }
    }
}

/// `busy` shows Pico's spinner and blocks clicks like `disabled`.
#[component]
pub fn Button(
    children: Element,
    on_click: Option<EventHandler<MouseEvent>>,
    #[props(default)] button_type: ButtonType,
    #[props(default)] outline: bool,
    #[props(default)] disabled: bool,
    #[props(default)] busy: bool,
) -> Element {
    rsx! {
        button {
            class: button_type.class(outline),
            disabled: disabled || busy,
            "aria-busy": busy,
            onclick: move |evt| {
                if let Some(handler) = &on_click {
                    handler.call(evt);
                }
            },
            {children}
        }
    }
}

/// A labeled text field whose value is owned by the caller.
#[component]
pub fn Input(
    label: String,
    name: String,
    value: String,
    #[props(default = "text".to_string())] input_type: String,
    placeholder: Option<String>,
    #[props(default)] invalid: bool,
    on_input: Option<EventHandler<String>>,
) -> Element {
    rsx! {
        label {
            "{label}"
            input {
                r#type: input_type,
                name: name,
                value: value,
                placeholder: placeholder.unwrap_or_default(),
                "aria-invalid": invalid,
                oninput: move |evt| {
                    if let Some(handler) = &on_input {
                        handler.call(evt.value());
                    }
                },
            }
        }
    }
}

/// A titled `<dialog>`. The close link, a backdrop click and Escape all
/// fire `on_close`; the caller decides whether `open` changes.
#[component]
pub fn Modal(open: bool, title: String, on_close: EventHandler<()>, children: Element) -> Element {
    if !open {
        return rsx! {};
    }
    rsx! {
        dialog {
            open: true,
            onclick: move |_| on_close.call(()),
            onkeydown: move |evt| {
                if evt.key() == Key::Escape {
                    on_close.call(());
                }
            },
            article {
                onclick: |evt| evt.stop_propagation(),
                header {
                    a {
                        href: "#",
                        "aria-label": "Close",
                        class: "close",
                        onclick: move |evt| {
                            evt.prevent_default();
                            on_close.call(());
                        }
                    }
                    h3 { style: "margin-bottom: 0;", "{title}" }
                }
                {children}
            }
        }
    }
}
