use dioxus::prelude::*;

/// Modal popup for failures the user has to acknowledge.
#[component]
pub fn ErrorDialog(title: String, message: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "dialog-backdrop",
            div { class: "dialog", role: "alertdialog",
                h3 { "{title}" }
                p { "{message}" }
                div { class: "actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| on_close.call(()),
                        "OK"
                    }
                }
            }
        }
    }
}
