use dioxus::prelude::*;

#[component]
pub fn StatusRow(label: String, value: String, hint: Option<String>) -> Element {
    rsx! {
        div { class: "status-row",
            span { class: "status-label", "{label}" }
            span { class: "status-value",
                "{value}"
                if let Some(hint) = hint {
                    span { class: "hint", " {hint}" }
                }
            }
        }
    }
}
