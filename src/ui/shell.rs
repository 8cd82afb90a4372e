use dioxus::prelude::*;

use crate::app::Route;
use crate::ui::theme;
use crate::util::version::{version_label, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let current_route = use_route::<Route>();
    let nav = use_navigator();
    let version = version_label();

    rsx! {
        header { class: "shell-header",
            div {
                h1 { class: "shell-title", "{APP_NAME}" }
                span { class: "shell-version", "{version}" }
            }
            nav { class: "shell-nav",
                NavButton {
                    active: matches!(current_route, Route::Panel {}),
                    onclick: move |_| { nav.push(Route::Panel {}); },
                    label: "Carrier",
                }
                NavButton {
                    active: matches!(current_route, Route::Preferences {}),
                    onclick: move |_| { nav.push(Route::Preferences {}); },
                    label: "Preferences",
                }
            }
        }
        main { class: "shell-main",
            {children}
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: theme::nav_button(active),
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
