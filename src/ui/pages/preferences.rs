use dioxus::prelude::*;

use crate::{
    app::{redraw, MonitorHandle, PanelView},
    domain::PreferencesForm,
    error::report,
    ui::{
        components::{
            error_dialog::ErrorDialog,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[component]
pub fn PreferencesPage() -> Element {
    let handle = use_context::<MonitorHandle>();
    let view = use_context::<Signal<PanelView>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let initial = use_hook({
        let handle = handle.clone();
        move || handle.with(|monitor| monitor.preferences_form())
    });
    let mut threshold_input = use_signal(|| initial.fuel_alert_threshold.clone());
    let mut carrier_input = use_signal(|| initial.carrier_id.clone());
    let mut export_input = use_signal(|| initial.export_dir.clone());
    let mut journal_input = use_signal(|| initial.journal_dir.clone());
    let mut token_input = use_signal(|| initial.capi_token.clone());
    let mut save_error = use_signal(|| None::<String>);

    let (plugin_dir, journal_dir, export_dir) = handle.with(|monitor| {
        (
            monitor.plugin_dir().display().to_string(),
            monitor
                .journal_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not found".to_string()),
            monitor.export_dir().display().to_string(),
        )
    });

    let on_save = {
        let handle = handle.clone();
        move |_| {
            let form = PreferencesForm {
                fuel_alert_threshold: threshold_input(),
                carrier_id: carrier_input(),
                export_dir: export_input(),
                journal_dir: journal_input(),
                capi_token: token_input(),
            };
            match handle.with_mut(|monitor| monitor.apply_preferences(&form)) {
                Ok(()) => {
                    redraw(&handle, view);
                    push_toast(toasts, ToastKind::Success, "Preferences saved.");
                }
                Err(err) => {
                    report("saving preferences", &err);
                    save_error.set(Some(err.to_string()));
                }
            }
        }
    };

    let on_reset = {
        let handle = handle.clone();
        move |_| {
            let current = handle.with(|monitor| monitor.preferences_form());
            threshold_input.set(current.fuel_alert_threshold);
            carrier_input.set(current.carrier_id);
            export_input.set(current.export_dir);
            journal_input.set(current.journal_dir);
            token_input.set(current.capi_token);
        }
    };

    rsx! {
        section { class: "panel",
            h2 { "Preferences" }
            div { class: "form-grid",
                label { "Alert if fuel below" }
                input {
                    value: threshold_input(),
                    oninput: move |evt| threshold_input.set(evt.value()),
                }
                label { "Carrier ID" }
                input {
                    value: carrier_input(),
                    placeholder: "auto-detect",
                    oninput: move |evt| carrier_input.set(evt.value()),
                }
                label { "Journal folder" }
                input {
                    value: journal_input(),
                    placeholder: "{journal_dir}",
                    oninput: move |evt| journal_input.set(evt.value()),
                }
                label { "CAPI export folder" }
                input {
                    value: export_input(),
                    placeholder: "{export_dir}",
                    oninput: move |evt| export_input.set(evt.value()),
                }
                label { "CAPI access token" }
                input {
                    r#type: "password",
                    value: token_input(),
                    oninput: move |evt| token_input.set(evt.value()),
                }
            }
            div { class: "actions",
                button { class: theme::btn_primary(), onclick: on_save, "Save" }
                button { class: theme::btn_secondary(), onclick: on_reset, "Revert" }
            }
            p { class: "hint", "Status, settings and debug log live in {plugin_dir}" }
        }
        if let Some(message) = save_error() {
            ErrorDialog {
                title: "Could not save preferences".to_string(),
                message,
                on_close: move |_| save_error.set(None),
            }
        }
    }
}
