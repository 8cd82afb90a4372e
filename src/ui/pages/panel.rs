use dioxus::prelude::*;

use crate::{
    app::{redraw, MonitorHandle, PanelView},
    error::report,
    infra::capi::CapiClient,
    monitor::{CapiOutcome, RefreshOutcome},
    ui::{
        components::{
            fuel_readout::FuelReadout,
            status_row::StatusRow,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
    util::humanize_age,
};

#[component]
pub fn PanelPage() -> Element {
    let handle = use_context::<MonitorHandle>();
    let view = use_context::<Signal<PanelView>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let mut capi_busy = use_signal(|| false);

    let snapshot = view();

    let on_refresh = {
        let handle = handle.clone();
        move |_| {
            match handle.with_mut(|monitor| monitor.refresh_location()) {
                Ok(RefreshOutcome::Updated(location)) => push_toast(
                    toasts,
                    ToastKind::Success,
                    format!("Carrier location updated: {location}"),
                ),
                Ok(RefreshOutcome::Unchanged(location)) => {
                    push_toast(toasts, ToastKind::Info, format!("Carrier is still in {location}."))
                }
                Ok(RefreshOutcome::NotFound) => push_toast(
                    toasts,
                    ToastKind::Warning,
                    "No carrier location found in the journal.",
                ),
                Err(err) => {
                    report("manual refresh", &err);
                    push_toast(toasts, ToastKind::Error, format!("Refresh failed: {err}"));
                }
            }
            // A manual refresh always redraws.
            redraw(&handle, view);
        }
    };

    let on_fetch_capi = {
        let handle = handle.clone();
        move |_| {
            if capi_busy() {
                return;
            }
            capi_busy.set(true);
            let handle = handle.clone();
            let mut capi_busy = capi_busy;
            spawn(async move {
                fetch_capi(&handle, toasts).await;
                redraw(&handle, view);
                capi_busy.set(false);
            });
        }
    };

    let last_refresh = snapshot
        .last_refresh
        .map(humanize_age)
        .unwrap_or_else(|| "never".to_string());
    let (carrier_value, carrier_hint) = carrier_id_display(snapshot.carrier_id.as_deref());

    rsx! {
        section { class: "panel",
            h2 { "Fleet Carrier" }
            StatusRow { label: "Name".to_string(), value: snapshot.name.clone() }
            StatusRow { label: "Location".to_string(), value: snapshot.location.clone() }
            FuelReadout {}
            StatusRow { label: "Credits".to_string(), value: snapshot.credits.clone() }
            StatusRow { label: "Carrier ID".to_string(), value: carrier_value, hint: carrier_hint }

            div { class: "actions",
                button {
                    class: theme::btn_primary(),
                    onclick: on_refresh,
                    "Manual Refresh"
                }
                if snapshot.capi_enabled {
                    button {
                        class: theme::btn_secondary(),
                        disabled: capi_busy(),
                        onclick: on_fetch_capi,
                        if capi_busy() { "Fetching..." } else { "Fetch CAPI" }
                    }
                }
            }
            p { class: "hint", "Last journal check: {last_refresh}" }
            if let Some(path) = snapshot.last_export.clone() {
                p { class: "hint", "Last CAPI export: {path}" }
            }
        }
    }
}

/// Value and hint for the carrier id row. Without a configured id the
/// monitor pins whichever carrier reports `CarrierStats` first.
fn carrier_id_display(carrier_id: Option<&str>) -> (String, Option<String>) {
    match carrier_id {
        Some(id) => (id.to_string(), None),
        None => (
            "not set".to_string(),
            Some("(auto-detect on next CarrierStats)".to_string()),
        ),
    }
}

async fn fetch_capi(handle: &MonitorHandle, toasts: Signal<Vec<ToastMessage>>) {
    let (base, token) = handle.with(|monitor| {
        let host = monitor.host_config();
        (host.capi_base_url.clone(), host.capi_token.clone())
    });
    let client = match CapiClient::new(base.as_deref(), token.as_deref()) {
        Ok(client) => client,
        Err(err) => {
            report("creating CAPI client", &err);
            push_toast(toasts, ToastKind::Error, format!("CAPI unavailable: {err}"));
            return;
        }
    };

    let data = match client.fetch_fleetcarrier().await {
        Ok(data) => data,
        Err(err) => {
            report("fetching CAPI fleet carrier", &err);
            push_toast(toasts, ToastKind::Error, format!("CAPI request failed: {err}"));
            return;
        }
    };

    match handle.with_mut(|monitor| monitor.handle_capi_fleetcarrier(&data)) {
        Ok(CapiOutcome::Exported(path)) => push_toast(
            toasts,
            ToastKind::Success,
            format!("CAPI data exported to {}", path.display()),
        ),
        Ok(CapiOutcome::Ignored) => push_toast(
            toasts,
            ToastKind::Warning,
            "CAPI returned a different carrier than the one tracked.",
        ),
        Err(err) => {
            report("applying CAPI data", &err);
            push_toast(toasts, ToastKind::Error, format!("CAPI export failed: {err}"));
        }
    }
}
