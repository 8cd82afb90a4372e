use std::{cell::RefCell, rc::Rc, time::SystemTime};

use dioxus::{prelude::*, signals::Signal};

use crate::{
    domain::FuelAlert,
    error::report,
    infra::poller::{run_periodic, StopSignal, POLL_INTERVAL},
    monitor::Monitor,
    ui::{
        components::toast::{Toast, ToastMessage},
        pages::{PanelPage, PreferencesPage},
        shell::Shell,
    },
    util::{assets, persistence::HostConfigStore, plugin_dir},
};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Panel {},
    #[route("/preferences")]
    Preferences {},
}

/// Shared, non-reactive access to the session's monitor. Components redraw
/// through [`PanelView`], which is only replaced when something changed.
#[derive(Clone)]
pub struct MonitorHandle(Rc<RefCell<Monitor>>);

impl MonitorHandle {
    pub fn new(monitor: Monitor) -> Self {
        Self(Rc::new(RefCell::new(monitor)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&Monitor) -> R) -> R {
        f(&self.0.borrow())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Monitor) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    pub fn view(&self) -> PanelView {
        self.with(PanelView::from_monitor)
    }
}

impl PartialEq for MonitorHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Snapshot of everything the panel renders.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelView {
    pub name: String,
    pub location: String,
    pub fuel: i64,
    pub credits: String,
    pub alert: FuelAlert,
    pub threshold: i64,
    pub carrier_id: Option<String>,
    pub last_refresh: Option<SystemTime>,
    pub last_export: Option<String>,
    pub capi_enabled: bool,
}

impl PanelView {
    pub fn from_monitor(monitor: &Monitor) -> Self {
        let status = monitor.status();
        Self {
            name: status.name.clone(),
            location: status.location.clone(),
            fuel: status.fuel,
            credits: status.credits.clone(),
            alert: monitor.fuel_alert(),
            threshold: monitor.settings().fuel_alert_threshold,
            carrier_id: monitor.settings().carrier_id.clone(),
            last_refresh: monitor.last_refresh(),
            last_export: monitor.last_export().map(|p| p.display().to_string()),
            capi_enabled: monitor.host_config().capi_token.is_some(),
        }
    }
}

/// Redraws the panel from the monitor's current state.
pub fn redraw(handle: &MonitorHandle, mut view: Signal<PanelView>) {
    let next = handle.view();
    if *view.peek() != next {
        view.set(next);
    }
}

#[component]
pub fn App() -> Element {
    // Catch up with the current journal before the first render; after
    // that the poller takes over.
    let handle = use_hook(|| {
        let handle = MonitorHandle::new(Monitor::start(
            plugin_dir(),
            HostConfigStore::platform_default(),
        ));
        poll_once(&handle);
        handle
    });
    use_context_provider(|| handle.clone());

    let view = use_signal(|| handle.view());
    use_context_provider(|| view);

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts);

    let stop = use_hook(|| Rc::new(StopSignal::new()));

    use_future({
        let handle = handle.clone();
        let stop = stop.clone();
        move || {
            let handle = handle.clone();
            let listener = stop.subscribe();
            async move {
                run_periodic(POLL_INTERVAL, listener, move || poll_tick(&handle, view)).await;
            }
        }
    });

    use_drop({
        let handle = handle.clone();
        let stop = stop.clone();
        move || {
            stop.stop();
            handle.with(|monitor| monitor.stop());
        }
    });

    rsx! {
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

/// Runs one poll and reports whether the panel needs a redraw.
fn poll_once(handle: &MonitorHandle) -> bool {
    let summary = handle.with_mut(|monitor| monitor.poll());
    for err in &summary.errors {
        report("journal poll", err);
    }
    summary.needs_redraw()
}

fn poll_tick(handle: &MonitorHandle, view: Signal<PanelView>) {
    if poll_once(handle) {
        redraw(handle, view);
    }
}

#[component]
pub fn Panel() -> Element {
    rsx! { Shell { PanelPage {} } }
}

#[component]
pub fn Preferences() -> Element {
    rsx! { Shell { PreferencesPage {} } }
}
