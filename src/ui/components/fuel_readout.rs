use std::time::Duration;

use dioxus::prelude::*;

use crate::app::PanelView;
use crate::ui::theme;

const BLINK_PERIOD: Duration = Duration::from_millis(500);

#[component]
pub fn FuelReadout() -> Element {
    let view = use_context::<Signal<PanelView>>();
    let mut blink_phase = use_signal(|| false);

    let _blinker = use_future(move || async move {
        loop {
            tokio::time::sleep(BLINK_PERIOD).await;
            if view.peek().alert.is_low() {
                let next = !*blink_phase.peek();
                blink_phase.set(next);
            } else if *blink_phase.peek() {
                blink_phase.set(false);
            }
        }
    });

    let (fuel, threshold, alert) = view.with(|v| (v.fuel, v.threshold, v.alert));
    let class = theme::fuel_class(alert, blink_phase());

    rsx! {
        div { class: "status-row",
            span { class: "status-label", "Fuel" }
            span {
                class: class,
                title: "Alert below {threshold}",
                "{fuel}"
                if alert.is_low() {
                    span { class: "fuel-warning", "LOW FUEL!" }
                }
            }
        }
    }
}
