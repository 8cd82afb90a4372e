//! Class helpers shared by the panel and preferences pages.

use crate::domain::FuelAlert;

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "btn btn-active"
    } else {
        "btn"
    }
}

pub fn btn_primary() -> &'static str {
    "btn btn-primary"
}

pub fn btn_secondary() -> &'static str {
    "btn"
}

/// Low fuel alternates between the alert colour and the background on
/// every blink phase.
pub fn fuel_class(alert: FuelAlert, blink_phase: bool) -> &'static str {
    match (alert, blink_phase) {
        (FuelAlert::Normal, _) => "status-value fuel-normal",
        (FuelAlert::Low, false) => "status-value fuel-low",
        (FuelAlert::Low, true) => "status-value fuel-low-dim",
    }
}
