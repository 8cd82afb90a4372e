//! Carrier status, settings and the pure rules applied to them.

pub mod carrier;
pub mod events;
pub mod settings;

pub use carrier::{format_credits, fuel_alert, CarrierStatus, FuelAlert, UNKNOWN};
pub use events::{CapiCarrierUpdate, CarrierLocation, CarrierStatsUpdate};
pub use settings::{HostConfig, PreferencesForm, Settings, DEFAULT_FUEL_ALERT_THRESHOLD};
