//! The carrier monitor: status, settings and the operations that change them.
//!
//! One `Monitor` lives for the whole session. The UI calls into it for every
//! lifecycle step (start, poll, manual refresh, incoming events, CAPI data,
//! preference changes, stop). Every mutation of the status is mirrored to the
//! status file before the call returns.

use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde_json::Value;

use crate::domain::{
    fuel_alert, CapiCarrierUpdate, CarrierStatsUpdate, CarrierStatus, FuelAlert, HostConfig,
    PreferencesForm, Settings,
};
use crate::error::{report, MonitorError};
use crate::infra::{
    capi::export_fleetcarrier,
    journal::{default_journal_dir, find_latest_carrier_location, JournalTail},
    settings_store::SettingsStore,
    status_store::StatusStore,
};
use crate::util::persistence::HostConfigStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Location changed; status persisted.
    Updated(String),
    /// Journal agrees with the stored location.
    Unchanged(String),
    /// No journal, no matching event, or no journal directory.
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Updated {
        /// Set when this event supplied the carrier id for the first time.
        carrier_id_detected: Option<String>,
    },
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CapiOutcome {
    Exported(PathBuf),
    Ignored,
}

#[derive(Debug, Default)]
pub struct PollReport {
    pub events_applied: usize,
    pub location: Option<RefreshOutcome>,
    pub errors: Vec<MonitorError>,
}

impl PollReport {
    pub fn needs_redraw(&self) -> bool {
        self.events_applied > 0 || matches!(self.location, Some(RefreshOutcome::Updated(_)))
    }
}

pub struct Monitor {
    plugin_dir: PathBuf,
    status: CarrierStatus,
    settings: Settings,
    host: HostConfig,
    status_store: StatusStore,
    settings_store: SettingsStore,
    host_store: HostConfigStore,
    tail: JournalTail,
    last_refresh: Option<SystemTime>,
    last_export: Option<PathBuf>,
}

impl Monitor {
    /// Loads whatever state exists under `plugin_dir`. Unreadable files are
    /// logged and replaced by defaults.
    pub fn start(plugin_dir: impl Into<PathBuf>, host_store: HostConfigStore) -> Self {
        let plugin_dir = plugin_dir.into();
        if let Err(err) = std::fs::create_dir_all(&plugin_dir) {
            report(
                "creating plugin directory",
                &MonitorError::io(plugin_dir.display().to_string(), err),
            );
        }
        let status_store = StatusStore::in_dir(&plugin_dir);
        let settings_store = SettingsStore::in_dir(&plugin_dir);

        let status = match status_store.load() {
            Ok(Some(status)) => status,
            Ok(None) => CarrierStatus::default(),
            Err(err) => {
                report("loading carrier status", &err);
                CarrierStatus::default()
            }
        };
        let settings = match settings_store.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(err) => {
                report("loading settings", &err);
                Settings::default()
            }
        };
        let host = host_store.load().unwrap_or_else(|err| {
            report("loading host configuration", &err);
            HostConfig::default()
        });

        log::info!(
            "Fleet carrier monitor started in {} (threshold {}, carrier {})",
            plugin_dir.display(),
            settings.fuel_alert_threshold,
            settings.carrier_id.as_deref().unwrap_or("auto-detect"),
        );

        Self {
            plugin_dir,
            status,
            settings,
            host,
            status_store,
            settings_store,
            host_store,
            tail: JournalTail::new(),
            last_refresh: None,
            last_export: None,
        }
    }

    pub fn stop(&self) {
        log::info!("Fleet carrier monitor stopped");
    }

    pub fn status(&self) -> &CarrierStatus {
        &self.status
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn host_config(&self) -> &HostConfig {
        &self.host
    }

    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    pub fn journal_dir(&self) -> Option<PathBuf> {
        self.host.journal_dir.clone().or_else(default_journal_dir)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.host
            .export_dir
            .clone()
            .unwrap_or_else(|| self.plugin_dir.clone())
    }

    pub fn fuel_alert(&self) -> FuelAlert {
        fuel_alert(self.status.fuel, self.settings.fuel_alert_threshold)
    }

    pub fn last_refresh(&self) -> Option<SystemTime> {
        self.last_refresh
    }

    pub fn last_export(&self) -> Option<&Path> {
        self.last_export.as_deref()
    }

    /// Reconciles the stored location with the newest matching
    /// `CarrierLocation` event in the journal.
    pub fn refresh_location(&mut self) -> Result<RefreshOutcome, MonitorError> {
        self.last_refresh = Some(SystemTime::now());
        let Some(dir) = self.journal_dir() else {
            log::warn!("No journal directory configured and no home directory found");
            return Ok(RefreshOutcome::NotFound);
        };
        let Some(location) = find_latest_carrier_location(&dir, &self.settings)? else {
            return Ok(RefreshOutcome::NotFound);
        };
        if !self.status.set_location(&location) {
            return Ok(RefreshOutcome::Unchanged(location));
        }
        log::info!("Carrier location changed to {location}");
        self.status_store.save(&self.status)?;
        Ok(RefreshOutcome::Updated(location))
    }

    /// One scheduled tick: apply newly written journal events, then
    /// reconcile the location. Failures are collected, never raised.
    pub fn poll(&mut self) -> PollReport {
        let mut summary = PollReport::default();

        if let Some(dir) = self.journal_dir() {
            match self.tail.read_new_events(&dir) {
                Ok(events) => {
                    for event in &events {
                        match self.handle_journal_event(event) {
                            Ok(EventOutcome::Updated { .. }) => summary.events_applied += 1,
                            Ok(EventOutcome::Ignored) => {}
                            Err(err) => summary.errors.push(err),
                        }
                    }
                }
                Err(err) => summary.errors.push(err),
            }
        }

        match self.refresh_location() {
            Ok(outcome) => summary.location = Some(outcome),
            Err(err) => summary.errors.push(err),
        }
        summary
    }

    /// Game-event hook. Only `CarrierStats` changes anything.
    pub fn handle_journal_event(&mut self, entry: &Value) -> Result<EventOutcome, MonitorError> {
        let Some(update) = CarrierStatsUpdate::from_entry(entry) else {
            return Ok(EventOutcome::Ignored);
        };
        if !self.settings.accepts_carrier(update.carrier_id.as_deref()) {
            log::debug!(
                "Ignoring CarrierStats for carrier {:?}; tracking {:?}",
                update.carrier_id,
                self.settings.carrier_id
            );
            return Ok(EventOutcome::Ignored);
        }

        let carrier_id_detected = if self.settings.carrier_id.is_none() {
            update.carrier_id.clone()
        } else {
            None
        };
        // The id only counts as detected once it is on disk; otherwise the
        // next event tries again.
        if let Some(id) = &carrier_id_detected {
            let pinned = Settings {
                carrier_id: Some(id.clone()),
                ..self.settings.clone()
            };
            self.settings_store.save(&pinned)?;
            log::info!("Detected carrier id {id}");
            self.settings = pinned;
        }

        self.status.name = update.name;
        self.status.fuel = update.fuel;
        self.status.credits = update.credits;
        self.status_store.save(&self.status)?;
        Ok(EventOutcome::Updated {
            carrier_id_detected,
        })
    }

    /// CAPI `/fleetcarrier` hook: refresh the status from the payload and
    /// export it as JSON.
    pub fn handle_capi_fleetcarrier(&mut self, data: &Value) -> Result<CapiOutcome, MonitorError> {
        let update = CapiCarrierUpdate::from_payload(data);
        if let (Some(expected), Some(actual)) = (&self.settings.carrier_id, &update.market_id) {
            if expected != actual {
                log::debug!("Ignoring CAPI data for carrier {actual}; tracking {expected}");
                return Ok(CapiOutcome::Ignored);
            }
        }

        let before = self.status.clone();
        if let Some(name) = update.name {
            self.status.name = name;
        }
        if let Some(fuel) = update.fuel {
            self.status.fuel = fuel;
        }
        if let Some(credits) = update.credits {
            self.status.credits = credits;
        }
        if let Some(location) = update.location {
            self.status.location = location;
        }
        if self.status != before {
            self.status_store.save(&self.status)?;
        }

        let path = export_fleetcarrier(&self.export_dir(), data)?;
        log::info!("Exported CAPI fleet carrier data to {}", path.display());
        self.last_export = Some(path.clone());
        Ok(CapiOutcome::Exported(path))
    }

    pub fn preferences_form(&self) -> PreferencesForm {
        PreferencesForm::from_current(&self.settings, &self.host)
    }

    /// Settings-changed hook. Nothing is applied unless the whole form is
    /// valid and both files were written.
    pub fn apply_preferences(&mut self, form: &PreferencesForm) -> Result<(), MonitorError> {
        let (settings, host) = form.parse(&self.host)?;
        self.settings_store.save(&settings)?;
        self.host_store.save(&host)?;

        let journal_changed = host.journal_dir != self.host.journal_dir;
        self.settings = settings;
        self.host = host;
        if journal_changed {
            self.tail = JournalTail::new();
        }
        log::info!(
            "Preferences saved (threshold {}, carrier {})",
            self.settings.fuel_alert_threshold,
            self.settings.carrier_id.as_deref().unwrap_or("auto-detect"),
        );
        Ok(())
    }
}
