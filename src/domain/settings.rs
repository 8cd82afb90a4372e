use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

pub const DEFAULT_FUEL_ALERT_THRESHOLD: i64 = 200;

/// Plugin-level settings, stored next to the status file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub fuel_alert_threshold: i64,
    /// Once known, only events for this carrier are accepted.
    pub carrier_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuel_alert_threshold: DEFAULT_FUEL_ALERT_THRESHOLD,
            carrier_id: None,
        }
    }
}

impl Settings {
    /// Whether an event carrying `event_id` belongs to the tracked carrier.
    /// With no carrier configured every event is accepted; with one
    /// configured, an event without an id counts as a mismatch.
    pub fn accepts_carrier(&self, event_id: Option<&str>) -> bool {
        match (&self.carrier_id, event_id) {
            (None, _) => true,
            (Some(expected), Some(actual)) => expected == actual,
            (Some(_), None) => false,
        }
    }
}

/// Values the desktop shell keeps on behalf of the plugin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capi_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capi_base_url: Option<String>,
}

/// Raw strings as typed into the preferences page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreferencesForm {
    pub fuel_alert_threshold: String,
    pub carrier_id: String,
    pub export_dir: String,
    pub journal_dir: String,
    pub capi_token: String,
}

impl PreferencesForm {
    pub fn from_current(settings: &Settings, host: &HostConfig) -> Self {
        let path_text = |path: &Option<PathBuf>| {
            path.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        Self {
            fuel_alert_threshold: settings.fuel_alert_threshold.to_string(),
            carrier_id: settings.carrier_id.clone().unwrap_or_default(),
            export_dir: path_text(&host.export_dir),
            journal_dir: path_text(&host.journal_dir),
            capi_token: host.capi_token.clone().unwrap_or_default(),
        }
    }

    /// Validates the form into the settings and host config it describes.
    /// `base_host` supplies the fields the form does not edit.
    pub fn parse(&self, base_host: &HostConfig) -> Result<(Settings, HostConfig), MonitorError> {
        let fuel_alert_threshold = parse_threshold(&self.fuel_alert_threshold)?;
        let settings = Settings {
            fuel_alert_threshold,
            carrier_id: non_empty(&self.carrier_id),
        };
        let host = HostConfig {
            export_dir: non_empty(&self.export_dir).map(PathBuf::from),
            journal_dir: non_empty(&self.journal_dir).map(PathBuf::from),
            capi_token: non_empty(&self.capi_token),
            capi_base_url: base_host.capi_base_url.clone(),
        };
        Ok((settings, host))
    }
}

pub fn parse_threshold(raw: &str) -> Result<i64, MonitorError> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        MonitorError::ConfigInvalid(format!("fuel alert threshold '{}' is not a whole number", raw.trim()))
    })?;
    if value < 0 {
        return Err(MonitorError::ConfigInvalid(format!(
            "fuel alert threshold must not be negative (got {value})"
        )));
    }
    Ok(value)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn carrier_filter() {
        let open = Settings::default();
        assert!(open.accepts_carrier(None));
        assert!(open.accepts_carrier(Some("1")));

        let pinned = Settings {
            carrier_id: Some("12345".into()),
            ..Settings::default()
        };
        assert!(pinned.accepts_carrier(Some("12345")));
        assert!(!pinned.accepts_carrier(Some("999")));
        assert!(!pinned.accepts_carrier(None));
    }

    #[test]
    fn form_parses_and_blanks_become_none() {
        let form = PreferencesForm {
            fuel_alert_threshold: " 350 ".into(),
            carrier_id: "".into(),
            export_dir: "/tmp/exports".into(),
            journal_dir: "  ".into(),
            capi_token: "".into(),
        };
        let base = HostConfig {
            capi_base_url: Some("http://localhost:9000/".into()),
            ..HostConfig::default()
        };
        let (settings, host) = form.parse(&base).unwrap();
        assert_eq!(settings.fuel_alert_threshold, 350);
        assert_eq!(settings.carrier_id, None);
        assert_eq!(host.export_dir, Some(PathBuf::from("/tmp/exports")));
        assert_eq!(host.journal_dir, None);
        assert_eq!(host.capi_token, None);
        assert_eq!(host.capi_base_url.as_deref(), Some("http://localhost:9000/"));
    }

    #[test]
    fn bad_threshold_is_config_invalid() {
        for raw in ["", "abc", "12.5", "-1"] {
            let err = parse_threshold(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid, "input {raw:?}");
        }
    }

    #[test]
    fn form_round_trips_current_values() {
        let settings = Settings {
            fuel_alert_threshold: 120,
            carrier_id: Some("3700000001".into()),
        };
        let host = HostConfig {
            export_dir: Some(PathBuf::from("/data/fc")),
            ..HostConfig::default()
        };
        let form = PreferencesForm::from_current(&settings, &host);
        let (parsed_settings, parsed_host) = form.parse(&host).unwrap();
        assert_eq!(parsed_settings, settings);
        assert_eq!(parsed_host, host);
    }
}
