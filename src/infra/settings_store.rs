//! JSON settings file kept in the plugin directory.

use std::{
    fs,
    io::{self, ErrorKind as IoErrorKind},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{ser::Formatter, Serializer, Value};

use crate::domain::{Settings, DEFAULT_FUEL_ALERT_THRESHOLD};
use crate::error::MonitorError;

pub const SETTINGS_FILENAME: &str = "fleetcarrier_config.json";

#[derive(Serialize)]
struct SettingsFile<'a> {
    fuel_alert_threshold: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    carrier_id: Option<&'a str>,
}

/// Writes JSON on one line with `", "` between members and `": "` after
/// keys, escaping non-ASCII as `\uXXXX`. Files written by earlier versions
/// of the plugin use this layout, so they survive a load and save unchanged.
struct CompactSpacedFormatter;

impl Formatter for CompactSpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

fn render_settings(file: &SettingsFile<'_>) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, CompactSpacedFormatter);
    file.serialize(&mut serializer)?;
    Ok(out)
}

#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SETTINGS_FILENAME),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet.
    pub fn load(&self) -> Result<Option<Settings>, MonitorError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(MonitorError::io(
                    format!("reading {}", self.path.display()),
                    err,
                ))
            }
        };
        let raw: Value = serde_json::from_str(&content)
            .map_err(|err| MonitorError::parse(SETTINGS_FILENAME, err))?;
        settings_from_json(&raw).map(Some)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), MonitorError> {
        let file = SettingsFile {
            fuel_alert_threshold: settings.fuel_alert_threshold,
            carrier_id: settings.carrier_id.as_deref(),
        };
        let json =
            render_settings(&file).map_err(|err| MonitorError::parse(SETTINGS_FILENAME, err))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| MonitorError::io(format!("creating {}", parent.display()), err))?;
        }
        fs::write(&self.path, json)
            .map_err(|err| MonitorError::io(format!("writing {}", self.path.display()), err))
    }
}

fn settings_from_json(raw: &Value) -> Result<Settings, MonitorError> {
    let Some(object) = raw.as_object() else {
        return Err(MonitorError::parse(SETTINGS_FILENAME, "expected a JSON object"));
    };

    let fuel_alert_threshold = match object.get("fuel_alert_threshold") {
        None | Some(Value::Null) => DEFAULT_FUEL_ALERT_THRESHOLD,
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            MonitorError::ConfigInvalid(format!("fuel_alert_threshold {n} is not a whole number"))
        })?,
        Some(Value::String(s)) => crate::domain::settings::parse_threshold(s)?,
        Some(other) => {
            return Err(MonitorError::ConfigInvalid(format!(
                "fuel_alert_threshold has unexpected value {other}"
            )))
        }
    };
    if fuel_alert_threshold < 0 {
        return Err(MonitorError::ConfigInvalid(format!(
            "fuel_alert_threshold must not be negative (got {fuel_alert_threshold})"
        )));
    }

    let carrier_id = match object.get("carrier_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(MonitorError::ConfigInvalid(format!(
                "carrier_id has unexpected value {other}"
            )))
        }
    };

    Ok(Settings {
        fuel_alert_threshold,
        carrier_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SettingsStore::in_dir(dir.path()).load().unwrap().is_none());
    }

    #[test]
    fn load_then_save_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        for settings in [
            Settings::default(),
            Settings {
                fuel_alert_threshold: 75,
                carrier_id: Some("12345".into()),
            },
        ] {
            store.save(&settings).unwrap();
            let first = fs::read(store.path()).unwrap();
            let loaded = store.load().unwrap().unwrap();
            assert_eq!(loaded, settings);
            store.save(&loaded).unwrap();
            assert_eq!(fs::read(store.path()).unwrap(), first);
        }
    }

    #[test]
    fn absent_carrier_id_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        store.save(&Settings::default()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"fuel_alert_threshold": 200}"#);
    }

    #[test]
    fn plugin_written_files_survive_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        for raw in [
            r#"{"fuel_alert_threshold": 250}"#,
            r#"{"fuel_alert_threshold": 0, "carrier_id": "3700000001"}"#,
            r#"{"fuel_alert_threshold": 200, "carrier_id": "Nom\u00e1d \ud83d\ude80"}"#,
        ] {
            fs::write(store.path(), raw).unwrap();
            let loaded = store.load().unwrap().unwrap();
            store.save(&loaded).unwrap();
            assert_eq!(fs::read_to_string(store.path()).unwrap(), raw);
        }
    }

    #[test]
    fn lenient_value_types() {
        let settings =
            settings_from_json(&serde_json::json!({ "fuel_alert_threshold": "250", "carrier_id": 3700000001u64 }))
                .unwrap();
        assert_eq!(settings.fuel_alert_threshold, 250);
        assert_eq!(settings.carrier_id.as_deref(), Some("3700000001"));

        let settings = settings_from_json(&serde_json::json!({})).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_contents_are_classified() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());

        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load().unwrap_err().kind(), ErrorKind::ParseFailure);

        fs::write(store.path(), r#"{"fuel_alert_threshold": "lots"}"#).unwrap();
        assert_eq!(store.load().unwrap_err().kind(), ErrorKind::ConfigInvalid);

        fs::write(store.path(), r#"{"fuel_alert_threshold": -5}"#).unwrap();
        assert_eq!(store.load().unwrap_err().kind(), ErrorKind::ConfigInvalid);
    }
}
