use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::domain::HostConfig;
use crate::error::MonitorError;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FleetCarrierMonitor";
const APP_NAME: &str = "FleetCarrierMonitor";
const HOST_CONFIG_FILENAME: &str = "host_config.json";

/// Where the desktop shell keeps its own configuration (export directory,
/// journal override, CAPI token).
#[derive(Clone, Debug)]
pub struct HostConfigStore {
    path: Option<PathBuf>,
}

impl HostConfigStore {
    pub fn platform_default() -> Self {
        Self {
            path: ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
                .map(|dirs| dirs.config_dir().join(HOST_CONFIG_FILENAME)),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn load(&self) -> Result<HostConfig, MonitorError> {
        let Some(path) = &self.path else {
            return Ok(HostConfig::default());
        };
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(HostConfig::default()),
            Err(err) => return Err(MonitorError::io(format!("reading {}", path.display()), err)),
        };
        serde_json::from_str(&data).map_err(|err| MonitorError::parse(HOST_CONFIG_FILENAME, err))
    }

    pub fn save(&self, config: &HostConfig) -> Result<(), MonitorError> {
        let path = self.path.as_ref().ok_or_else(|| {
            MonitorError::ConfigInvalid("no configuration directory available on this system".into())
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| MonitorError::io(format!("creating {}", parent.display()), err))?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| MonitorError::parse(HOST_CONFIG_FILENAME, err))?;
        fs::write(path, json).map_err(|err| MonitorError::io(format!("writing {}", path.display()), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = HostConfigStore::at(dir.path().join("nested").join(HOST_CONFIG_FILENAME));
        assert_eq!(store.load().unwrap(), HostConfig::default());

        let config = HostConfig {
            export_dir: Some(dir.path().join("exports")),
            capi_token: Some("secret".into()),
            ..HostConfig::default()
        };
        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }
}
