//! Companion API (CAPI) access and export.
//!
//! - `CapiClient` fetches the `/fleetcarrier` document with a user-supplied
//!   bearer token.
//! - `export_fleetcarrier` writes the last payload to the export directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::MonitorError;
use crate::util::version::{version_label, APP_NAME};

pub const DEFAULT_BASE_URL: &str = "https://companion.orerve.net/";
pub const EXPORT_FILENAME: &str = "fleetcarrier_capi.json";

#[derive(Debug, Error)]
pub enum CapiError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no CAPI access token configured")]
    MissingToken,
}

#[derive(Clone)]
pub struct CapiClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl CapiClient {
    pub fn new(base: Option<&str>, token: Option<&str>) -> Result<Self, CapiError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CapiError::MissingToken)?
            .to_string();
        let base_url = Url::parse(base.unwrap_or(DEFAULT_BASE_URL))?;
        let user_agent = format!("{}/{}", APP_NAME.replace(' ', "-"), version_label());
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn fleetcarrier_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join("fleetcarrier")
    }

    pub async fn fetch_fleetcarrier(&self) -> Result<Value, CapiError> {
        let url = self.fleetcarrier_url()?;
        log::info!("Requesting CAPI fleet carrier data from {url}");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    exported_at: String,
    data: &'a Value,
}

/// Writes `data` to `fleetcarrier_capi.json` in `dir`, replacing any earlier
/// export.
pub fn export_fleetcarrier(dir: &Path, data: &Value) -> Result<PathBuf, MonitorError> {
    fs::create_dir_all(dir)
        .map_err(|err| MonitorError::io(format!("creating export directory {}", dir.display()), err))?;
    let exported_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| MonitorError::parse("export timestamp", err))?;
    let document = ExportDocument { exported_at, data };
    let json = serde_json::to_string_pretty(&document)
        .map_err(|err| MonitorError::parse("CAPI export", err))?;
    let path = dir.join(EXPORT_FILENAME);
    fs::write(&path, json).map_err(|err| MonitorError::io(format!("writing {}", path.display()), err))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_requires_token() {
        assert!(matches!(CapiClient::new(None, None), Err(CapiError::MissingToken)));
        assert!(matches!(CapiClient::new(None, Some("  ")), Err(CapiError::MissingToken)));
    }

    #[test]
    fn endpoint_joins_base() {
        let client = CapiClient::new(Some("http://localhost:8080/capi/"), Some("t")).unwrap();
        assert_eq!(
            client.fleetcarrier_url().unwrap().as_str(),
            "http://localhost:8080/capi/fleetcarrier"
        );
        let client = CapiClient::new(None, Some("t")).unwrap();
        assert_eq!(
            client.fleetcarrier_url().unwrap().as_str(),
            "https://companion.orerve.net/fleetcarrier"
        );
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(matches!(
            CapiClient::new(Some("not a url"), Some("t")),
            Err(CapiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn export_wraps_payload_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let payload = json!({ "fuel": "500", "balance": 10 });
        let path = export_fleetcarrier(&target, &payload).unwrap();
        assert_eq!(path, target.join(EXPORT_FILENAME));

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["data"], payload);
        let stamp = written["exported_at"].as_str().unwrap();
        assert!(OffsetDateTime::parse(stamp, &Rfc3339).is_ok());
    }
}
