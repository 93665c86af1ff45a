//! Client for the file-registration service (DTS).

use std::path::Path;
use std::time::UNIX_EPOCH;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DtsConfig;
use crate::error::{ClientError, Result};
use crate::http;
use crate::identity::{
    IdentityRecord, IdentityService, dir_name, file_name, placeholder_id, site_url,
};

/// Body of a registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub ccc_id: String,
    pub name: String,
    pub size: u64,
    pub location: Vec<FileLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLocation {
    /// Gateway URL of the site holding the file.
    pub site: String,
    /// Directory containing the file.
    pub path: String,
    /// Modification time, seconds since the epoch.
    pub timestamp_updated: u64,
    pub user: UserRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub name: String,
}

impl RegistrationPayload {
    /// Describes the file at `path` from its local metadata.
    pub fn for_file(path: &Path, site_id: &str, user: &str) -> Result<Self> {
        let absolute = std::path::absolute(path).map_err(|e| ClientError::io(path, e))?;
        let metadata = std::fs::metadata(&absolute).map_err(|e| ClientError::io(&absolute, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| ClientError::io(&absolute, e))?
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        let display = absolute.to_string_lossy();
        Ok(Self {
            ccc_id: placeholder_id(&display),
            name: file_name(&display).to_string(),
            size: metadata.len(),
            location: vec![FileLocation {
                site: site_url(site_id)?.to_string(),
                path: dir_name(&display).to_string(),
                timestamp_updated: modified,
                user: UserRef {
                    name: user.to_string(),
                },
            }],
        })
    }
}

#[derive(Debug, Deserialize)]
struct StoredFile {
    name: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    location: Vec<StoredLocation>,
}

#[derive(Debug, Deserialize)]
struct StoredLocation {
    #[serde(default)]
    path: Option<String>,
}

impl From<StoredFile> for IdentityRecord {
    fn from(file: StoredFile) -> Self {
        let path = file
            .path
            .or_else(|| file.location.into_iter().find_map(|l| l.path));
        Self {
            name: file.name,
            path,
            size: file.size,
        }
    }
}

/// Blocking HTTP client for `/api/v1/dts/file`.
pub struct DtsClient {
    client: Client,
    config: DtsConfig,
}

impl DtsClient {
    pub fn new(config: DtsConfig) -> Result<Self> {
        let client = http::build_client(&config.auth_token, config.timeout)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DtsConfig {
        &self.config
    }
}

impl IdentityService for DtsClient {
    fn register(&self, path: &str, site_id: &str, user: &str) -> Result<String> {
        let payload = RegistrationPayload::for_file(Path::new(path), site_id, user)?;
        let url = self.config.files_url();
        debug!(%url, ccc_id = %payload.ccc_id, "registering file");
        let response = self.client.post(&url).json(&payload).send()?;
        if !response.status().is_success() {
            warn!(path, status = response.status().as_u16(), "registration failed");
            if self.lookup(&payload.ccc_id)?.is_some() {
                return Err(ClientError::AlreadyRegistered(payload.ccc_id));
            }
            return Err(http::status_error("POST", &url, response));
        }
        let body = response.text()?;
        let assigned = body.trim().trim_matches('"');
        if assigned.is_empty() {
            Ok(payload.ccc_id)
        } else {
            Ok(assigned.to_string())
        }
    }

    fn lookup(&self, ccc_id: &str) -> Result<Option<IdentityRecord>> {
        let url = self.config.file_url(ccc_id)?;
        let response = self.client.get(url.clone()).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(ccc_id, "identifier not registered");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http::status_error("GET", url.as_str(), response));
        }
        let file: StoredFile = serde_json::from_str(&response.text()?)?;
        Ok(Some(file.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_file_falls_back_to_location_path() {
        let file: StoredFile = serde_json::from_str(
            r#"{"cccId": "x", "name": "a.bam", "size": 12,
                "location": [{"site": "http://10.73.127.6", "path": "/data"}]}"#,
        )
        .unwrap();
        let record = IdentityRecord::from(file);
        assert_eq!(record.name, "a.bam");
        assert_eq!(record.path.as_deref(), Some("/data"));
        assert_eq!(record.size, Some(12));
    }
}
