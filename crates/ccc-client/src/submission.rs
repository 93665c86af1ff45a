//! Eve/Mongo submission API document store.

use reqwest::{StatusCode, Url};
use reqwest::blocking::Client;
use tracing::debug;

use ccc_model::{Collection, NormalizedRecord, StorageKey};

use crate::config::SubmissionConfig;
use crate::error::Result;
use crate::http;
use crate::store::DocumentStore;

/// Posts documents to `/v0/submission/{program}/{project}` and reads them
/// back from `/v0/{doc_type}s/{key}`.
///
/// The submission endpoint is addressed by project, so the project code is
/// fixed when the store is built.
pub struct EveMongoStore {
    client: Client,
    config: SubmissionConfig,
    project: String,
}

impl EveMongoStore {
    pub fn new(config: SubmissionConfig, project: impl Into<String>) -> Result<Self> {
        let client = http::build_client(&config.auth_token, config.timeout)?;
        Ok(Self {
            client,
            config,
            project: project.into(),
        })
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }
}

pub fn submission_url(config: &SubmissionConfig, project: &str) -> Result<Url> {
    http::join_segments(
        &config.base_url(),
        &["v0", "submission", &config.program, project],
    )
}

pub fn item_url(
    config: &SubmissionConfig,
    collection: &Collection,
    key: &StorageKey,
) -> Result<Url> {
    let resource = format!("{}s", collection.doc_type);
    http::join_segments(&config.base_url(), &["v0", &resource, key.as_str()])
}

impl DocumentStore for EveMongoStore {
    fn get(&self, collection: &Collection, key: &StorageKey) -> Result<Option<NormalizedRecord>> {
        let url = item_url(&self.config, collection, key)?;
        let response = self.client.get(url.clone()).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http::status_error("GET", url.as_str(), response));
        }
        let mut record: NormalizedRecord = serde_json::from_str(&response.text()?)?;
        // Eve decorates items with its own metadata.
        for meta in ["_id", "_etag", "_links", "_created", "_updated"] {
            record.remove(meta);
        }
        Ok(Some(record))
    }

    fn put(
        &self,
        collection: &Collection,
        key: &StorageKey,
        record: &NormalizedRecord,
    ) -> Result<serde_json::Value> {
        let url = submission_url(&self.config, &self.project)?;
        debug!(%collection, %key, %url, "submitting document");
        let request = self.client.post(url.clone()).json(record);
        let response = http::send("POST", url.as_str(), request)?;
        let body = response.text()?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_submission_layout() {
        let config = SubmissionConfig::default()
            .with_host("http://eve.local")
            .with_port(5000)
            .with_program("ccc");
        assert_eq!(
            submission_url(&config, "BRCA").unwrap().as_str(),
            "http://eve.local:5000/v0/submission/ccc/BRCA"
        );
        let collection = Collection {
            index: "brca-sample".to_string(),
            doc_type: "sample".to_string(),
        };
        let key: StorageKey = serde_json::from_str("\"brca-sample-s1\"").unwrap();
        assert_eq!(
            item_url(&config, &collection, &key).unwrap().as_str(),
            "http://eve.local:5000/v0/samples/brca-sample-s1"
        );
        let key: StorageKey = serde_json::from_str("\"brca-sample-s1#x\"").unwrap();
        let url = item_url(&config, &collection, &key).unwrap();
        assert_eq!(url.path(), "/v0/samples/brca-sample-s1%23x");
        assert!(url.fragment().is_none());
    }
}
