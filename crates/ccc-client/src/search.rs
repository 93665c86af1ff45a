//! Elasticsearch document store.

use reqwest::{StatusCode, Url};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use ccc_model::{Collection, NormalizedRecord, StorageKey};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::http;
use crate::store::DocumentStore;

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Option<NormalizedRecord>,
}

/// Stores documents at `/{index}/{doc_type}/{key}`.
pub struct ElasticsearchStore {
    client: Client,
    config: SearchConfig,
}

impl ElasticsearchStore {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = http::build_client(&config.auth_token, config.timeout)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// URL of one document. Index, type and key are separate path segments.
pub fn document_url(
    config: &SearchConfig,
    collection: &Collection,
    key: &StorageKey,
) -> Result<Url> {
    http::join_segments(
        &config.base_url(),
        &[&collection.index, &collection.doc_type, key.as_str()],
    )
}

impl DocumentStore for ElasticsearchStore {
    fn get(&self, collection: &Collection, key: &StorageKey) -> Result<Option<NormalizedRecord>> {
        let url = document_url(&self.config, collection, key)?;
        let response = self.client.get(url.clone()).send()?;
        // A missing index answers 404 as well; both are plain misses.
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%collection, %key, "document not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http::status_error("GET", url.as_str(), response));
        }
        let body: GetResponse = serde_json::from_str(&response.text()?)?;
        Ok(body.source.filter(|_| body.found))
    }

    fn put(
        &self,
        collection: &Collection,
        key: &StorageKey,
        record: &NormalizedRecord,
    ) -> Result<serde_json::Value> {
        let url = document_url(&self.config, collection, key)?;
        debug!(%collection, %key, "indexing document");
        let request = self.client.put(url.clone()).json(record);
        let response = http::send("PUT", url.as_str(), request)?;
        Ok(serde_json::from_str(&response.text()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_url_joins_index_type_and_key() {
        let collection = Collection {
            index: "proj-sample".to_string(),
            doc_type: "sample".to_string(),
        };
        let key: StorageKey = serde_json::from_str("\"proj-sample-s1\"").unwrap();
        assert_eq!(
            document_url(&SearchConfig::default(), &collection, &key)
                .unwrap()
                .as_str(),
            "http://localhost:9200/proj-sample/sample/proj-sample-s1"
        );
    }

    #[test]
    fn keys_with_url_syntax_stay_distinct() {
        let collection = Collection {
            index: "proj-sample".to_string(),
            doc_type: "sample".to_string(),
        };
        let config = SearchConfig::default();
        let paths: Vec<String> = ["s1", "s1#x", "s1?y", "a/b", "s 1"]
            .iter()
            .map(|value| {
                let key: StorageKey =
                    serde_json::from_value(serde_json::json!(format!("proj-sample-{value}")))
                        .unwrap();
                let url = document_url(&config, &collection, &key).unwrap();
                assert!(url.query().is_none() && url.fragment().is_none(), "{url}");
                assert_eq!(url.path_segments().unwrap().count(), 3, "{url}");
                url.path().to_string()
            })
            .collect();
        let mut distinct = paths.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), paths.len());
        assert_eq!(paths[1], "/proj-sample/sample/proj-sample-s1%23x");
        assert_eq!(paths[3], "/proj-sample/sample/proj-sample-a%2Fb");
    }

    #[test]
    fn unfound_documents_carry_no_source() {
        let body: GetResponse = serde_json::from_str(r#"{"_id": "x", "found": false}"#).unwrap();
        assert!(body.source.filter(|_| body.found).is_none());
        let body: GetResponse =
            serde_json::from_str(r#"{"found": true, "_source": {"gender": "F"}}"#).unwrap();
        assert_eq!(body.source.unwrap().text("gender"), Some("F"));
    }
}
