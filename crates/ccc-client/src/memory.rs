//! In-process service doubles.
//!
//! Both types use interior mutability so they satisfy the `&self` service
//! traits; they are meant for single-threaded imports and tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use serde_json::json;

use ccc_model::{Collection, NormalizedRecord, StorageKey};

use crate::error::{ClientError, Result};
use crate::identity::{IdentityRecord, IdentityService, placeholder_id, site_url};
use crate::store::DocumentStore;

/// Document store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RefCell<BTreeMap<(Collection, StorageKey), NormalizedRecord>>,
    writes: Cell<usize>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document without counting it as a write.
    #[must_use]
    pub fn with_document(
        self,
        collection: Collection,
        key: StorageKey,
        record: NormalizedRecord,
    ) -> Self {
        self.documents.borrow_mut().insert((collection, key), record);
        self
    }

    pub fn document(&self, collection: &Collection, key: &StorageKey) -> Option<NormalizedRecord> {
        self.documents
            .borrow()
            .get(&(collection.clone(), key.clone()))
            .cloned()
    }

    /// Keys stored in `collection`, sorted.
    pub fn keys(&self, collection: &Collection) -> Vec<StorageKey> {
        self.documents
            .borrow()
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.borrow().is_empty()
    }

    /// Number of `put` calls served.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, collection: &Collection, key: &StorageKey) -> Result<Option<NormalizedRecord>> {
        Ok(self.document(collection, key))
    }

    fn put(
        &self,
        collection: &Collection,
        key: &StorageKey,
        record: &NormalizedRecord,
    ) -> Result<serde_json::Value> {
        let previous = self
            .documents
            .borrow_mut()
            .insert((collection.clone(), key.clone()), record.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(json!({
            "_index": collection.index,
            "_type": collection.doc_type,
            "_id": key.as_str(),
            "result": if previous.is_some() { "updated" } else { "created" },
        }))
    }
}

/// Identity service that assigns name-based identifiers to paths.
#[derive(Debug, Default)]
pub struct MemoryIdentityService {
    records: RefCell<BTreeMap<String, IdentityRecord>>,
    registrations: Cell<usize>,
    lookups: Cell<usize>,
}

impl MemoryIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(self, ccc_id: impl Into<String>, record: IdentityRecord) -> Self {
        self.records.borrow_mut().insert(ccc_id.into(), record);
        self
    }

    pub fn record(&self, ccc_id: &str) -> Option<IdentityRecord> {
        self.records.borrow().get(ccc_id).cloned()
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.get()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.get()
    }

    /// Total calls made against the service.
    pub fn call_count(&self) -> usize {
        self.registrations.get() + self.lookups.get()
    }
}

impl IdentityService for MemoryIdentityService {
    fn register(&self, path: &str, site_id: &str, _user: &str) -> Result<String> {
        self.registrations.set(self.registrations.get() + 1);
        site_url(site_id)?;
        let ccc_id = placeholder_id(path);
        let mut records = self.records.borrow_mut();
        if records.contains_key(&ccc_id) {
            return Err(ClientError::AlreadyRegistered(ccc_id));
        }
        records.insert(ccc_id.clone(), IdentityRecord::for_path(path, None));
        Ok(ccc_id)
    }

    fn lookup(&self, ccc_id: &str) -> Result<Option<IdentityRecord>> {
        self.lookups.set(self.lookups.get() + 1);
        Ok(self.record(ccc_id))
    }
}
