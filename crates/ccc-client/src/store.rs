use ccc_model::{Collection, NormalizedRecord, StorageKey};

use crate::error::Result;

/// Key-addressed document storage.
///
/// Writes must be visible to the next `get` on the same store; imports rely
/// on a row observing documents written by earlier rows.
pub trait DocumentStore {
    /// Point lookup. A missing document is `Ok(None)`.
    fn get(&self, collection: &Collection, key: &StorageKey) -> Result<Option<NormalizedRecord>>;

    /// Indexes `record` under `key`, returning the backend's acknowledgement.
    fn put(
        &self,
        collection: &Collection,
        key: &StorageKey,
        record: &NormalizedRecord,
    ) -> Result<serde_json::Value>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn get(&self, collection: &Collection, key: &StorageKey) -> Result<Option<NormalizedRecord>> {
        (**self).get(collection, key)
    }

    fn put(
        &self,
        collection: &Collection,
        key: &StorageKey,
        record: &NormalizedRecord,
    ) -> Result<serde_json::Value> {
        (**self).put(collection, key, record)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    fn get(&self, collection: &Collection, key: &StorageKey) -> Result<Option<NormalizedRecord>> {
        (**self).get(collection, key)
    }

    fn put(
        &self,
        collection: &Collection,
        key: &StorageKey,
        record: &NormalizedRecord,
    ) -> Result<serde_json::Value> {
        (**self).put(collection, key, record)
    }
}
