//! Copies fields of upstream domains into a record.

use std::collections::BTreeSet;

use tracing::debug;

use ccc_client::DocumentStore;
use ccc_model::{Collection, DomainSchema, NormalizedRecord, StorageKey};
use ccc_schema::SchemaRegistry;

use crate::error::Result;

/// Enriches records with documents previously stored for upstream domains.
pub struct Denormalizer<'a> {
    registry: &'a SchemaRegistry,
    store: &'a dyn DocumentStore,
    project_code: &'a str,
}

impl<'a> Denormalizer<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        store: &'a dyn DocumentStore,
        project_code: &'a str,
    ) -> Self {
        Self {
            registry,
            store,
            project_code,
        }
    }

    /// Merges every upstream document found for `record` into it and returns
    /// the number of upstream hits.
    ///
    /// Upstream domains are visited nearest first. A found document overwrites
    /// the row's own values, but never a field already taken from a nearer
    /// domain. Keys borrowed from a nearer domain take part in the lookups of
    /// farther ones. Misses are ignored.
    pub fn enrich(&self, record: &mut NormalizedRecord, domain: &DomainSchema) -> Result<usize> {
        let mut borrowed = BTreeSet::new();
        let mut hits = 0;
        for upstream in self.registry.upstream_of(domain) {
            let Some(key_value) = record
                .get(&upstream.key_field)
                .filter(|value| !value.is_missing())
            else {
                continue;
            };
            let key =
                StorageKey::from_parts(self.project_code, upstream, &key_value.to_string());
            let collection = Collection::for_domain(upstream, self.project_code);
            let Some(document) = self.store.get(&collection, &key)? else {
                debug!(domain = %upstream.name, %key, "no upstream document");
                continue;
            };
            hits += 1;
            debug!(
                domain = %upstream.name,
                %key,
                fields = document.len(),
                "merging upstream document"
            );
            for (field, value) in document {
                if borrowed.contains(&field) {
                    continue;
                }
                record.insert(field.clone(), value);
                borrowed.insert(field);
            }
        }
        Ok(hits)
    }
}
