//! Turns raw rows into storage-ready records.

use std::collections::BTreeMap;

use tracing::debug;

use ccc_client::{DocumentStore, IdentityService};
use ccc_model::{
    Collection, DomainSchema, NormalizedRecord, PROJECT_CODE_FIELD, SITE_ID_FIELD, StorageKey,
    TYPE_FIELD, Value,
};
use ccc_schema::{AliasResolver, SchemaRegistry};

use crate::coerce::apply_descriptor;
use crate::context::NormalizeContext;
use crate::denormalize::Denormalizer;
use crate::error::Result;
use crate::identity::IdentityResolver;

/// Normalizer bound to one domain and import context.
///
/// Each row goes through four passes in order: column canonicalization and
/// coercion, identity resolution (file-like domains only), denormalization
/// from upstream domains, and bookkeeping. Bookkeeping runs last so the
/// provenance fields always reflect the context.
pub struct RowNormalizer<'a> {
    registry: &'a SchemaRegistry,
    domain: &'a DomainSchema,
    resolver: &'a AliasResolver,
    context: NormalizeContext,
    identity: &'a dyn IdentityService,
    store: &'a dyn DocumentStore,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        domain_name: &str,
        context: NormalizeContext,
        identity: &'a dyn IdentityService,
        store: &'a dyn DocumentStore,
    ) -> Result<Self> {
        Ok(Self {
            registry,
            domain: registry.get(domain_name)?,
            resolver: registry.resolver(domain_name)?,
            context,
            identity,
            store,
        })
    }

    pub fn domain(&self) -> &'a DomainSchema {
        self.domain
    }

    pub fn context(&self) -> &NormalizeContext {
        &self.context
    }

    pub fn store(&self) -> &'a dyn DocumentStore {
        self.store
    }

    /// Collection the domain's records are written to.
    pub fn collection(&self) -> Collection {
        Collection::for_domain(self.domain, &self.context.project_code)
    }

    /// Storage key of a normalized record.
    pub fn storage_key(&self, record: &NormalizedRecord) -> Result<StorageKey> {
        Ok(StorageKey::for_record(
            record,
            self.domain,
            &self.context.project_code,
        )?)
    }

    /// Normalizes a row of text cells.
    pub fn normalize_strings(&self, raw: BTreeMap<String, String>) -> Result<NormalizedRecord> {
        self.normalize(
            raw.into_iter()
                .map(|(name, cell)| (name, Value::String(cell)))
                .collect(),
        )
    }

    pub fn normalize(&self, raw: BTreeMap<String, Value>) -> Result<NormalizedRecord> {
        let mut record = self.canonicalize(raw)?;
        if self.domain.is_file_like() {
            IdentityResolver::new(self.identity, &self.context)
                .resolve(&mut record, self.domain)?;
        }
        let hits = Denormalizer::new(self.registry, self.store, &self.context.project_code)
            .enrich(&mut record, self.domain)?;
        self.stamp(&mut record);
        debug!(
            domain = %self.domain.name,
            fields = record.len(),
            upstream_hits = hits,
            "normalized row"
        );
        Ok(record)
    }

    /// Resolves aliases and applies field descriptors.
    ///
    /// Values are kept under both the raw and the canonical column name. A
    /// canonical column present in the row wins over any alias of it.
    fn canonicalize(&self, raw: BTreeMap<String, Value>) -> Result<NormalizedRecord> {
        let mut record = NormalizedRecord::new();
        let mut canonical_fields = Vec::new();
        for (name, value) in &raw {
            let canonical = self.resolver.canonicalize(name);
            let value = match self.domain.descriptor(canonical) {
                Some(descriptor) => apply_descriptor(canonical, value.clone(), descriptor)?,
                None => value.clone(),
            };
            if canonical != name.as_str() && !raw.contains_key(canonical) {
                canonical_fields.push((canonical.to_string(), value.clone()));
            }
            record.insert(name.clone(), value);
        }
        for (canonical, value) in canonical_fields {
            record.insert(canonical, value);
        }
        // Declared defaults also cover columns the row never had.
        for (field, descriptor) in &self.domain.field_descriptors {
            if let Some(default) = &descriptor.missing_value
                && !record.contains(field)
            {
                record.insert(field.clone(), default.clone());
            }
        }
        Ok(record)
    }

    fn stamp(&self, record: &mut NormalizedRecord) {
        record.insert(SITE_ID_FIELD, Value::from(self.context.site_id.as_str()));
        record.insert(PROJECT_CODE_FIELD, Value::from(self.context.project_code.as_str()));
        record.insert(TYPE_FIELD, Value::from(self.domain.name.as_str()));
    }
}
