use std::fmt;

use crate::{DomainSchema, ModelError, NormalizedRecord};

/// Deterministic address of a record within its domain's collection.
///
/// Either `lower("{project}-{domain}-{key value}")`, or the lower-cased key
/// value alone for domains that use the raw key.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn for_record(
        record: &NormalizedRecord,
        domain: &DomainSchema,
        project_code: &str,
    ) -> Result<Self, ModelError> {
        let value = record
            .get(&domain.key_field)
            .filter(|value| !value.is_missing())
            .ok_or_else(|| ModelError::MissingKeyField {
                domain: domain.name.clone(),
                field: domain.key_field.clone(),
            })?;
        Ok(Self::from_parts(project_code, domain, &value.to_string()))
    }

    pub fn from_parts(project_code: &str, domain: &DomainSchema, key_value: &str) -> Self {
        if domain.use_raw_key_as_storage_key {
            Self(key_value.to_lowercase())
        } else {
            Self(format!("{project_code}-{}-{key_value}", domain.name).to_lowercase())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Concrete collection for one project: the search index and document type.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Collection {
    pub index: String,
    pub doc_type: String,
}

impl Collection {
    pub fn for_domain(domain: &DomainSchema, project_code: &str) -> Self {
        Self {
            index: format!("{project_code}-{}", domain.collection.index_prefix).to_lowercase(),
            doc_type: domain.collection.doc_type.clone(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.doc_type)
    }
}
