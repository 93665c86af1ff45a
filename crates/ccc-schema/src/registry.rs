#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

use ccc_model::{CollectionSpec, DataType, DomainSchema, FieldDescriptor};

use crate::alias::AliasResolver;
use crate::error::SchemaError;

/// Environment variable naming an alternate schema document.
pub const DOMAINS_FILE_ENV_VAR: &str = "CCC_DOMAINS_FILE";

const BUNDLED_DOMAINS: &str = include_str!("../resources/domains.json");

/// Path of the schema document used when none is given explicitly.
///
/// Returns `None` when the bundled document should be used.
pub fn default_domains_path() -> Option<PathBuf> {
    std::env::var_os(DOMAINS_FILE_ENV_VAR).map(PathBuf::from)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainDocument {
    key_field: String,
    #[serde(default)]
    doc_type: Option<String>,
    #[serde(default)]
    index_prefix: Option<String>,
    idx: i64,
    #[serde(default, deserialize_with = "presence_flag")]
    use_key_field_as_index_key: bool,
    #[serde(default)]
    field_descriptors: BTreeMap<String, FieldDescriptor>,
}

/// A flag set by the key's presence; only a literal `false` clears it.
fn presence_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(!matches!(value, serde_json::Value::Bool(false)))
}

/// Read-only set of domain schemas with their alias resolvers.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    domains: BTreeMap<String, DomainSchema>,
    resolvers: BTreeMap<String, AliasResolver>,
}

impl SchemaRegistry {
    /// Loads the schema named by `CCC_DOMAINS_FILE`, or the bundled one.
    pub fn load_default() -> Result<Self, SchemaError> {
        match default_domains_path() {
            Some(path) => Self::load(&path),
            None => Self::bundled(),
        }
    }

    /// The schema shipped with the client.
    pub fn bundled() -> Result<Self, SchemaError> {
        Self::from_json_str(BUNDLED_DOMAINS, "<bundled domains.json>")
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        Self::from_json_str(&text, &path.display().to_string())
    }

    /// Parses and validates a schema document; `origin` names it in errors.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, SchemaError> {
        let documents: BTreeMap<String, DomainDocument> =
            serde_json::from_str(text).map_err(|source| SchemaError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        let mut domains = BTreeMap::new();
        let mut resolvers = BTreeMap::new();
        for (name, document) in documents {
            let domain = build_domain(name, document)?;
            resolvers.insert(domain.name.clone(), AliasResolver::for_domain(&domain)?);
            domains.insert(domain.name.clone(), domain);
        }
        debug!(origin, domain_count = domains.len(), "loaded domain schema");
        Ok(Self { domains, resolvers })
    }

    pub fn get(&self, name: &str) -> Result<&DomainSchema, SchemaError> {
        self.domains
            .get(name)
            .ok_or_else(|| SchemaError::UnknownDomain(name.to_string()))
    }

    pub fn resolver(&self, name: &str) -> Result<&AliasResolver, SchemaError> {
        self.resolvers
            .get(name)
            .ok_or_else(|| SchemaError::UnknownDomain(name.to_string()))
    }

    /// Canonical name of `raw` within `domain`. Unknown domains and unknown
    /// columns both yield `raw` unchanged.
    pub fn canonicalize<'a>(&'a self, domain: &str, raw: &'a str) -> &'a str {
        match self.resolvers.get(domain) {
            Some(resolver) => resolver.canonicalize(raw),
            None => raw,
        }
    }

    /// All domains ordered by import order, then name.
    pub fn domains(&self) -> Vec<&DomainSchema> {
        let mut ordered: Vec<&DomainSchema> = self.domains.values().collect();
        ordered.sort_by(|a, b| {
            a.import_order
                .cmp(&b.import_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        ordered
    }

    /// Domains strictly upstream of `domain`, nearest first.
    pub fn upstream_of(&self, domain: &DomainSchema) -> Vec<&DomainSchema> {
        let mut upstream: Vec<&DomainSchema> = self
            .domains
            .values()
            .filter(|other| domain.is_downstream_of(other))
            .collect();
        upstream.sort_by(|a, b| {
            b.import_order
                .cmp(&a.import_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        upstream
    }

    pub fn contains(&self, name: &str) -> bool {
        self.domains.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

fn build_domain(name: String, document: DomainDocument) -> Result<DomainSchema, SchemaError> {
    if !document.field_descriptors.contains_key(&document.key_field) {
        return Err(SchemaError::invalid(
            &name,
            format!(
                "key field {} is not among the declared fields",
                document.key_field
            ),
        ));
    }
    for (field, descriptor) in &document.field_descriptors {
        if descriptor.data_type == DataType::Dict && descriptor.dict_key.is_none() {
            return Err(SchemaError::invalid(
                &name,
                format!("field {field} has dataType dict but no dictKey"),
            ));
        }
    }
    let doc_type = document.doc_type.unwrap_or_else(|| name.clone());
    let index_prefix = document.index_prefix.unwrap_or_else(|| name.clone());
    Ok(DomainSchema {
        key_field: document.key_field,
        collection: CollectionSpec {
            doc_type,
            index_prefix,
        },
        import_order: document.idx,
        use_raw_key_as_storage_key: document.use_key_field_as_index_key,
        field_descriptors: document.field_descriptors,
        name,
    })
}
