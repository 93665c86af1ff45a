use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;
use crate::record::CONTENT_ID_FIELD;

/// Declared type of a field; drives value coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Float,
    #[default]
    String,
    Dict,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Dict => "dict",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema entry for one canonical field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Alternate column names, matched case-insensitively.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub data_type: DataType,
    /// Key used to wrap `dict` values as `{dict_key: value}`.
    #[serde(default, alias = "dict_key")]
    pub dict_key: Option<String>,
    /// Substituted when the raw value is empty or absent.
    #[serde(default)]
    pub missing_value: Option<Value>,
}

impl FieldDescriptor {
    pub fn with_aliases<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_dict_key(mut self, key: impl Into<String>) -> Self {
        self.data_type = DataType::Dict;
        self.dict_key = Some(key.into());
        self
    }

    pub fn with_missing_value(mut self, value: Value) -> Self {
        self.missing_value = Some(value);
        self
    }
}

/// Storage location of a domain: the search index prefix and document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub doc_type: String,
    pub index_prefix: String,
}

/// One logical record type (patient, sample, resource, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSchema {
    pub name: String,
    /// Canonical field whose value derives the storage key.
    pub key_field: String,
    pub collection: CollectionSpec,
    /// Lower values are upstream of higher ones for denormalization.
    pub import_order: i64,
    /// Use the lower-cased key value verbatim as the storage key.
    pub use_raw_key_as_storage_key: bool,
    pub field_descriptors: BTreeMap<String, FieldDescriptor>,
}

impl DomainSchema {
    pub fn descriptor(&self, canonical: &str) -> Option<&FieldDescriptor> {
        self.field_descriptors.get(canonical)
    }

    /// File-like domains are keyed by the content identifier and go through
    /// identity registration or validation.
    pub fn is_file_like(&self) -> bool {
        self.key_field == CONTENT_ID_FIELD
    }

    /// Returns true when `other` is strictly upstream of this domain.
    pub fn is_downstream_of(&self, other: &DomainSchema) -> bool {
        other.import_order < self.import_order
    }
}
