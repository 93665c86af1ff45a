//! Publishing a single resource record.

use std::collections::BTreeMap;

use tracing::info;

use ccc_model::{CONTENT_ID_FIELD, StorageKey, Value};

use crate::error::{ImportError, Result};
use crate::identity::FILEPATH_FIELD;
use crate::importer::{BatchImporter, ImportedRecord};

/// Field recording the workflow that produced a resource.
pub const WORKFLOW_ID_FIELD: &str = "workflowId";
/// Field recording the resource's MIME type.
pub const MIMETYPE_FIELD: &str = "mimetype";

/// A resource described by its path and extra properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRequest {
    pub filepath: String,
    pub workflow_id: Option<String>,
    pub mimetype: Option<String>,
    /// `ccc_id` of a stored resource whose fields are copied first.
    pub inherit_from: Option<String>,
    /// `Field:Value` overrides.
    pub properties: Vec<String>,
}

impl ResourceRequest {
    pub fn new(filepath: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            ..Self::default()
        }
    }
}

/// Splits a `Field:Value` property; whitespace around the colon is dropped.
pub fn parse_property(property: &str) -> Result<(String, String)> {
    let invalid = || ImportError::InvalidProperty(property.to_string());
    let (field, value) = property.split_once(':').ok_or_else(invalid)?;
    if value.contains(':') {
        return Err(invalid());
    }
    let field = field.trim();
    if field.is_empty() {
        return Err(invalid());
    }
    Ok((field.to_string(), value.trim().to_string()))
}

/// Builds a resource row and imports it through `importer`.
///
/// Inherited fields come first, then the properties, then the request's own
/// path, workflow and MIME type. The inherited record's `ccc_id` is not
/// carried over, so the new file is validated or registered on its own.
pub fn publish_resource(
    importer: &BatchImporter<'_>,
    request: &ResourceRequest,
) -> Result<ImportedRecord> {
    let normalizer = importer.normalizer();
    let mut row: BTreeMap<String, Value> = BTreeMap::new();

    if let Some(ccc_id) = &request.inherit_from {
        let key =
            StorageKey::from_parts(&normalizer.context().project_code, normalizer.domain(), ccc_id);
        let inherited = normalizer
            .store()
            .get(&normalizer.collection(), &key)?
            .ok_or_else(|| ImportError::InheritedResourceNotFound {
                ccc_id: ccc_id.clone(),
            })?;
        row.extend(inherited);
        row.remove(CONTENT_ID_FIELD);
    }

    for property in &request.properties {
        let (field, value) = parse_property(property)?;
        row.insert(field, Value::String(value));
    }

    row.insert(FILEPATH_FIELD.to_string(), Value::from(request.filepath.as_str()));
    if let Some(workflow_id) = &request.workflow_id {
        row.insert(WORKFLOW_ID_FIELD.to_string(), Value::from(workflow_id.as_str()));
    }
    if let Some(mimetype) = &request.mimetype {
        row.insert(MIMETYPE_FIELD.to_string(), Value::from(mimetype.as_str()));
    }

    let imported = importer.import_record(row)?;
    info!(key = %imported.key, filepath = %request.filepath, "published resource");
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_split_on_a_single_colon() {
        assert_eq!(
            parse_property("extension : bam").unwrap(),
            ("extension".to_string(), "bam".to_string())
        );
        assert_eq!(
            parse_property("note:").unwrap(),
            ("note".to_string(), String::new())
        );
    }

    #[test]
    fn malformed_properties_are_rejected() {
        for bad in ["extension", "a:b:c", ":bam"] {
            assert!(matches!(
                parse_property(bad),
                Err(ImportError::InvalidProperty(_))
            ));
        }
    }
}
