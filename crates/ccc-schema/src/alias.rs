//! Per-domain mapping from input column names to canonical field names.

use std::collections::BTreeMap;

use ccc_model::DomainSchema;

use crate::error::SchemaError;

/// Case-insensitive alias lookup scoped to a single domain.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    by_alias: BTreeMap<String, String>,
}

impl AliasResolver {
    /// Builds the alias map for `domain`.
    ///
    /// Fails when two fields claim the same alias, or when an alias shadows
    /// another field's canonical name.
    pub fn for_domain(domain: &DomainSchema) -> Result<Self, SchemaError> {
        let canonical: BTreeMap<String, &str> = domain
            .field_descriptors
            .keys()
            .map(|name| (name.to_lowercase(), name.as_str()))
            .collect();
        let mut by_alias: BTreeMap<String, String> = BTreeMap::new();
        for (field, descriptor) in &domain.field_descriptors {
            for alias in &descriptor.aliases {
                let key = alias.trim().to_lowercase();
                if key.is_empty() {
                    return Err(SchemaError::invalid(
                        &domain.name,
                        format!("field {field} declares an empty alias"),
                    ));
                }
                let shadowed = canonical.get(&key).filter(|other| **other != field.as_str());
                if let Some(other) = shadowed {
                    return Err(SchemaError::invalid(
                        &domain.name,
                        format!("alias {alias} of field {field} shadows field {other}"),
                    ));
                }
                match by_alias.get(&key) {
                    Some(existing) if existing != field => {
                        return Err(SchemaError::invalid(
                            &domain.name,
                            format!("alias {alias} is claimed by both {existing} and {field}"),
                        ));
                    }
                    _ => {
                        by_alias.insert(key, field.clone());
                    }
                }
            }
        }
        Ok(Self { by_alias })
    }

    /// Returns the canonical name for `raw`, or `raw` itself when no alias
    /// matches.
    pub fn canonicalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.by_alias
            .get(&raw.to_lowercase())
            .map(String::as_str)
            .unwrap_or(raw)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ccc_model::{CollectionSpec, FieldDescriptor};

    use super::*;

    fn resource(fields: Vec<(&str, FieldDescriptor)>) -> DomainSchema {
        DomainSchema {
            name: "resource".to_string(),
            key_field: "ccc_id".to_string(),
            collection: CollectionSpec {
                doc_type: "resource".to_string(),
                index_prefix: "resource".to_string(),
            },
            import_order: 1,
            use_raw_key_as_storage_key: true,
            field_descriptors: fields
                .into_iter()
                .map(|(name, fd)| (name.to_string(), fd))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn resolves_aliases_case_insensitively() {
        let domain = resource(vec![
            ("ccc_id", FieldDescriptor::with_aliases(["cccdid", "CCC_DID"])),
            ("extension", FieldDescriptor::default()),
        ]);
        let resolver = AliasResolver::for_domain(&domain).unwrap();
        assert_eq!(resolver.canonicalize("CCCDID"), "ccc_id");
        assert_eq!(resolver.canonicalize("ccc_did"), "ccc_id");
        assert_eq!(resolver.canonicalize("ccc_id"), "ccc_id");
        assert_eq!(resolver.canonicalize("Unknown Column"), "Unknown Column");
    }

    #[test]
    fn rejects_alias_claimed_twice() {
        let domain = resource(vec![
            ("ccc_id", FieldDescriptor::with_aliases(["id"])),
            ("filepath", FieldDescriptor::with_aliases(["ID"])),
        ]);
        let err = AliasResolver::for_domain(&domain).unwrap_err();
        assert!(err.to_string().contains("claimed by both"), "{err}");
    }

    #[test]
    fn rejects_alias_shadowing_other_field() {
        let domain = resource(vec![
            ("ccc_id", FieldDescriptor::with_aliases(["filepath"])),
            ("filepath", FieldDescriptor::default()),
        ]);
        assert!(AliasResolver::for_domain(&domain).is_err());
    }
}
