//! Tests for ccc-model types.

use std::collections::BTreeMap;

use ccc_model::{
    Collection, CollectionSpec, DataType, DomainSchema, FieldDescriptor, ModelError,
    NormalizedRecord, StorageKey, Value,
};
use proptest::prelude::*;

fn domain(name: &str, key_field: &str, raw_key: bool) -> DomainSchema {
    let mut field_descriptors = BTreeMap::new();
    field_descriptors.insert(key_field.to_string(), FieldDescriptor::default());
    DomainSchema {
        name: name.to_string(),
        key_field: key_field.to_string(),
        collection: CollectionSpec {
            doc_type: name.to_string(),
            index_prefix: format!("aggregated-{name}"),
        },
        import_order: 0,
        use_raw_key_as_storage_key: raw_key,
        field_descriptors,
    }
}

fn record(pairs: &[(&str, Value)]) -> NormalizedRecord {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

#[test]
fn synthesized_key_is_lowercased() {
    let sample = domain("sample", "sample_id", false);
    let row = record(&[("sample_id", Value::from("saMple1"))]);
    let key = StorageKey::for_record(&row, &sample, "testProject").expect("key");
    assert_eq!(key.as_str(), "testproject-sample-sample1");
}

#[test]
fn raw_key_uses_value_verbatim() {
    let resource = domain("resource", "ccc_id", true);
    let row = record(&[("ccc_id", Value::from("UUID-1"))]);
    let key = StorageKey::for_record(&row, &resource, "proj").expect("key");
    assert_eq!(key.as_str(), "uuid-1");
}

#[test]
fn numeric_key_values_render_as_text() {
    let patient = domain("patient", "patient_id", false);
    let row = record(&[("patient_id", Value::Int(17))]);
    let key = StorageKey::for_record(&row, &patient, "P").expect("key");
    assert_eq!(key.as_str(), "p-patient-17");
}

#[test]
fn missing_key_field_is_reported() {
    let sample = domain("sample", "sample_id", false);
    let err = StorageKey::for_record(&NormalizedRecord::new(), &sample, "proj").unwrap_err();
    let ModelError::MissingKeyField { domain, field } = err;
    assert_eq!(domain, "sample");
    assert_eq!(field, "sample_id");
}

#[test]
fn empty_key_value_counts_as_missing() {
    let sample = domain("sample", "sample_id", false);
    let row = record(&[("sample_id", Value::from(""))]);
    assert!(matches!(
        StorageKey::for_record(&row, &sample, "proj"),
        Err(ModelError::MissingKeyField { .. })
    ));
}

#[test]
fn collection_index_is_project_scoped() {
    let resource = domain("resource", "ccc_id", true);
    let collection = Collection::for_domain(&resource, "testProject");
    assert_eq!(collection.index, "testproject-aggregated-resource");
    assert_eq!(collection.doc_type, "resource");
}

#[test]
fn field_descriptor_accepts_both_dict_key_spellings() {
    let modern: FieldDescriptor =
        serde_json::from_str(r#"{"dataType": "dict", "dictKey": "code"}"#).expect("parse");
    let legacy: FieldDescriptor =
        serde_json::from_str(r#"{"dataType": "dict", "dict_key": "code"}"#).expect("parse");
    assert_eq!(modern.data_type, DataType::Dict);
    assert_eq!(modern.dict_key.as_deref(), Some("code"));
    assert_eq!(modern, legacy);
}

#[test]
fn record_serializes_as_sorted_flat_object() {
    let row = record(&[
        ("type", Value::from("sample")),
        ("age", Value::Int(3)),
        ("projects", Value::wrap("code", Value::from("P1"))),
    ]);
    let json = serde_json::to_string(&row).expect("serialize");
    assert_eq!(
        json,
        r#"{"age":3,"projects":{"code":"P1"},"type":"sample"}"#
    );
}

proptest! {
    #[test]
    fn storage_key_is_deterministic(project in "[A-Za-z]{1,8}", value in "[A-Za-z0-9_]{1,12}") {
        let sample = domain("sample", "sample_id", false);
        let row = record(&[("sample_id", Value::from(value.as_str()))]);
        let first = StorageKey::for_record(&row, &sample, &project).unwrap();
        let second = StorageKey::for_record(&row.clone(), &sample, &project).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.as_str(), format!("{project}-sample-{value}").to_lowercase());
    }
}
