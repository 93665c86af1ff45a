//! Tests for the in-memory services, registration payloads and auth tokens.

use std::fs;

use ccc_client::{
    ClientError, DocumentStore, IdentityRecord, IdentityService, MemoryDocumentStore,
    MemoryIdentityService, RegistrationPayload, parse_auth_token, placeholder_id,
};
use ccc_model::{Collection, NormalizedRecord, StorageKey, Value};

fn collection() -> Collection {
    Collection {
        index: "proj-sample".to_string(),
        doc_type: "sample".to_string(),
    }
}

fn key(text: &str) -> StorageKey {
    serde_json::from_value(serde_json::Value::String(text.to_string())).unwrap()
}

#[test]
fn memory_store_writes_are_visible_to_later_reads() {
    let store = MemoryDocumentStore::new();
    assert!(store.get(&collection(), &key("proj-sample-s1")).unwrap().is_none());

    let mut record = NormalizedRecord::new();
    record.insert("sample_id", Value::from("S1"));
    let ack = store.put(&collection(), &key("proj-sample-s1"), &record).unwrap();
    assert_eq!(ack["result"], "created");
    assert_eq!(ack["_id"], "proj-sample-s1");

    let found = store.get(&collection(), &key("proj-sample-s1")).unwrap();
    assert_eq!(found, Some(record.clone()));

    let ack = store.put(&collection(), &key("proj-sample-s1"), &record).unwrap();
    assert_eq!(ack["result"], "updated");
    assert_eq!(store.write_count(), 2);
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_store_scopes_keys_by_collection() {
    let other = Collection {
        index: "proj-patient".to_string(),
        doc_type: "patient".to_string(),
    };
    let store = MemoryDocumentStore::new().with_document(
        other.clone(),
        key("k"),
        NormalizedRecord::new(),
    );
    assert!(store.get(&collection(), &key("k")).unwrap().is_none());
    assert!(store.get(&other, &key("k")).unwrap().is_some());
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.keys(&other), vec![key("k")]);
}

#[test]
fn memory_identity_registers_once_per_path() {
    let service = MemoryIdentityService::new();
    let id = service.register("/data/a.bam", "ohsu", "alice").unwrap();
    assert_eq!(id, placeholder_id("/data/a.bam"));

    let record = service.lookup(&id).unwrap().expect("registered");
    assert_eq!(record, IdentityRecord::for_path("/data/a.bam", None));

    let err = service.register("/data/a.bam", "ohsu", "alice").unwrap_err();
    assert!(matches!(err, ClientError::AlreadyRegistered(ref found) if *found == id));
    assert_eq!(service.registration_count(), 2);
    assert_eq!(service.lookup_count(), 1);
}

#[test]
fn memory_identity_rejects_unknown_sites() {
    let service = MemoryIdentityService::new();
    let err = service.register("/data/a.bam", "mars", "alice").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"unknown site mars; valid sites are: central, ohsu, dfci, oicr"
    );
}

#[test]
fn lookup_miss_is_not_an_error() {
    let service = MemoryIdentityService::new();
    assert!(service.lookup("nope").unwrap().is_none());
}

#[test]
fn registration_payload_describes_the_local_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reads.bam");
    fs::write(&path, b"0123456789").expect("write");

    let payload = RegistrationPayload::for_file(&path, "dfci", "alice").unwrap();
    let absolute = path.to_string_lossy();
    assert_eq!(payload.ccc_id, placeholder_id(&absolute));
    assert_eq!(payload.name, "reads.bam");
    assert_eq!(payload.size, 10);
    assert_eq!(payload.location.len(), 1);
    assert_eq!(payload.location[0].site, "http://10.73.127.18");
    assert_eq!(payload.location[0].path, dir.path().to_string_lossy());
    assert_eq!(payload.location[0].user.name, "alice");

    let json = serde_json::to_value(&payload).unwrap();
    assert!(json.get("cccId").is_some());
    assert!(json["location"][0].get("timestampUpdated").is_some());
}

#[test]
fn registration_payload_needs_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = RegistrationPayload::for_file(&dir.path().join("absent"), "ohsu", "alice")
        .unwrap_err();
    assert!(matches!(err, ClientError::Io { .. }));
}

#[test]
fn auth_token_files_are_joined_line_by_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("token");
    fs::write(&path, "abc  \ndef\n").expect("write");
    let token = parse_auth_token(&path.to_string_lossy()).unwrap();
    assert_eq!(token, "abcdef");
}
