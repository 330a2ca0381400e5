use std::sync::Arc;

use super::*;
use crate::state::storage::MemoryStorage;

fn alice() -> Identity {
    Identity { id: Some(7), username: "alice".into(), showname: "Alice A".into(), userrole: "admin".into() }
}

fn signed_in() -> Session {
    Session { access_token: "t1".into(), refresh_token: Some("r1".into()), user: Some(alice()) }
}

#[test]
fn default_session_is_signed_out() {
    let store = SessionStore::new(MemoryStorage::new());
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);
}

#[test]
fn every_mutation_is_persisted() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());

    store.install(signed_in());
    store.set_access_token("t2".into());
    store.reset();

    assert_eq!(storage.writes(), 3);
    let stored: Session = serde_json::from_str(&storage.raw().unwrap()).unwrap();
    assert_eq!(stored, Session::default());
}

#[test]
fn persisted_format_uses_camel_case_keys() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.install(signed_in());

    let raw: serde_json::Value = serde_json::from_str(&storage.raw().unwrap()).unwrap();
    assert_eq!(raw["accessToken"], "t1");
    assert_eq!(raw["refreshToken"], "r1");
    assert_eq!(raw["user"]["userrole"], "admin");
}

#[test]
fn set_access_token_keeps_refresh_token_and_user() {
    let store = SessionStore::new(MemoryStorage::new());
    store.install(signed_in());
    store.set_access_token("t2".into());

    let s = store.snapshot();
    assert_eq!(s.access_token, "t2");
    assert_eq!(s.refresh_token.as_deref(), Some("r1"));
    assert_eq!(s.user, Some(alice()));
}

#[test]
fn round_trip_through_storage() {
    let storage = Arc::new(MemoryStorage::new());
    SessionStore::new(storage.clone()).install(signed_in());

    let restored = SessionStore::new(storage.clone());
    assert!(restored.init());
    assert_eq!(restored.snapshot(), signed_in());
}

#[test]
fn init_is_idempotent() {
    let storage = Arc::new(MemoryStorage::with_value(serde_json::to_string(&signed_in()).unwrap()));
    let store = SessionStore::new(storage.clone());

    assert!(store.init());
    let first = serde_json::to_vec(&store.snapshot()).unwrap();
    assert!(!store.init());
    let second = serde_json::to_vec(&store.snapshot()).unwrap();

    assert_eq!(first, second);
    assert_eq!(storage.writes(), 0);
}

#[test]
fn init_does_not_overwrite_newer_state() {
    let stale = Session { access_token: "stale".into(), refresh_token: None, user: Some(alice()) };
    let storage = Arc::new(MemoryStorage::with_value(serde_json::to_string(&stale).unwrap()));
    let store = SessionStore::new(storage);

    store.install(Session { access_token: "fresh".into(), ..signed_in() });
    assert!(!store.init());
    assert_eq!(store.snapshot().access_token, "fresh");
}

#[test]
fn init_tolerates_corrupt_slot() {
    let store = SessionStore::new(MemoryStorage::with_value("{broken"));
    assert!(!store.init());
    assert_eq!(store.snapshot(), Session::default());
}

#[test]
fn init_accepts_partial_documents() {
    let store = SessionStore::new(MemoryStorage::with_value(r#"{"accessToken":"t"}"#));
    assert!(store.init());
    assert_eq!(store.access_token().as_deref(), Some("t"));
    assert!(!store.is_authenticated());
}

#[test]
fn empty_refresh_token_reads_as_none() {
    let store = SessionStore::new(MemoryStorage::new());
    store.install(Session { refresh_token: Some(String::new()), ..signed_in() });
    assert_eq!(store.refresh_token(), None);
}
