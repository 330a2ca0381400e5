use serde_json::json;

use super::*;
use crate::state::session::Session;
use crate::state::storage::MemoryStorage;
use crate::test_helpers::{MockTransport, json_response, stale_session};

#[test]
fn new_restores_persisted_session() {
    let storage = MemoryStorage::with_value(serde_json::to_string(&stale_session()).unwrap());
    let app = App::new(MockTransport::new(|_, _| json_response(200, &json!({}))), storage);

    assert!(app.auth.is_authenticated());
    assert_eq!(app.http.session().snapshot(), stale_session());
}

#[test]
fn new_without_storage_starts_signed_out() {
    let app = App::new(MockTransport::new(|_, _| json_response(200, &json!({}))), MemoryStorage::new());
    assert_eq!(app.http.session().snapshot(), Session::default());
}

#[tokio::test]
async fn users_store_shares_session_token() {
    let storage = MemoryStorage::with_value(serde_json::to_string(&stale_session()).unwrap());
    let app = App::new(MockTransport::new(|_, _| json_response(200, &json!([]))), storage);

    let mut users = app.users();
    users.search_by_last_name("Lee").await;

    assert_eq!(app.http.transport().sent()[0].bearer.as_deref(), Some("stale"));
}

#[test]
fn from_config_builds_reqwest_app() {
    let dir = std::env::temp_dir().join(format!("erpdesk-{}", uuid::Uuid::new_v4()));
    let config = ClientConfig::new(
        "http://127.0.0.1:9",
        dir.join("session.json").to_str().unwrap(),
        crate::config::Timeouts::default(),
    )
    .unwrap();

    let app = App::from_config(&config).unwrap();

    assert_eq!(app.http.transport().base_url(), "http://127.0.0.1:9");
    assert!(!app.auth.is_authenticated());
}
