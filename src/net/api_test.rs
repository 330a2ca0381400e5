use serde_json::json;

use super::*;
use crate::net::transport::Method;
use crate::state::session::Session;
use crate::test_helpers::{MockTransport, client_with, json_response, stale_session};

#[tokio::test]
async fn login_posts_credentials_without_interception() {
    let http = client_with(
        MockTransport::new(|_, _| json_response(401, &json!({ "detail": "bad credentials" }))),
        stale_session(),
    );
    let payload = LoginPayload { username: "alice".into(), password: "pw".into() };

    let err = login(&http, &payload).await.unwrap_err();

    assert_eq!(err, ApiError::Status { status: 401, detail: "bad credentials".into() });
    let sent = http.transport().sent();
    assert_eq!(sent.len(), 1, "a rejected login must not trigger a refresh");
    assert_eq!(sent[0].method, Method::POST);
    assert_eq!(sent[0].path, LOGIN_PATH);
    assert_eq!(sent[0].body, Some(json!({ "username": "alice", "password": "pw" })));
}

#[tokio::test]
async fn login_classifies_payload() {
    let http = client_with(
        MockTransport::new(|_, _| json_response(200, &json!({ "access_token": "t", "refresh_token": "r" }))),
        Session::default(),
    );
    let payload = LoginPayload { username: "alice".into(), password: "pw".into() };
    assert!(matches!(login(&http, &payload).await.unwrap(), LoginResponse::Jwt(_)));
}

#[tokio::test]
async fn register_posts_to_create() {
    let http = client_with(
        MockTransport::new(|_, _| {
            json_response(201, &json!({ "username": "bob", "showname": "Bob", "userrole": "user" }))
        }),
        Session::default(),
    );
    let payload = RegisterPayload {
        username: "bob".into(),
        showname: "Bob".into(),
        userrole: "user".into(),
        password: "pw".into(),
    };

    let resp = register(&http, &payload).await.unwrap();

    assert_eq!(resp.identity().unwrap().username, "bob");
    assert_eq!(http.transport().sent()[0].path, REGISTER_PATH);
}

#[tokio::test]
async fn logout_ignores_body_but_reports_status() {
    let http = client_with(MockTransport::new(|_, _| json_response(204, &json!(null))), stale_session());
    logout(&http).await.unwrap();

    let http = client_with(MockTransport::new(|_, _| json_response(503, &json!({}))), stale_session());
    assert!(matches!(logout(&http).await, Err(ApiError::Status { status: 503, .. })));
}

#[tokio::test]
async fn create_user_decodes_record() {
    let http = client_with(
        MockTransport::new(|_, _| json_response(201, &json!({ "id": 3, "first_name": "Bob", "last_name": "Lee" }))),
        Session::default(),
    );
    let body = UserCreate { first_name: "Bob".into(), last_name: "Lee".into() };

    let user = create_user(&http, &body).await.unwrap();

    assert_eq!(user, UserRecord { id: 3, first_name: "Bob".into(), last_name: "Lee".into() });
    assert_eq!(http.transport().sent()[0].body, Some(json!({ "first_name": "Bob", "last_name": "Lee" })));
}

#[tokio::test]
async fn list_users_sends_query_and_keeps_server_order() {
    let http = client_with(
        MockTransport::new(|_, _| {
            json_response(
                200,
                &json!([
                    { "id": 9, "first_name": "Zed", "last_name": "Lee" },
                    { "id": 2, "first_name": "Amy", "last_name": "Lee" }
                ]),
            )
        }),
        Session::default(),
    );

    let users = list_users_by_last_name(&http, "Lee").await.unwrap();

    assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![9, 2]);
    let sent = &http.transport().sent()[0];
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.query, vec![("last_name".to_owned(), "Lee".to_owned())]);
}

#[tokio::test]
async fn rejected_refresh_surfaces_status_without_reentering_refresh() {
    let http = client_with(
        MockTransport::new(|_, _| json_response(401, &json!({ "detail": "refresh token expired" }))),
        stale_session(),
    );

    let err = refresh(&http, "r1").await.unwrap_err();

    assert_eq!(err, ApiError::Status { status: 401, detail: "refresh token expired".into() });
    let sent = http.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].path, REFRESH_PATH);
    assert!(http.session().is_authenticated());
}
