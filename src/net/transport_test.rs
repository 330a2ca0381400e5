use super::*;
use crate::net::types::UserRecord;

#[test]
fn request_builders_default_to_intercepting() {
    let req = ApiRequest::get("/users").query("last_name", "Lee");
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.query, vec![("last_name".to_owned(), "Lee".to_owned())]);
    assert!(req.intercept_unauthorized);
    assert!(!req.without_refresh().intercept_unauthorized);
}

#[test]
fn requests_get_distinct_ids() {
    assert_ne!(ApiRequest::post("/a").id, ApiRequest::post("/a").id);
}

#[test]
fn json_decodes_success_body() {
    let resp = ApiResponse::new(201, r#"{"id":3,"first_name":"Bob","last_name":"Lee"}"#);
    let user: UserRecord = resp.json().unwrap();
    assert_eq!(user.id, 3);
}

#[test]
fn json_maps_error_status_with_detail() {
    let resp = ApiResponse::new(409, r#"{"detail":"User already exists"}"#);
    let err = resp.json::<UserRecord>().unwrap_err();
    assert_eq!(err, ApiError::Status { status: 409, detail: "User already exists".into() });
}

#[test]
fn json_reports_undecodable_body() {
    let err = ApiResponse::new(200, "not json").json::<UserRecord>().unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}

#[test]
fn reqwest_transport_trims_base_url() {
    let transport = ReqwestTransport::new("http://127.0.0.1:8000/", Timeouts::default()).unwrap();
    assert_eq!(transport.base_url(), "http://127.0.0.1:8000");
}
