//! End-to-end tests against an in-process mock of the Salesforce REST surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use salesforce_client::{SalesforceClient, SalesforceRequest};

#[derive(Default)]
struct MockState {
    /// Bearer tokens observed on REST calls.
    tokens: std::sync::Mutex<Vec<String>>,
    /// Number of query requests served.
    query_calls: AtomicUsize,
    /// When set, the first query answers 401 INVALID_SESSION_ID.
    expire_first_query: bool,
    /// Bound address, filled in once the listener exists.
    addr: std::sync::OnceLock<std::net::SocketAddr>,
}

fn record_token(state: &MockState, headers: &HeaderMap) {
    if let Some(value) = headers.get("authorization") {
        state
            .tokens
            .lock()
            .unwrap()
            .push(value.to_str().unwrap_or_default().to_string());
    }
}

async fn soap_login(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    // serverUrl points back at this mock so REST calls stay in-process.
    let base = state
        .addr
        .get()
        .map(|addr| format!("http://{addr}"))
        .unwrap_or_default();
    let body = concat!(
        "<soapenv:Envelope><soapenv:Body><loginResponse><result>",
        "<serverUrl>{base}/services/Soap/u/59.0/00Dxx</serverUrl>",
        "<sessionId>FRESH_SESSION</sessionId>",
        "</result></loginResponse></soapenv:Body></soapenv:Envelope>",
    );
    (
        [("content-type", "text/xml; charset=UTF-8")],
        body.replace("{base}", &base),
    )
}

async fn handle_query(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> axum::response::Response {
    record_token(&state, &headers);
    let call = state.query_calls.fetch_add(1, Ordering::SeqCst);
    if state.expire_first_query && call == 0 {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!([
                {"message": "Session expired or invalid", "errorCode": "INVALID_SESSION_ID"}
            ])),
        )
            .into_response();
    }

    let soql = params.get("q").cloned().unwrap_or_default();
    if soql.starts_with("SELECT COUNT()") {
        return Json(json!({"totalSize": 42, "done": true, "records": []})).into_response();
    }
    if soql.contains("Bogus__x") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!([
                {"message": "sObject type 'Bogus__x' is not supported", "errorCode": "INVALID_TYPE"}
            ])),
        )
            .into_response();
    }
    Json(json!({
        "totalSize": 1,
        "done": true,
        "records": [{"Id": "001xx000003DGb2AAG", "Name": "Acme"}],
        "echo": soql,
    }))
    .into_response()
}

async fn handle_sobjects(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    record_token(&state, &headers);
    Json(json!({
        "sobjects": [
            {"name": "Account", "custom": false, "searchable": true},
            {"name": "Invoice__c", "custom": true, "searchable": true},
        ]
    }))
}

async fn handle_create(
    State(state): State<Arc<MockState>>,
    Path(object): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_token(&state, &headers);
    (
        StatusCode::CREATED,
        Json(json!({"id": "001NEW", "success": true, "errors": [], "object": object, "received": body})),
    )
}

async fn handle_update(
    State(state): State<Arc<MockState>>,
    Path((_object, _id)): Path<(String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    record_token(&state, &headers);
    StatusCode::NO_CONTENT
}

async fn handle_delete(
    State(state): State<Arc<MockState>>,
    Path((_object, _id)): Path<(String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    record_token(&state, &headers);
    StatusCode::NO_CONTENT
}

async fn start_mock(expire_first_query: bool) -> (String, Arc<MockState>) {
    let state = Arc::new(MockState {
        expire_first_query,
        ..MockState::default()
    });

    let app = Router::new()
        .route("/services/Soap/u/59.0", post(soap_login))
        .route("/services/data/v59.0/query", get(handle_query))
        .route("/services/data/v59.0/sobjects", get(handle_sobjects))
        .route("/services/data/v59.0/sobjects/{object}", post(handle_create))
        .route(
            "/services/data/v59.0/sobjects/{object}/{id}",
            patch(handle_update).delete(handle_delete),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _ = state.addr.set(addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn query_returns_records_and_sends_the_session_as_bearer() {
    let (base, state) = start_mock(false).await;
    let client = SalesforceClient::with_session(&base, "SESSION_A").unwrap();

    let result = client
        .invoke(SalesforceRequest::Query {
            query: "SELECT Id, Name FROM Account".into(),
        })
        .await
        .unwrap();

    assert_eq!(result["records"][0]["Name"], "Acme");
    assert_eq!(result["echo"], "SELECT Id, Name FROM Account");
    assert_eq!(
        state.tokens.lock().unwrap().first().map(String::as_str),
        Some("Bearer SESSION_A")
    );
}

#[tokio::test]
async fn count_query_exposes_total_size() {
    let (base, _state) = start_mock(false).await;
    let client = SalesforceClient::with_session(&base, "SESSION_A").unwrap();

    let result = client
        .invoke(SalesforceRequest::Query {
            query: "SELECT COUNT() FROM Account".into(),
        })
        .await
        .unwrap();

    assert_eq!(result["totalSize"], 42);
}

#[tokio::test]
async fn list_objects_returns_the_sobjects_array() {
    let (base, _state) = start_mock(false).await;
    let client = SalesforceClient::with_session(&base, "SESSION_A").unwrap();

    let result = client.invoke(SalesforceRequest::ListObjects).await.unwrap();
    assert_eq!(result["sobjects"][1]["name"], "Invoice__c");
}

#[tokio::test]
async fn create_posts_the_record_data() {
    let (base, _state) = start_mock(false).await;
    let client = SalesforceClient::with_session(&base, "SESSION_A").unwrap();

    let mut record_data = serde_json::Map::new();
    record_data.insert("Name".into(), json!("Acme"));
    let result = client
        .invoke(SalesforceRequest::Create {
            object_name: "Account".into(),
            record_data,
        })
        .await
        .unwrap();

    assert_eq!(result["success"], true);
    assert_eq!(result["object"], "Account");
    assert_eq!(result["received"]["Name"], "Acme");
}

#[tokio::test]
async fn update_and_delete_return_the_status_code() {
    let (base, _state) = start_mock(false).await;
    let client = SalesforceClient::with_session(&base, "SESSION_A").unwrap();

    let updated = client
        .invoke(SalesforceRequest::Update {
            object_name: "Account".into(),
            record_id: "001xx000003DGb2AAG".into(),
            record_data: serde_json::Map::new(),
        })
        .await
        .unwrap();
    assert_eq!(updated, json!(204));

    let deleted = client
        .invoke(SalesforceRequest::Delete {
            object_name: "Account".into(),
            record_id: "001xx000003DGb2AAG".into(),
        })
        .await
        .unwrap();
    assert_eq!(deleted, json!(204));
}

#[tokio::test]
async fn api_errors_surface_with_code_and_message() {
    let (base, _state) = start_mock(false).await;
    let client = SalesforceClient::with_session(&base, "SESSION_A").unwrap();

    let err = client
        .invoke(SalesforceRequest::Query {
            query: "SELECT Id FROM Bogus__x".into(),
        })
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("INVALID_TYPE"), "unexpected error: {text}");
    assert!(text.contains("not supported"), "unexpected error: {text}");
}

#[tokio::test]
async fn invalid_session_triggers_one_relogin_and_retry() {
    let (base, state) = start_mock(true).await;
    let client = SalesforceClient::with_session(&base, "STALE_SESSION").unwrap();

    let result = client
        .invoke(SalesforceRequest::Query {
            query: "SELECT Id, Name FROM Account".into(),
        })
        .await
        .unwrap();

    assert_eq!(result["records"][0]["Id"], "001xx000003DGb2AAG");
    assert_eq!(state.query_calls.load(Ordering::SeqCst), 2);

    let tokens = state.tokens.lock().unwrap();
    assert_eq!(tokens.first().map(String::as_str), Some("Bearer STALE_SESSION"));
    assert_eq!(tokens.last().map(String::as_str), Some("Bearer FRESH_SESSION"));
}
