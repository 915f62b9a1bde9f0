//! Round-trip tests for `HttpStore` against a local stub of the REST endpoint.
//!
//! The stub echoes back the decoded query parameters and checks the
//! credentials, so no hosted store is required.

use axum::{
    extract::Query as Params,
    http::{header::CONTENT_RANGE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use store::{Direction, HttpStore, Query, RowStore, StoreConfig, StoreError};

const KEY: &str = "anon-key";

async fn invoices(headers: HeaderMap, Params(params): Params<Vec<(String, String)>>) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    };

    if header("apikey") != KEY || header("authorization") != format!("Bearer {KEY}") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response();
    }

    if header("prefer") == "count=exact" {
        return ([(CONTENT_RANGE, "*/42")], "").into_response();
    }

    Json(json!([{ "params": params }])).into_response()
}

/// Start the stub on an ephemeral port and return its base URL.
async fn spawn_stub() -> String {
    let app = Router::new().route("/rest/v1/invoices", get(invoices));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn store(url: &str, key: &str) -> HttpStore {
    HttpStore::new(StoreConfig::new(url, key).unwrap()).unwrap()
}

#[tokio::test]
async fn select_sends_rendered_params_and_credentials() {
    let url = spawn_stub().await;
    let query = Query::table("invoices")
        .select(&["id", "amount"])
        .embed_inner("customers", &["name", "email"])
        .contains_any_in("customers", &["email", "name"], r#"o'neil, "50%""#)
        .order("date", Direction::Desc)
        .range(6, 6);

    let rows = store(&url, KEY).select(&query).await.unwrap();

    let expected: Vec<Value> = query
        .to_params()
        .into_iter()
        .map(|(k, v)| json!([k, v]))
        .collect();
    assert_eq!(rows, vec![json!({ "params": expected })]);
}

#[tokio::test]
async fn count_reads_content_range_total() {
    let url = spawn_stub().await;
    let total = store(&url, KEY)
        .count(&Query::table("invoices").contains_any_in("customers", &["name"], "x"))
        .await
        .unwrap();
    assert_eq!(total, 42);
}

#[tokio::test]
async fn rejected_key_surfaces_api_error_message() {
    let url = spawn_stub().await;
    let err = store(&url, "wrong")
        .select(&Query::table("invoices"))
        .await
        .unwrap_err();
    match err {
        StoreError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unknown_table_is_an_api_error() {
    let url = spawn_stub().await;
    let err = store(&url, KEY)
        .select(&Query::table("revenue"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Api { status: 404, .. }));
}
