//! HTTP surface: routing, API key check and error → status mapping.

mod common;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use cbdc_wallet_proxy::{create_router, ApiKey};
use common::{failure, happy_response, seeded, ScriptedRunner};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const KEY: &str = "12345";

async fn app(runner: Arc<ScriptedRunner>) -> (Router, TempDir) {
    let (svc, dir) = seeded(runner).await;
    (create_router(Arc::new(svc), Some(ApiKey::new(KEY))), dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).header("X-API-KEY", KEY).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("X-API-KEY", KEY)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read(resp: axum::response::Response) -> (StatusCode, String) {
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn read_json(resp: axum::response::Response) -> (StatusCode, Value) {
    let (status, text) = read(resp).await;
    (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn health_needs_no_key() {
    let (app, _dir) = app(ScriptedRunner::happy()).await;
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = read_json(app.oneshot(req).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_key_required() {
    let (app, _dir) = app(ScriptedRunner::happy()).await;

    let missing = Request::get("/wallet/0").body(Body::empty()).unwrap();
    let (status, body) = read_json(app.clone().oneshot(missing).await.unwrap()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "No API key provided"}));

    let wrong = Request::get("/wallet/0").header("X-API-KEY", "nope").body(Body::empty()).unwrap();
    let (status, body) = read_json(app.oneshot(wrong).await.unwrap()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "Invalid API key"}));
}

#[tokio::test]
async fn no_configured_key_rejects_everything() {
    let runner = ScriptedRunner::happy();
    let (svc, _dir) = seeded(runner.clone()).await;
    let app = create_router(Arc::new(svc), None);

    let (status, body) = read_json(app.clone().oneshot(get("/wallet/0")).await.unwrap()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "Invalid API key"}));

    let mint = post("/mint", json!({"walletID": 0, "UTXO": 1, "atomicUnit": 100}));
    assert_eq!(app.clone().oneshot(mint).await.unwrap().status(), StatusCode::FORBIDDEN);
    assert!(runner.calls().is_empty());

    let health = Request::get("/health").body(Body::empty()).unwrap();
    assert_eq!(app.oneshot(health).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn create_and_get_wallet() {
    let (app, _dir) = app(ScriptedRunner::happy()).await;

    let (status, created) = read_json(app.clone().oneshot(post("/wallet", json!({}))).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created, json!({"walletID": 2, "address": "usd1q2addr"}));

    let (status, fetched) = read_json(app.clone().oneshot(get("/wallet/2")).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) = read(app.oneshot(get("/wallet/99")).await.unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn balance_by_address_returns_string_fields() {
    let (app, _dir) = app(ScriptedRunner::happy()).await;
    let (status, body) = read_json(app.clone().oneshot(get("/balance/usd1alice")).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"balance": "12.50", "utxos": "3", "pending": "0"}));

    let (status, _) = read(app.oneshot(get("/balance/usd1ghost")).await.unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mint_accepts_numeric_and_string_ids() {
    let runner = ScriptedRunner::happy();
    let (app, _dir) = app(runner.clone()).await;

    let (status, text) = read(app.clone().oneshot(post("/mint", json!({"walletID": 0, "UTXO": 1, "atomicUnit": 100}))).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "minted 1 x 100\n");

    let (status, _) = read(app.oneshot(post("/mint", json!({"walletID": "1", "UTXO": 2, "atomicUnit": 5}))).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(runner.trace()[1], ("mint".to_string(), "wallet1.dat".to_string()));
}

#[tokio::test]
async fn send_then_import_funds() {
    let runner = ScriptedRunner::happy();
    let (app, _dir) = app(runner.clone()).await;

    let send = json!({"senderID": 0, "receiverAddress": "usd1bob", "amount": 10});
    let (status, text) = read(app.clone().oneshot(post("/send", send)).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let token = cbdc_wallet_proxy::parse_continuation_token(&text).unwrap();

    let import = json!({"walletID": "1", "importinput": token});
    let (status, text) = read(app.oneshot(post("/importfunds", import)).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("Balance: $12.50"));
    assert_eq!(runner.calls().len(), 4);
}

#[tokio::test]
async fn send_and_import_without_token_is_server_error() {
    let runner = ScriptedRunner::new(|args| match args[3].as_str() {
        "send" => Ok("tx_id:\nabc\n".into()),
        _ => happy_response(args),
    });
    let (app, _dir) = app(runner.clone()).await;

    let req = post("/sendandimport", json!({"senderID": 0, "receiverAddress": "usd1bob", "amount": 10}));
    let (status, body) = read_json(app.oneshot(req).await.unwrap()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "send produced no importinput token");
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn server_errors_do_not_echo_tool_output() {
    let runner = ScriptedRunner::new(|_| Err(failure("private key material 0xdeadbeef")));
    let (app, _dir) = app(runner).await;

    let req = post("/send", json!({"senderID": 0, "receiverAddress": "usd1bob", "amount": 10}));
    let (status, text) = read(app.oneshot(req).await.unwrap()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!text.contains("deadbeef"));
}

#[tokio::test]
async fn empty_importinput_is_bad_request() {
    let (app, _dir) = app(ScriptedRunner::happy()).await;
    let req = post("/importfunds", json!({"walletID": 1, "importinput": ""}));
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::BAD_REQUEST);
}
