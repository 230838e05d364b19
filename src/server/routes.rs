//! HTTP routes for wallet operations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{require_api_key, ApiKey};
use crate::core::parse::BalanceInfo;
use crate::core::paths::routes;
use crate::registry::WalletRecord;
use crate::wallet::{WalletError, WalletService};

#[derive(Clone)]
pub struct AppState { pub wallets: Arc<WalletService>, pub app_name: String }

impl AppState {
    pub fn new(wallets: Arc<WalletService>, app_name: impl Into<String>) -> Self {
        Self { wallets, app_name: app_name.into() }
    }
}

/// Everything but `/health` sits behind the API key. Without a key the API
/// rejects every request.
pub fn create_router(wallets: Arc<WalletService>, api_key: Option<ApiKey>) -> Router {
    create_router_with_name(wallets, api_key, "cbdc-wallet-proxy")
}

pub fn create_router_with_name(wallets: Arc<WalletService>, api_key: Option<ApiKey>, app_name: &str) -> Router {
    let api = Router::new()
        .route(routes::WALLET, post(create_wallet))
        .route(routes::WALLET_BY_ID, get(get_wallet))
        .route(routes::MINT, post(mint))
        .route(routes::BALANCE, get(balance))
        .route(routes::SEND, post(send))
        .route(routes::IMPORT, post(import_funds))
        .route(routes::SEND_AND_IMPORT, post(send_and_import))
        .route_layer(middleware::from_fn_with_state(api_key, require_api_key));

    Router::new()
        .route(routes::HEALTH, get(health))
        .merge(api)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(wallets, app_name))
}

/// walletID arrives as a JSON number or a string depending on the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WalletKey { Id(u64), Text(String) }

impl WalletKey {
    fn as_key(&self) -> String {
        match self { WalletKey::Id(id) => id.to_string(), WalletKey::Text(s) => s.clone() }
    }
}

#[derive(Deserialize)]
pub struct MintRequest {
    #[serde(rename = "walletID")] wallet_id: WalletKey,
    #[serde(rename = "UTXO")] utxos: u64,
    #[serde(rename = "atomicUnit")] atomic_unit: u64,
}

#[derive(Deserialize)]
pub struct SendRequest {
    #[serde(rename = "senderID")] sender_id: WalletKey,
    #[serde(rename = "receiverAddress")] receiver_address: String,
    amount: u64,
}

#[derive(Deserialize)]
pub struct ImportRequest {
    #[serde(rename = "walletID")] wallet_id: WalletKey,
    importinput: String,
}

/// Public view of a registry record; the secret never leaves the server.
#[derive(Serialize)]
pub struct WalletResponse {
    #[serde(rename = "walletID")] wallet_id: u64,
    address: String,
}

impl From<WalletRecord> for WalletResponse {
    fn from(r: WalletRecord) -> Self { Self { wallet_id: r.wallet_id, address: r.address } }
}

/// Maps [`WalletError`] to a status. Server errors are logged in full and
/// answered with a fixed message; captured client-cli output stays here.
pub struct ApiError(WalletError);

impl From<WalletError> for ApiError {
    fn from(e: WalletError) -> Self { Self(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            e if e.is_not_found() => (StatusCode::NOT_FOUND, json!({"error": e.to_string()})),
            e if e.is_invalid_input() => (StatusCode::BAD_REQUEST, json!({"error": e.to_string()})),
            WalletError::TokenExtractionFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "send produced no importinput token"}))
            }
            WalletError::InFlight { receiver, token, step, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "send succeeded but import failed", "walletID": receiver, "importinput": token, "step": step}),
            ),
            WalletError::BalanceUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "balance unavailable"})),
            WalletError::WalletCreationFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "wallet creation failed"})),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "An error occurred"})),
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, source = ?std::error::Error::source(&self.0), "request failed");
        }
        (status, Json(body)).into_response()
    }
}

async fn health(State(s): State<AppState>) -> impl IntoResponse {
    Json(json!({"status": "ok", "service": s.app_name}))
}

async fn create_wallet(State(s): State<AppState>) -> Result<Json<WalletResponse>, ApiError> {
    Ok(Json(s.wallets.create_wallet().await?.into()))
}

async fn get_wallet(State(s): State<AppState>, Path(wallet_id): Path<String>) -> Result<Json<WalletResponse>, ApiError> {
    Ok(Json(s.wallets.get_wallet(&wallet_id).await?.into()))
}

async fn mint(State(s): State<AppState>, Json(req): Json<MintRequest>) -> Result<String, ApiError> {
    Ok(s.wallets.mint(&req.wallet_id.as_key(), req.utxos, req.atomic_unit).await?)
}

async fn balance(State(s): State<AppState>, Path(key): Path<String>) -> Result<Json<BalanceInfo>, ApiError> {
    Ok(Json(s.wallets.balance(&key).await?))
}

async fn send(State(s): State<AppState>, Json(req): Json<SendRequest>) -> Result<String, ApiError> {
    Ok(s.wallets.send(&req.sender_id.as_key(), &req.receiver_address, req.amount).await?)
}

async fn import_funds(State(s): State<AppState>, Json(req): Json<ImportRequest>) -> Result<String, ApiError> {
    Ok(s.wallets.import(&req.wallet_id.as_key(), &req.importinput).await?)
}

async fn send_and_import(State(s): State<AppState>, Json(req): Json<SendRequest>) -> Result<String, ApiError> {
    Ok(s.wallets.send_and_import(&req.sender_id.as_key(), &req.receiver_address, req.amount).await?)
}
