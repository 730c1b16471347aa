// crates/contract-probe-accounts/src/controller.rs
// ============================================================================
// Module: Accounts Controller
// Description: axum routes re-exposing the accounts client.
// Purpose: Serve `GET /demo/accounts` as a pass-through of `GET /accounts`.
// Dependencies: axum, serde_json
// ============================================================================

//! ## Overview
//! One route, no transformation: the upstream list is relayed as JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use serde_json::json;

use crate::client::AccountsClient;

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the demo router over `client`.
pub fn accounts_router(client: Arc<AccountsClient>) -> Router {
    Router::new().route("/demo/accounts", get(list_accounts)).with_state(client)
}

/// Relays the upstream account list unchanged.
async fn list_accounts(State(client): State<Arc<AccountsClient>>) -> Response {
    match client.get_accounts().await {
        Ok(accounts) => Json(accounts).into_response(),
        Err(err) => {
            let body = json!({ "code": "UPSTREAM_ERROR", "message": err.to_string() });
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}
