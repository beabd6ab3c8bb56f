//! Token issuance.
//!
//! POST /auth                              - `{login, password}` → `{Status, Data:{AuthToken, ExpirationDateUtc}}`
//! POST /api/Authorization/CreateAuthToken - same handler under the Ferma path

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::engine::request::{self, RequestKind};
use crate::engine::response;
use crate::error::GatewayError;
use crate::models::{AuthData, AuthRequest, FermaReply};
use crate::routes::{call_upstream, forwarded_status, json_body, CallContext};
use crate::state::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/auth", post(create_token))
        .route("/api/Authorization/CreateAuthToken", post(create_token))
}

async fn create_token(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<FermaReply<AuthData>>), GatewayError> {
    let ctx = CallContext::new(RequestKind::Auth.function_name(), &headers);

    let body = json_body(body).map_err(|e| ctx.reject(&state, e))?;
    let auth: AuthRequest = serde_json::from_value(body)
        .map_err(|e| ctx.reject(&state, GatewayError::InvalidBody(e.to_string())))?;
    let credentials = request::translate_auth(&auth).map_err(|e| ctx.reject(&state, e))?;

    info!("[auth] Token request for {}", credentials.login);

    // Never log the password itself.
    let log_request = json!({
        "login": credentials.login,
        "has_password": true,
    });
    let upstream_request = request::token_request(&state.config.upstream_base_url, &credentials)?;
    let reply = call_upstream(
        &state,
        &ctx,
        &upstream_request,
        log_request,
        "Token received from eKomKassa",
    )
    .await?;

    let translated = response::translate_auth_reply(reply.status, &reply.body, ctx.now.utc);
    Ok((forwarded_status(reply.status), Json(translated)))
}
