//! HTTP routes of the gateway.
//!
//! - `auth`: token issuance (`/auth`, `/api/Authorization/CreateAuthToken`)
//! - `receipt`: receipt and correction submission (`/receipt`, `/api/kkt/cloud/receipt`)
//! - `status`: document status polling (`/status`, `/api/kkt/cloud/status`)
//! - `health`: liveness probe

pub mod auth;
pub mod health;
pub mod receipt;
pub mod status;

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::engine::request::{RequestTime, UpstreamRequest};
use crate::error::GatewayError;
use crate::log_sink::LogEntry;
use crate::state::AppState;
use crate::upstream::UpstreamReply;

/// Per-request bookkeeping shared by every route.
pub(crate) struct CallContext {
    pub function_name: &'static str,
    pub request_id: String,
    pub now: RequestTime,
    started: Instant,
}

impl CallContext {
    pub fn new(function_name: &'static str, headers: &HeaderMap) -> Self {
        let now = RequestTime::now();
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| now.fallback_external_id());
        Self {
            function_name,
            request_id,
            now,
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.started.elapsed().as_millis() as i64
    }

    /// Record a rejected request and hand the error back for the response.
    pub fn reject(&self, state: &AppState, err: GatewayError) -> GatewayError {
        if err.is_client_error() {
            warn!("[{}] Rejected request: {}", self.function_name, err);
        } else {
            error!("[{}] Request failed: {}", self.function_name, err);
        }
        state.log(
            LogEntry::error(self.function_name, err.to_string())
                .request_id(&self.request_id)
                .duration_ms(self.elapsed_ms())
                .status_code(err.status_code().as_u16()),
        );
        err
    }
}

/// Send one upstream request and log the outcome. Transport failures are
/// logged without a response and surface as `GatewayError::Transport`.
pub(crate) async fn call_upstream(
    state: &AppState,
    ctx: &CallContext,
    request: &UpstreamRequest,
    log_request: Value,
    success_message: &str,
) -> Result<UpstreamReply, GatewayError> {
    info!("[{}] Request to eKomKassa: {}", ctx.function_name, request.url);

    match state.upstream.send(request).await {
        Ok(reply) => {
            info!(
                "[{}] Response from eKomKassa: status={}",
                ctx.function_name, reply.status
            );
            state.log(
                LogEntry::info(ctx.function_name, success_message)
                    .request_data(log_request)
                    .response_data(reply.body.clone())
                    .request_id(&ctx.request_id)
                    .duration_ms(ctx.elapsed_ms())
                    .status_code(reply.status),
            );
            Ok(reply)
        }
        Err(err) => {
            error!("[{}] eKomKassa API error: {}", ctx.function_name, err);
            state.log(
                LogEntry::error(ctx.function_name, err.to_string())
                    .request_data(log_request)
                    .request_id(&ctx.request_id)
                    .duration_ms(ctx.elapsed_ms())
                    .status_code(err.status_code().as_u16()),
            );
            Err(err)
        }
    }
}

/// Upstream status forwarded verbatim; nonsense codes become 502.
pub(crate) fn forwarded_status(upstream_status: u16) -> StatusCode {
    StatusCode::from_u16(upstream_status).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Unreadable JSON bodies answer in the Ferma error shape, not axum's plain text.
pub(crate) fn json_body(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Value, GatewayError> {
    body.map(|Json(value)| value)
        .map_err(|e| GatewayError::InvalidBody(e.body_text()))
}
