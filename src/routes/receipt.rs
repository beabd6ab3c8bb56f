//! Receipt and correction submission.
//!
//! POST /receipt               - Ferma `Request` envelope or the simple `{token, operation, receipt}` shape
//! POST /api/kkt/cloud/receipt - same handler under the Ferma path
//!
//! Client input errors are rejected before eKomKassa is called.

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::engine::dispatch::ReceiptSubmission;
use crate::engine::request::{self, RequestKind};
use crate::engine::response;
use crate::error::GatewayError;
use crate::models::{FermaReply, ReceiptData};
use crate::routes::{call_upstream, forwarded_status, json_body, CallContext};
use crate::state::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/receipt", post(submit_receipt))
        .route("/api/kkt/cloud/receipt", post(submit_receipt))
}

async fn submit_receipt(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<FermaReply<ReceiptData>>), GatewayError> {
    let ctx = CallContext::new(RequestKind::Receipt.function_name(), &headers);

    let body = json_body(body).map_err(|e| ctx.reject(&state, e))?;
    let submission = ReceiptSubmission::detect(&body).map_err(|e| ctx.reject(&state, e))?;
    let operation = submission.operation();
    info!(
        "[receipt] {} submission: operation={}, group={}",
        submission.shape(),
        operation.keyword(),
        submission.group_code()
    );

    let upstream_request =
        request::receipt_request(&state.config.upstream_base_url, &submission, &ctx.now)
            .map_err(|e| ctx.reject(&state, e))?;

    let log_request = json!({
        "shape": submission.shape(),
        "operation": operation.keyword(),
        "group_code": submission.group_code(),
        "payload": upstream_request.body,
    });
    let reply = call_upstream(
        &state,
        &ctx,
        &upstream_request,
        log_request,
        &format!("Receipt submitted: {}", operation.keyword()),
    )
    .await?;

    let translated = response::translate_receipt_reply(reply.status, &reply.body);
    Ok((forwarded_status(reply.status), Json(translated)))
}
