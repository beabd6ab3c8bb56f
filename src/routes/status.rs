//! Document status polling.
//!
//! GET /status?AuthToken=..&uuid=..&group_code=..
//! GET /api/kkt/cloud/status - same handler under the Ferma path

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use tracing::info;

use crate::engine::request::{self, RequestKind, StatusQuery};
use crate::engine::response;
use crate::error::GatewayError;
use crate::models::{FermaReply, StatusData, StatusParams};
use crate::routes::{call_upstream, forwarded_status, CallContext};
use crate::state::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/api/kkt/cloud/status", get(get_status))
}

async fn get_status(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(params): Query<StatusParams>,
) -> Result<(StatusCode, Json<FermaReply<StatusData>>), GatewayError> {
    let ctx = CallContext::new(RequestKind::Status.function_name(), &headers);

    let query = StatusQuery::from_params(&params).map_err(|e| ctx.reject(&state, e))?;
    info!(
        "[status] Status request for {} in group {}",
        query.document_id, query.group_code
    );

    let upstream_request = request::report_request(&state.config.upstream_base_url, &query);
    let log_request = json!({
        "uuid": query.document_id,
        "group_code": query.group_code,
    });
    let reply = call_upstream(
        &state,
        &ctx,
        &upstream_request,
        log_request,
        "Status received from eKomKassa",
    )
    .await?;

    let translated = response::translate_status_reply(reply.status, &reply.body);
    Ok((forwarded_status(reply.status), Json(translated)))
}
