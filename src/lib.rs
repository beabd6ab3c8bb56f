//! # Ferma gateway library
//!
//! Exposes the router and modules so integration tests can build an
//! in-process app with a stub upstream and an in-memory log sink.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod log_sink;
pub mod models;
pub mod routes;
pub mod state;
pub mod upstream;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all route modules and middleware.
///
/// Does NOT bind a listener; `main` does that.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::receipt::router())
        .merge(routes::status::router())
        .merge(routes::health::router())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
