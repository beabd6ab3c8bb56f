//! Gateway error type.
//!
//! Only failures the gateway itself produces live here: rejected client input,
//! transport failures talking to eKomKassa, and infrastructure errors.
//! Upstream *application* errors are not `GatewayError`s; they are translated
//! into Ferma replies that keep the upstream HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::{FermaError, FermaReply};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0} required")]
    MissingField(&'static str),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("Items required")]
    EmptyItems,

    #[error("Token required")]
    MissingToken,

    #[error("eKomKassa API error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingField(_)
            | GatewayError::InvalidBody(_)
            | GatewayError::EmptyItems => StatusCode::BAD_REQUEST,
            GatewayError::MissingToken => StatusCode::UNAUTHORIZED,
            GatewayError::Transport(_)
            | GatewayError::Serialization(_)
            | GatewayError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::MissingField(_) => "MISSING_FIELD",
            GatewayError::InvalidBody(_) => "INVALID_BODY",
            GatewayError::EmptyItems => "ITEMS_REQUIRED",
            GatewayError::MissingToken => "TOKEN_REQUIRED",
            GatewayError::Transport(_) => "UPSTREAM_UNAVAILABLE",
            GatewayError::Serialization(_) | GatewayError::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Client input errors are rejected before anything is sent upstream.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    pub fn to_ferma_error(&self) -> FermaError {
        FermaError {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = FermaReply::<()>::failed(None, self.to_ferma_error());
        (self.status_code(), Json(body)).into_response()
    }
}
