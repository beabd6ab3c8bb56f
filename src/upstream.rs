//! Outbound HTTP client for the eKomKassa API.
//!
//! The engine only builds [`UpstreamRequest`]s; executing them is behind the
//! [`FiscalUpstream`] trait so routes can be exercised against a stub.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GatewayConfig;
use crate::engine::request::{UpstreamMethod, UpstreamRequest};
use crate::error::GatewayError;

const USER_AGENT: &str = "eKomKassa-Gateway/1.0";

/// Raw upstream reply: HTTP status plus the body as JSON. Non-JSON bodies
/// are wrapped as `{"raw": text}`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }));
        Self { status, body }
    }
}

#[async_trait]
pub trait FiscalUpstream: Send + Sync {
    /// Perform one call. Any HTTP status is a reply; only failing to obtain
    /// one (connect, timeout, broken body) is an error.
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamReply, GatewayError>;
}

/// `reqwest`-backed client with per-operation timeouts.
pub struct HttpUpstream {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpUpstream {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl FiscalUpstream for HttpUpstream {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamReply, GatewayError> {
        let mut builder = match request.method {
            UpstreamMethod::Get => self.client.get(&request.url),
            UpstreamMethod::Post => self.client.post(&request.url),
        }
        .header(CONTENT_TYPE, "application/json")
        .timeout(self.config.timeout_for(request.kind));

        if let Some(token) = &request.token {
            builder = builder.header("Token", token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        debug!("eKomKassa replied {} for {}", status, request.url);
        Ok(UpstreamReply::from_text(status, &text))
    }
}
