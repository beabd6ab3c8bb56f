//! Request log sink.
//!
//! Every gateway call records what came in, what went upstream and what came
//! back. Writes are fire-and-forget: they are spawned off the request task and
//! a failed write is only reported through `tracing`, never to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::db::AppDb;
use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// One row of the request log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub function_name: &'static str,
    pub level: LogLevel,
    pub message: String,
    pub request_data: Option<Value>,
    pub response_data: Option<Value>,
    pub request_id: Option<String>,
    pub duration_ms: Option<i64>,
    pub status_code: Option<i32>,
}

impl LogEntry {
    pub fn new(function_name: &'static str, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            function_name,
            level,
            message: message.into(),
            request_data: None,
            response_data: None,
            request_id: None,
            duration_ms: None,
            status_code: None,
        }
    }

    pub fn info(function_name: &'static str, message: impl Into<String>) -> Self {
        Self::new(function_name, LogLevel::Info, message)
    }

    pub fn error(function_name: &'static str, message: impl Into<String>) -> Self {
        Self::new(function_name, LogLevel::Error, message)
    }

    pub fn request_data(mut self, data: Value) -> Self {
        self.request_data = Some(data);
        self
    }

    pub fn response_data(mut self, data: Value) -> Self {
        self.response_data = Some(data);
        self
    }

    pub fn request_id(mut self, id: &str) -> Self {
        self.request_id = Some(id.to_string());
        self
    }

    pub fn duration_ms(mut self, ms: i64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(i32::from(code));
        self
    }
}

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn record(&self, entry: LogEntry) -> Result<(), GatewayError>;
}

/// Spawn a write and forget about it. The handle is only for callers that
/// need to wait for the write; failures never reach it.
pub fn record_detached(sink: Arc<dyn LogSink>, entry: LogEntry) -> JoinHandle<()> {
    tokio::spawn(async move {
        let function_name = entry.function_name;
        if let Err(e) = sink.record(entry).await {
            error!("Failed to write {} log entry: {}", function_name, e);
        }
    })
}

/// Writes entries into the `logs` table.
pub struct PgLogSink {
    pool: AppDb,
}

impl PgLogSink {
    pub fn new(pool: AppDb) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogSink for PgLogSink {
    async fn record(&self, entry: LogEntry) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO logs (function_name, log_level, message, request_data, response_data, request_id, duration_ms, status_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.function_name)
        .bind(entry.level.as_str())
        .bind(&entry.message)
        .bind(entry.request_data.map(Json))
        .bind(entry.response_data.map(Json))
        .bind(&entry.request_id)
        .bind(entry.duration_ms)
        .bind(entry.status_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Used when no database is configured; entries only reach `tracing`.
pub struct TracingLogSink;

#[async_trait]
impl LogSink for TracingLogSink {
    async fn record(&self, entry: LogEntry) -> Result<(), GatewayError> {
        debug!(
            function = entry.function_name,
            level = entry.level.as_str(),
            request_id = entry.request_id.as_deref().unwrap_or("-"),
            status = ?entry.status_code,
            duration_ms = ?entry.duration_ms,
            "{}",
            entry.message
        );
        Ok(())
    }
}
