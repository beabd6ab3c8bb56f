//! Shared application state handed to every route through an axum `Extension`.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::log_sink::{self, LogEntry, LogSink};
use crate::upstream::FiscalUpstream;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: Arc<dyn FiscalUpstream>,
    pub log_sink: Arc<dyn LogSink>,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        upstream: Arc<dyn FiscalUpstream>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            upstream,
            log_sink,
        }
    }

    /// Queue a log entry without waiting for it.
    pub fn log(&self, entry: LogEntry) {
        // Dropping the handle detaches the write.
        drop(log_sink::record_detached(self.log_sink.clone(), entry));
    }
}
