//! # Ferma gateway
//!
//! Accepts requests in the Ferma (OFD.ru) cloud-register format and forwards
//! them to eKomKassa (Atol v5), translating both directions.
//!
//! ## Configuration
//!
//! - `GATEWAY_BIND_ADDR`, `EKOMKASSA_BASE_URL` and the per-call timeouts, see [`GatewayConfig`]
//! - `DATABASE_URL` enables the Postgres request log; without it entries only go to `tracing`

use std::sync::Arc;

use tracing::{info, warn};

use ferma_gateway::config::GatewayConfig;
use ferma_gateway::log_sink::{LogSink, PgLogSink, TracingLogSink};
use ferma_gateway::state::AppState;
use ferma_gateway::upstream::HttpUpstream;
use ferma_gateway::{create_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferma_gateway=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting Ferma gateway");

    let config = GatewayConfig::from_env();
    info!("Forwarding to eKomKassa at {}", config.upstream_base_url);

    let log_sink: Arc<dyn LogSink> = match &config.database_url {
        Some(url) => {
            let pool = db::connect_lazy(url)?;
            info!("Request log writes to Postgres");
            Arc::new(PgLogSink::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, request log goes to tracing only");
            Arc::new(TracingLogSink)
        }
    };

    let upstream = Arc::new(HttpUpstream::new(config.clone())?);
    let bind_addr = config.bind_addr.clone();
    let app = create_app(AppState::new(config, upstream, log_sink));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Gateway listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
