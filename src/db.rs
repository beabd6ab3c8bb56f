//! Database helpers for the request log.
//!
//! The pool is created lazily: the gateway starts and serves traffic even
//! when Postgres is unreachable, and log writes fail individually instead.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::GatewayError;

/// Type alias for the log database pool.
pub type AppDb = PgPool;

/// Build a pool for `database_url` without connecting yet.
pub fn connect_lazy(database_url: &str) -> Result<AppDb, GatewayError> {
    Ok(PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(database_url)?)
}
