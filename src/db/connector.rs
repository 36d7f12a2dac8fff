//! Connector and connection traits implemented by the database driver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// First row of a query result, keyed by column name.
pub type Row = HashMap<String, String>;

/// A connection handle shared between the owning server and callers.
pub type SharedConnection = Arc<dyn Connection>;

/// Pool sizing passed through to the driver when a handle is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolSettings {
    /// Maximum idle connections kept by the pool (0 = driver default).
    pub max_idle_conns: u32,
    /// Maximum open connections (0 = unbounded).
    pub max_open_conns: u32,
    /// Maximum lifetime of a pooled connection in seconds (0 = forever).
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 2,
            max_open_conns: 0,
            max_lifetime_secs: 0,
        }
    }
}

/// Failure to open (or verify) a pooled handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The DSN could not be understood by the driver.
    #[error("invalid DSN: {0}")]
    InvalidDsn(String),

    /// The server refused or did not answer the ping.
    #[error("connection failed: {0}")]
    Unreachable(String),
}

/// Failure of a single status query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query succeeded but produced no rows.
    #[error("no rows in result set")]
    NoRows,

    /// The query itself failed.
    #[error("query failed: {0}")]
    Failed(String),
}

/// Opens pooled connections to one endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a pooled handle for `dsn` and verify it answers before returning.
    async fn connect(&self, dsn: &str, pool: &PoolSettings) -> Result<SharedConnection, ConnectError>;
}

/// A pooled handle able to run read-only status queries.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Run `query` and return its first row.
    ///
    /// Returns [`QueryError::NoRows`] when the result set is empty.
    async fn query_row(&self, query: &str) -> Result<Row, QueryError>;

    /// Release the pool. Further queries are expected to fail.
    async fn close(&self);

    /// Whether the cached handle can still be used. A handle reporting
    /// `false` is replaced on the next probe.
    fn is_usable(&self) -> bool {
        true
    }
}
