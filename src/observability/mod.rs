//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probes, selection and lifecycle produce:
//!     → logging.rs (structured tracing events, server name as a field)
//!     → metrics.rs (per-server gauges, probe and pick counters)
//!
//! Consumers:
//!     → whatever subscriber the application installs (or init_logging)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - No subscriber installed means no output, never different behavior
//! - Metric updates are cheap enough to run on every probe and pick
//! - The exporter is only installed when `metrics_enabled` is set

pub mod logging;
pub mod metrics;

use metrics_exporter_prometheus::BuildError;
use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;

use crate::config::ObservabilityConfig;

/// Failure to set up logging or metrics from configuration.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid metrics address {address:?}: {source}")]
    InvalidMetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to install metrics exporter: {0}")]
    Exporter(#[from] BuildError),
}

/// Install logging at `log_level` and, if enabled, the Prometheus exporter.
pub fn init(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    logging::init_logging(&config.log_level);

    if !config.metrics_enabled {
        tracing::debug!("Metrics exporter disabled");
        return Ok(());
    }
    let addr: SocketAddr = config
        .metrics_address
        .parse()
        .map_err(|source| ObservabilityError::InvalidMetricsAddress {
            address: config.metrics_address.clone(),
            source,
        })?;
    self::metrics::init_metrics(addr)?;
    Ok(())
}
