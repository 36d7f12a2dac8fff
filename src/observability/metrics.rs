//! Metrics collection and exposition.
//!
//! # Metrics
//! - `replica_balancer_server_up` (gauge): 1=up, 0=down, per server
//! - `replica_balancer_seconds_behind_primary` (gauge): last known lag
//! - `replica_balancer_open_connections` (gauge): last known connected sessions
//! - `replica_balancer_running_connections` (gauge): last known running sessions
//! - `replica_balancer_probes_total` (counter): probes by server and outcome
//! - `replica_balancer_picks_total` (counter): picks by server
//! - `replica_balancer_no_server_total` (counter): picks that found nothing
//!
//! Unknown values leave the corresponding gauge untouched.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

use crate::health::HealthSnapshot;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record the outcome of one probe.
pub fn record_probe(server: &str, snapshot: &HealthSnapshot) {
    let outcome = match (&snapshot.last_error, snapshot.up) {
        (None, _) => "ok",
        (Some(_), true) => "degraded",
        (Some(_), false) => "down",
    };
    metrics::counter!("replica_balancer_probes_total", "server" => server.to_string(), "outcome" => outcome)
        .increment(1);
    metrics::gauge!("replica_balancer_server_up", "server" => server.to_string())
        .set(if snapshot.up { 1.0 } else { 0.0 });

    if let Some(lag) = snapshot.seconds_behind_primary {
        metrics::gauge!("replica_balancer_seconds_behind_primary", "server" => server.to_string()).set(lag as f64);
    }
    if let Some(open) = snapshot.open_connections {
        metrics::gauge!("replica_balancer_open_connections", "server" => server.to_string()).set(open as f64);
    }
    if let Some(running) = snapshot.running_connections {
        metrics::gauge!("replica_balancer_running_connections", "server" => server.to_string()).set(running as f64);
    }
}

/// Record the result of one pick.
pub fn record_pick(server: Option<&str>) {
    match server {
        Some(server) => {
            metrics::counter!("replica_balancer_picks_total", "server" => server.to_string()).increment(1)
        }
        None => metrics::counter!("replica_balancer_no_server_total").increment(1),
    }
}
