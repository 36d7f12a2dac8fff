//! Periodic health checking.
//!
//! # Responsibilities
//! - Tick at the configured interval until the close signal arrives
//! - Fan out one independent probe task per server on every tick
//!
//! # Design Decisions
//! - Ticks never wait for probes; a server still busy skips the tick
//! - The first tick lands one interval after start (warm-up just ran)

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::load_balancer::Server;

/// Spawn the periodic checker.
pub fn spawn_periodic_checks(
    servers: Arc<[Arc<Server>]>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs_f64(), servers = servers.len(), "Health checker starting");

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => probe_all(&servers),
                _ = shutdown.recv() => {
                    tracing::info!("Health checker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}

/// Start one probe task per server without waiting for any of them.
pub fn probe_all(servers: &[Arc<Server>]) {
    for server in servers {
        let server = server.clone();
        tokio::spawn(async move {
            server.probe().await;
        });
    }
}
