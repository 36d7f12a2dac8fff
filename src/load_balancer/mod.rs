//! Server selection subsystem.
//!
//! # Data Flow
//! ```text
//! Balancer::pick_server
//!     → snapshot every server's health once (server.rs)
//!     → keep servers that are up
//!     → freshness filter of the replication mode:
//!         - lag.rs (lowest known lag)
//!         - write_set.rs (ready && synced)
//!     → nobody fresh? rank every up server instead
//!     → least_load.rs (fewest running, then fewest open sessions)
//!     → first candidate wins
//! ```
//!
//! # Design Decisions
//! - Selection is pure: it reads snapshots and never blocks probes
//! - Unknown values always rank after known ones
//! - The load sort is stable, so full ties keep configuration order

pub mod balancer;
pub mod lag;
pub mod least_load;
pub mod server;
pub mod write_set;

use std::sync::Arc;

use crate::config::ReplicationMode;
use crate::health::HealthSnapshot;

pub use balancer::{Balancer, BalancerState};
pub use lag::LagPolicy;
pub use least_load::{compare_known_first, compare_load};
pub use server::Server;
pub use write_set::WriteSetPolicy;

/// A server paired with the snapshot selection is working from.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub server: Arc<Server>,
    pub health: Arc<HealthSnapshot>,
}

impl Candidate {
    /// Take the server's current snapshot.
    pub fn new(server: Arc<Server>) -> Self {
        let health = server.health();
        Self { server, health }
    }
}

/// Replication-specific notion of "fresh enough to prefer".
pub trait FreshnessPolicy: Send + Sync + std::fmt::Debug {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// The subset of `candidates` considered freshest, in input order.
    fn retain_fresh(&self, candidates: &[Candidate]) -> Vec<Candidate>;
}

impl ReplicationMode {
    /// Freshness policy matching this topology.
    pub fn policy(&self) -> &'static dyn FreshnessPolicy {
        match self {
            ReplicationMode::SingleSource => &LagPolicy,
            ReplicationMode::MultiSourceWriteSet => &WriteSetPolicy,
        }
    }
}

/// Pick the best server to route the next read to.
pub fn pick_server(servers: &[Arc<Server>], mode: ReplicationMode) -> Option<Arc<Server>> {
    let up: Vec<Candidate> = servers
        .iter()
        .cloned()
        .map(Candidate::new)
        .filter(|c| c.health.up)
        .collect();

    pick_candidate(up, mode.policy()).map(|c| c.server)
}

/// Rank already-snapshotted up candidates.
pub fn pick_candidate(up: Vec<Candidate>, policy: &dyn FreshnessPolicy) -> Option<Candidate> {
    if up.len() <= 1 {
        return up.into_iter().next();
    }

    let mut candidates = policy.retain_fresh(&up);
    match candidates.len() {
        0 => {
            tracing::trace!(policy = policy.name(), "No fresh server, ranking every up server by load");
            candidates = up;
        }
        1 => return candidates.pop(),
        _ => {}
    }

    candidates.sort_by(|a, b| compare_load(&a.health, &b.health));
    candidates.into_iter().next()
}
