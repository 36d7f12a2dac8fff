//! Freshness by replication lag (single-source replication).

use crate::load_balancer::{Candidate, FreshnessPolicy};

/// Keeps the servers sharing the lowest known lag.
///
/// Servers with unknown lag are never considered fresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct LagPolicy;

impl FreshnessPolicy for LagPolicy {
    fn name(&self) -> &'static str {
        "lag"
    }

    fn retain_fresh(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        let Some(min) = candidates
            .iter()
            .filter_map(|c| c.health.seconds_behind_primary)
            .min()
        else {
            return Vec::new();
        };

        candidates
            .iter()
            .filter(|c| c.health.seconds_behind_primary == Some(min))
            .cloned()
            .collect()
    }
}
