//! Freshness by write-set cluster state (multi-source replication).

use crate::db::status::WSREP_STATE_SYNCED;
use crate::load_balancer::{Candidate, FreshnessPolicy};

/// Keeps the nodes that are ready and report the synced state.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteSetPolicy;

impl FreshnessPolicy for WriteSetPolicy {
    fn name(&self) -> &'static str {
        "write_set"
    }

    fn retain_fresh(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        candidates
            .iter()
            .filter(|c| c.health.write_set_ready && c.health.write_set_local_state == Some(WSREP_STATE_SYNCED))
            .cloned()
            .collect()
    }
}
