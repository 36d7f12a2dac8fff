//! Bounded startup sweep.
//!
//! Probes every server in configuration order until the sweep finishes or
//! the deadline fires, whichever comes first. A probe in progress when the
//! deadline fires is not interrupted; the sweep just stops before the next
//! server.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::load_balancer::Server;

/// How the warm-up sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmUp {
    /// Every server was probed before the deadline.
    Completed { probed: usize },
    /// The deadline fired first; `probed` servers had finished by then.
    DeadlineExceeded { probed: usize },
}

/// Probe `servers` one after the other for at most `wait`.
pub async fn warm_up(servers: Arc<[Arc<Server>]>, wait: Duration) -> WarmUp {
    let expired = Arc::new(AtomicBool::new(false));
    let probed = Arc::new(AtomicUsize::new(0));

    let mut sweep = tokio::spawn({
        let expired = expired.clone();
        let probed = probed.clone();
        async move {
            for server in servers.iter() {
                if expired.load(Ordering::Acquire) {
                    tracing::debug!(server = %server.name(), "Warm-up expired, leaving server unprobed");
                    return;
                }
                server.probe().await;
                probed.fetch_add(1, Ordering::AcqRel);
            }
        }
    });

    tokio::select! {
        joined = &mut sweep => {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Warm-up sweep aborted");
            }
            WarmUp::Completed { probed: probed.load(Ordering::Acquire) }
        }
        _ = time::sleep(wait) => {
            expired.store(true, Ordering::Release);
            let probed = probed.load(Ordering::Acquire);
            tracing::warn!(
                wait_secs = wait.as_secs_f64(),
                probed,
                "Warm-up deadline reached before every server was probed"
            );
            WarmUp::DeadlineExceeded { probed }
        }
    }
}
