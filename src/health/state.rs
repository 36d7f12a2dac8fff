//! Server health record.
//!
//! # States
//! - Up: routable; `last_error` may still carry a monitoring failure (degraded)
//! - Down: primary role unreachable, excluded from selection
//!
//! A server that was never probed reads as down.
//!
//! # Design Decisions
//! - Each probe produces a complete [`HealthSnapshot`]
//! - The snapshot is published with a single pointer swap, so a reader sees
//!   either the previous run or the new one, never a mix
//! - Unknown numbers are `None`, never a sentinel

use arc_swap::ArcSwap;
use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::health::ProbeError;

/// Last-known status of one server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    /// Whether the server may receive reads.
    pub up: bool,
    /// Most recent failure, possibly set while `up` (degraded).
    #[serde(serialize_with = "serialize_error")]
    pub last_error: Option<ProbeError>,
    /// Replication IO thread running (single-source) or cluster link connected (multi-source).
    pub io_running: bool,
    /// Node accepts write-set transactions (multi-source only).
    pub write_set_ready: bool,
    /// Replication lag in seconds.
    pub seconds_behind_primary: Option<u64>,
    /// Total connected sessions.
    pub open_connections: Option<u64>,
    /// Sessions actively executing.
    pub running_connections: Option<u64>,
    /// Cluster membership state code (multi-source only).
    pub write_set_local_state: Option<u32>,
    /// When this snapshot was taken.
    pub last_update: SystemTime,
}

impl HealthSnapshot {
    /// Snapshot of a server that has not been probed yet.
    pub fn unprobed() -> Self {
        Self {
            up: false,
            last_error: None,
            io_running: false,
            write_set_ready: false,
            seconds_behind_primary: None,
            open_connections: None,
            running_connections: None,
            write_set_local_state: None,
            last_update: SystemTime::now(),
        }
    }

    /// Snapshot of a server whose primary role is unreachable.
    pub fn down(error: ProbeError) -> Self {
        Self {
            last_error: Some(error),
            ..Self::unprobed()
        }
    }

    /// Up and without any recorded failure.
    pub fn is_clean(&self) -> bool {
        self.up && self.last_error.is_none()
    }
}

fn serialize_error<S: Serializer>(error: &Option<ProbeError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Atomically replaced holder of a server's [`HealthSnapshot`].
#[derive(Debug)]
pub struct HealthRecord {
    current: ArcSwap<HealthSnapshot>,
    revision: AtomicU64,
}

impl HealthRecord {
    /// Create a record for a server that has not been probed.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(HealthSnapshot::unprobed()),
            revision: AtomicU64::new(0),
        }
    }

    /// The current snapshot. Cheap; does not block writers.
    pub fn snapshot(&self) -> Arc<HealthSnapshot> {
        self.current.load_full()
    }

    /// Whether the server is currently routable.
    pub fn is_up(&self) -> bool {
        self.current.load().up
    }

    /// Number of snapshots stored since creation.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Publish a new snapshot, returning the one it replaced.
    pub(crate) fn store(&self, snapshot: HealthSnapshot) -> Arc<HealthSnapshot> {
        let previous = self.current.swap(Arc::new(snapshot));
        self.revision.fetch_add(1, Ordering::AcqRel);
        previous
    }
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self::new()
    }
}
