//! Active probing of one server.
//!
//! # Responsibilities
//! - Guarantee at most one probe per server at a time
//! - Run the status queries of the server's replication mode, in order
//! - Fold everything learned into one [`HealthSnapshot`]
//!
//! # Probe Steps
//! ```text
//! 1. primary role connection  → failure: DOWN, stop
//! 2. status role connection   → failure: UP + error, stop (DOWN if closed)
//! 3. IO / cluster link flags  → failure: flag stays false
//! 4. Threads_connected        → failure: UP + error, stop
//! 5. Threads_running          → failure: UP + error, stop
//! 6. lag / wsrep_local_state  → failure: UP + error, stop
//! 7. everything known         → UP, error cleared
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use crate::config::ReplicationMode;
use crate::db::{status, Connection, Row};
use crate::health::{HealthSnapshot, ProbeError};
use crate::load_balancer::server::Server;

/// Held while a probe runs; clears the server's flag on drop.
#[derive(Debug)]
pub(crate) struct ProbeGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ProbeGuard<'a> {
    /// Claim the flag, or `None` if a probe is already running.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Facts collected so far during one probe run.
#[derive(Debug, Default)]
struct ProbeFacts {
    io_running: bool,
    write_set_ready: bool,
    seconds_behind_primary: Option<u64>,
    open_connections: Option<u64>,
    running_connections: Option<u64>,
    write_set_local_state: Option<u32>,
}

impl ProbeFacts {
    /// An up snapshot carrying whatever was learned, plus the failure if any.
    fn up(self, error: Option<ProbeError>) -> HealthSnapshot {
        HealthSnapshot {
            up: true,
            last_error: error,
            io_running: self.io_running,
            write_set_ready: self.write_set_ready,
            seconds_behind_primary: self.seconds_behind_primary,
            open_connections: self.open_connections,
            running_connections: self.running_connections,
            write_set_local_state: self.write_set_local_state,
            last_update: SystemTime::now(),
        }
    }
}

/// Run every probe step against `server` and build the resulting snapshot.
pub(crate) async fn collect(server: &Server) -> HealthSnapshot {
    let primary = match server.primary_connection().await {
        Ok(conn) => conn,
        Err(e) => return HealthSnapshot::down(e),
    };

    let mut facts = ProbeFacts::default();
    let status = match server.status_connection(&primary).await {
        Ok(conn) => conn,
        Err(ProbeError::Closed) => return HealthSnapshot::down(ProbeError::Closed),
        Err(e) => return facts.up(Some(e)),
    };

    let queries = StatusQueries {
        server: server.name(),
        conn: status.as_ref(),
        trace: server.trace_queries(),
    };
    match read_status(&queries, server.replication_mode(), &mut facts).await {
        Ok(()) => facts.up(None),
        Err(e) => facts.up(Some(e)),
    }
}

async fn read_status(
    queries: &StatusQueries<'_>,
    mode: ReplicationMode,
    facts: &mut ProbeFacts,
) -> Result<(), ProbeError> {
    match mode {
        ReplicationMode::SingleSource => {
            facts.io_running = queries.flag(status::SLAVE_RUNNING).await;
        }
        ReplicationMode::MultiSourceWriteSet => {
            facts.io_running = queries.flag(status::WSREP_CONNECTED).await;
            facts.write_set_ready = queries.flag(status::WSREP_READY).await;
        }
    }

    let row = queries.row(status::THREADS_CONNECTED, "Threads_connected").await?;
    facts.open_connections = Some(status::parse_counter(&row, "Threads_connected")?);

    let row = queries.row(status::THREADS_RUNNING, "Threads_running").await?;
    facts.running_connections = Some(status::parse_counter(&row, "Threads_running")?);

    match mode {
        ReplicationMode::SingleSource => {
            let row = queries.row(status::SLAVE_STATUS, "slave status").await?;
            facts.seconds_behind_primary = Some(status::parse_lag(&row)?);
        }
        ReplicationMode::MultiSourceWriteSet => {
            let row = queries.row(status::WSREP_LOCAL_STATE, "wsrep_local_state").await?;
            facts.write_set_local_state = Some(status::parse_write_set_state(&row)?);
        }
    }

    Ok(())
}

/// Status queries over one connection, traced when enabled.
struct StatusQueries<'a> {
    server: &'a str,
    conn: &'a dyn Connection,
    trace: bool,
}

impl StatusQueries<'_> {
    async fn row(&self, query: &str, variable: &'static str) -> Result<Row, ProbeError> {
        if self.trace {
            tracing::trace!(server = %self.server, query, "status query");
        }
        self.conn
            .query_row(query)
            .await
            .map_err(|source| ProbeError::StatusQuery { variable, source })
    }

    /// A failed flag query only leaves the flag unset.
    async fn flag(&self, query: &str) -> bool {
        match self.row(query, "status flag").await {
            Ok(row) => status::is_on(&row),
            Err(e) => {
                tracing::debug!(server = %self.server, query, error = %e, "Status flag unavailable");
                false
            }
        }
    }
}
