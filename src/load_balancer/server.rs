//! Server abstraction.
//!
//! # Responsibilities
//! - Represent one configured replica
//! - Own its health record and its lazily opened connection handles
//! - Run probes against itself, never two at a time

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

use crate::config::{ReplicationMode, ServerConfig};
use crate::db::{ConnectError, Connector, PoolSettings, SharedConnection};
use crate::health::probe::{self, ProbeGuard};
use crate::health::{HealthRecord, HealthSnapshot, ProbeError};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Primary,
    Status,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Status => "status",
        }
    }

    fn error(self, e: ConnectError) -> ProbeError {
        match self {
            Role::Primary => ProbeError::ConnectPrimary(e),
            Role::Status => ProbeError::ConnectStatus(e),
        }
    }
}

/// One connection handle per role, opened at most once at a time.
struct ConnectionSlot {
    role: Role,
    dsn: String,
    current: RwLock<Option<SharedConnection>>,
    opening: Mutex<()>,
}

impl ConnectionSlot {
    fn new(role: Role, dsn: String) -> Self {
        Self {
            role,
            dsn,
            current: RwLock::new(None),
            opening: Mutex::new(()),
        }
    }

    fn get(&self) -> Option<SharedConnection> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn usable(&self) -> Option<SharedConnection> {
        self.get().filter(|conn| conn.is_usable())
    }

    fn set(&self, conn: SharedConnection) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(conn);
    }

    fn take(&self) -> Option<SharedConnection> {
        self.current.write().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// A single replica.
pub struct Server {
    name: String,
    config: ServerConfig,
    pool: PoolSettings,
    mode: ReplicationMode,
    trace_queries: bool,
    health: HealthRecord,
    connector: Arc<dyn Connector>,
    primary: ConnectionSlot,
    /// `None` when status queries share the primary handle.
    status: Option<ConnectionSlot>,
    probing: AtomicBool,
    closed: AtomicBool,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("health", &self.health.snapshot())
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Create a server. Nothing is connected until the first probe.
    pub fn new(
        config: ServerConfig,
        mode: ReplicationMode,
        connector: Arc<dyn Connector>,
        trace_queries: bool,
    ) -> Self {
        let primary = ConnectionSlot::new(Role::Primary, config.dsn.clone());
        let status = config
            .replication_dsn
            .clone()
            .map(|dsn| ConnectionSlot::new(Role::Status, dsn));
        Self {
            name: config.name.clone(),
            pool: config.pool(),
            config,
            mode,
            trace_queries,
            health: HealthRecord::new(),
            connector,
            primary,
            status,
            probing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Server name from configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the server was built from.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn replication_mode(&self) -> ReplicationMode {
        self.mode
    }

    pub(crate) fn trace_queries(&self) -> bool {
        self.trace_queries
    }

    /// Current health snapshot.
    pub fn health(&self) -> Arc<HealthSnapshot> {
        self.health.snapshot()
    }

    pub fn health_record(&self) -> &HealthRecord {
        &self.health
    }

    /// Handle of the read role, for the caller's own queries.
    /// `None` until a probe has connected, and again after close.
    pub fn connection(&self) -> Option<SharedConnection> {
        self.primary.get()
    }

    /// Whether a probe is in flight.
    pub fn is_probing(&self) -> bool {
        self.probing.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Probe the server and publish a new health snapshot.
    ///
    /// Returns `false` without touching the health record if a probe of
    /// this server is already running.
    pub async fn probe(&self) -> bool {
        let Some(_guard) = ProbeGuard::acquire(&self.probing) else {
            tracing::debug!(server = %self.name, "Probe already running, skipping");
            return false;
        };

        let mut snapshot = probe::collect(self).await;
        if self.is_closed() && snapshot.up {
            snapshot = HealthSnapshot::down(ProbeError::Closed);
        }
        self.log_transition(&self.health.snapshot(), &snapshot);
        metrics::record_probe(&self.name, &snapshot);
        self.health.store(snapshot);

        // Close may land between the check above and the store.
        if self.is_closed() && self.health.is_up() {
            self.health.store(HealthSnapshot::down(ProbeError::Closed));
        }
        true
    }

    fn log_transition(&self, previous: &HealthSnapshot, current: &HealthSnapshot) {
        match (&current.last_error, current.up) {
            (Some(e), false) if previous.up => {
                tracing::warn!(server = %self.name, error = %e, "Server marked down");
            }
            (Some(e), false) => {
                tracing::debug!(server = %self.name, error = %e, "Server still down");
            }
            (Some(e), true) => {
                tracing::warn!(server = %self.name, error = %e, "Server up but degraded");
            }
            (None, _) if !previous.up => {
                tracing::info!(
                    server = %self.name,
                    seconds_behind_primary = ?current.seconds_behind_primary,
                    "Server marked up"
                );
            }
            (None, _) => {
                tracing::trace!(
                    server = %self.name,
                    seconds_behind_primary = ?current.seconds_behind_primary,
                    running_connections = ?current.running_connections,
                    "Server healthy"
                );
            }
        }
    }

    /// Handle of the read role, opened on first use.
    pub(crate) async fn primary_connection(&self) -> Result<SharedConnection, ProbeError> {
        self.open(&self.primary).await
    }

    /// Handle for status queries; the read role's handle when no
    /// replication DSN is configured.
    pub(crate) async fn status_connection(
        &self,
        primary: &SharedConnection,
    ) -> Result<SharedConnection, ProbeError> {
        match &self.status {
            Some(slot) => self.open(slot).await,
            None => Ok(primary.clone()),
        }
    }

    async fn open(&self, slot: &ConnectionSlot) -> Result<SharedConnection, ProbeError> {
        if self.is_closed() {
            return Err(ProbeError::Closed);
        }
        if let Some(conn) = slot.usable() {
            return Ok(conn);
        }

        let _opening = slot.opening.lock().await;
        if self.is_closed() {
            return Err(ProbeError::Closed);
        }
        if let Some(conn) = slot.usable() {
            return Ok(conn);
        }
        if let Some(stale) = slot.take() {
            tracing::debug!(server = %self.name, role = slot.role.label(), "Replacing unusable connection");
            stale.close().await;
        }

        let conn = self
            .connector
            .connect(&slot.dsn, &self.pool)
            .await
            .map_err(|e| slot.role.error(e))?;
        slot.set(conn.clone());

        // Closed while connecting: the handle must not outlive the server.
        if self.is_closed() {
            if let Some(conn) = slot.take() {
                conn.close().await;
                tracing::debug!(server = %self.name, role = slot.role.label(), "Connection closed after close");
            }
            return Err(ProbeError::Closed);
        }
        tracing::debug!(server = %self.name, role = slot.role.label(), "Connection opened");
        Ok(conn)
    }

    /// Release every owned connection. Later probes fail with
    /// [`ProbeError::Closed`]; calling this again releases nothing.
    ///
    /// Never waits for a connection still being opened; that probe closes
    /// its own handle once the connect returns.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        for slot in std::iter::once(&self.primary).chain(self.status.iter()) {
            if let Some(conn) = slot.take() {
                conn.close().await;
                tracing::debug!(server = %self.name, role = slot.role.label(), "Connection closed");
            }
        }
    }
}
