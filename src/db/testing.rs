//! Scripted in-memory driver for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::db::connector::{ConnectError, Connection, Connector, PoolSettings, QueryError, Row, SharedConnection};
use crate::db::status;

#[derive(Default)]
struct Endpoint {
    unreachable: bool,
    connect_delay: Duration,
    answers: HashMap<String, Result<Row, QueryError>>,
    connects: usize,
    closes: usize,
}

/// Connector whose endpoints (keyed by DSN) answer from a script.
#[derive(Default)]
pub(crate) struct ScriptedConnector {
    endpoints: Arc<Mutex<HashMap<String, Endpoint>>>,
    queries: Arc<AtomicUsize>,
}

pub(crate) fn value(v: impl ToString) -> Result<Row, QueryError> {
    Ok(Row::from([(status::VALUE_COLUMN.to_string(), v.to_string())]))
}

impl ScriptedConnector {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_endpoint<R>(&self, dsn: &str, f: impl FnOnce(&mut Endpoint) -> R) -> R {
        let mut endpoints = self.endpoints.lock().unwrap();
        f(endpoints.entry(dsn.to_string()).or_default())
    }

    pub(crate) fn answer(&self, dsn: &str, query: &str, answer: Result<Row, QueryError>) {
        self.with_endpoint(dsn, |e| e.answers.insert(query.to_string(), answer));
    }

    pub(crate) fn set_unreachable(&self, dsn: &str, unreachable: bool) {
        self.with_endpoint(dsn, |e| e.unreachable = unreachable);
    }

    pub(crate) fn set_connect_delay(&self, dsn: &str, delay: Duration) {
        self.with_endpoint(dsn, |e| e.connect_delay = delay);
    }

    /// Script a single-source replica answering every status query.
    pub(crate) fn replica(&self, dsn: &str, lag: u64, connected: u64, running: u64) {
        self.answer(dsn, status::SLAVE_RUNNING, value("ON"));
        self.answer(dsn, status::THREADS_CONNECTED, value(connected));
        self.answer(dsn, status::THREADS_RUNNING, value(running));
        self.answer(
            dsn,
            status::SLAVE_STATUS,
            Ok(Row::from([(status::LAG_COLUMN.to_string(), lag.to_string())])),
        );
    }

    /// Script a write-set cluster node answering every status query.
    pub(crate) fn cluster_node(&self, dsn: &str, ready: bool, state: u32, connected: u64, running: u64) {
        self.answer(dsn, status::WSREP_CONNECTED, value("ON"));
        self.answer(dsn, status::WSREP_READY, value(if ready { "ON" } else { "OFF" }));
        self.answer(dsn, status::THREADS_CONNECTED, value(connected));
        self.answer(dsn, status::THREADS_RUNNING, value(running));
        self.answer(dsn, status::WSREP_LOCAL_STATE, value(state));
    }

    pub(crate) fn connects(&self, dsn: &str) -> usize {
        self.with_endpoint(dsn, |e| e.connects)
    }

    pub(crate) fn closes(&self, dsn: &str) -> usize {
        self.with_endpoint(dsn, |e| e.closes)
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, dsn: &str, _pool: &PoolSettings) -> Result<SharedConnection, ConnectError> {
        let delay = self.with_endpoint(dsn, |e| e.connect_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.with_endpoint(dsn, |e| {
            if e.unreachable {
                return Err(ConnectError::Unreachable(format!("{dsn} refused connection")));
            }
            e.connects += 1;
            Ok(())
        })?;
        Ok(Arc::new(ScriptedConnection {
            dsn: dsn.to_string(),
            endpoints: self.endpoints.clone(),
            queries: self.queries.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct ScriptedConnection {
    dsn: String,
    endpoints: Arc<Mutex<HashMap<String, Endpoint>>>,
    queries: Arc<AtomicUsize>,
    closed: AtomicBool,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn query_row(&self, query: &str) -> Result<Row, QueryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.closed.load(Ordering::SeqCst) {
            return Err(QueryError::Failed("connection closed".into()));
        }
        let endpoints = self.endpoints.lock().unwrap();
        endpoints
            .get(&self.dsn)
            .and_then(|e| e.answers.get(query).cloned())
            .unwrap_or_else(|| Err(QueryError::Failed(format!("unscripted query: {query}"))))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut endpoints = self.endpoints.lock().unwrap();
        if let Some(e) = endpoints.get_mut(&self.dsn) {
            e.closes += 1;
        }
    }

    fn is_usable(&self) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        let endpoints = self.endpoints.lock().unwrap();
        !endpoints.get(&self.dsn).is_some_and(|e| e.unreachable)
    }
}

/// A server whose health is set directly, never probed.
pub(crate) fn stub_server(
    name: &str,
    mode: crate::config::ReplicationMode,
    health: crate::health::HealthSnapshot,
) -> Arc<crate::load_balancer::Server> {
    let config = crate::config::ServerConfig {
        name: name.to_string(),
        dsn: format!("mysql://reader@{name}:3306/app"),
        ..crate::config::ServerConfig::default()
    };
    let server = crate::load_balancer::Server::new(config, mode, ScriptedConnector::new(), false);
    server.health_record().store(health);
    Arc::new(server)
}

/// An up snapshot with the given lag and load.
pub(crate) fn up(lag: Option<u64>, running: Option<u64>, open: Option<u64>) -> crate::health::HealthSnapshot {
    crate::health::HealthSnapshot {
        up: true,
        io_running: true,
        seconds_behind_primary: lag,
        running_connections: running,
        open_connections: open,
        ..crate::health::HealthSnapshot::unprobed()
    }
}
