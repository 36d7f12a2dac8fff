//! Shared utilities for integration testing.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use replica_balancer::config::{BalancerConfig, BalancerSettings, ServerConfig};
use replica_balancer::db::{ConnectError, Connection, Connector, PoolSettings, QueryError, Row, SharedConnection};
use replica_balancer::ReplicationMode;

/// Programmable state of one fake endpoint.
#[derive(Default)]
struct Endpoint {
    down: bool,
    connect_delay: Duration,
    status: HashMap<&'static str, Result<Row, QueryError>>,
    connects: usize,
    closes: usize,
}

/// In-memory stand-in for a MySQL driver, keyed by DSN.
#[derive(Default, Clone)]
pub struct FakeCluster {
    endpoints: Arc<Mutex<HashMap<String, Endpoint>>>,
}

pub fn dsn(name: &str) -> String {
    format!("mysql://reader@{name}:3306/app")
}

fn value(v: impl ToString) -> Result<Row, QueryError> {
    Ok(Row::from([("Value".to_string(), v.to_string())]))
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn edit(&self, name: &str, f: impl FnOnce(&mut Endpoint)) {
        let mut endpoints = self.endpoints.lock().unwrap();
        f(endpoints.entry(dsn(name)).or_default());
    }

    /// A single-source replica; `lag = None` reports a NULL lag.
    pub fn replica(&self, name: &str, lag: Option<u64>, connected: u64, running: u64) {
        self.edit(name, |e| {
            e.status.insert("SHOW STATUS LIKE 'Slave_running'", value("ON"));
            e.status.insert("SHOW STATUS LIKE 'Threads_connected'", value(connected));
            e.status.insert("SHOW STATUS LIKE 'Threads_running'", value(running));
            let lag = lag.map(|l| l.to_string()).unwrap_or_else(|| "NULL".to_string());
            e.status.insert(
                "SHOW SLAVE STATUS",
                Ok(Row::from([("Seconds_Behind_Master".to_string(), lag)])),
            );
        });
    }

    /// A write-set cluster node.
    pub fn node(&self, name: &str, ready: bool, state: u32, running: u64) {
        self.edit(name, |e| {
            e.status.insert("SHOW STATUS LIKE 'wsrep_connected'", value("ON"));
            e.status.insert("SHOW STATUS LIKE 'wsrep_ready'", value(if ready { "ON" } else { "OFF" }));
            e.status.insert("SHOW STATUS LIKE 'Threads_connected'", value(running * 2));
            e.status.insert("SHOW STATUS LIKE 'Threads_running'", value(running));
            e.status.insert("SHOW STATUS LIKE 'wsrep_local_state'", value(state));
        });
    }

    pub fn fail_query(&self, name: &str, query: &'static str) {
        self.edit(name, |e| {
            e.status.insert(query, Err(QueryError::Failed("Lost connection to server".into())));
        });
    }

    pub fn set_down(&self, name: &str, down: bool) {
        self.edit(name, |e| e.down = down);
    }

    pub fn set_connect_delay(&self, name: &str, delay: Duration) {
        self.edit(name, |e| e.connect_delay = delay);
    }

    pub fn connects(&self, name: &str) -> usize {
        self.endpoints.lock().unwrap().get(&dsn(name)).map_or(0, |e| e.connects)
    }

    pub fn closes(&self, name: &str) -> usize {
        self.endpoints.lock().unwrap().get(&dsn(name)).map_or(0, |e| e.closes)
    }
}

#[async_trait]
impl Connector for FakeCluster {
    async fn connect(&self, dsn: &str, _pool: &PoolSettings) -> Result<SharedConnection, ConnectError> {
        let delay = self.endpoints.lock().unwrap().get(dsn).map_or(Duration::ZERO, |e| e.connect_delay);
        tokio::time::sleep(delay).await;

        let mut endpoints = self.endpoints.lock().unwrap();
        let endpoint = endpoints.entry(dsn.to_string()).or_default();
        if endpoint.down {
            return Err(ConnectError::Unreachable("Can't connect to MySQL server".into()));
        }
        endpoint.connects += 1;
        Ok(Arc::new(FakeConnection {
            dsn: dsn.to_string(),
            cluster: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct FakeConnection {
    dsn: String,
    cluster: FakeCluster,
    closed: AtomicBool,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn query_row(&self, query: &str) -> Result<Row, QueryError> {
        let endpoints = self.cluster.endpoints.lock().unwrap();
        endpoints
            .get(&self.dsn)
            .and_then(|e| e.status.get(query).cloned())
            .unwrap_or(Err(QueryError::NoRows))
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let mut endpoints = self.cluster.endpoints.lock().unwrap();
            if let Some(e) = endpoints.get_mut(&self.dsn) {
                e.closes += 1;
            }
        }
    }

    fn is_usable(&self) -> bool {
        let down = self.cluster.endpoints.lock().unwrap().get(&self.dsn).is_some_and(|e| e.down);
        !down && !self.closed.load(Ordering::SeqCst)
    }
}

/// Configuration for `names`, probing every second after warm-up.
pub fn config(mode: ReplicationMode, names: &[&str]) -> BalancerConfig {
    BalancerConfig {
        balancer: BalancerSettings {
            replication_mode: mode,
            check_interval_secs: 1,
            startup_wait_secs: 2,
            start_check: true,
            trace_queries: false,
        },
        servers: names
            .iter()
            .map(|name| ServerConfig {
                name: name.to_string(),
                dsn: dsn(name),
                ..ServerConfig::default()
            })
            .collect(),
        ..BalancerConfig::default()
    }
}
