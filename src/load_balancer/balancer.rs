//! The balancer: owns the servers, drives probing, answers picks.
//!
//! # Responsibilities
//! - Build one [`Server`] per configured endpoint
//! - Warm up within a bounded time, then probe periodically
//! - Select the best server on demand
//! - Release everything exactly once on close

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

use crate::config::{BalancerConfig, BalancerSettings, ReplicationMode};
use crate::db::Connector;
use crate::lifecycle::scheduler::{probe_all, spawn_periodic_checks};
use crate::lifecycle::warmup::warm_up;
use crate::lifecycle::{CloseSignal, WarmUp};
use crate::load_balancer::{pick_server, Server};
use crate::observability::metrics;

/// Lifecycle state of a [`Balancer`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalancerState {
    /// Built, nothing probed yet.
    Uninitialized = 0,
    /// Startup sweep in progress.
    WarmingUp = 1,
    /// Warmed up, periodic checking active.
    Running = 2,
    /// Warmed up, periodic checking disabled.
    Ready = 3,
    /// Closed; terminal.
    Closed = 4,
}

impl From<u8> for BalancerState {
    fn from(val: u8) -> Self {
        match val {
            1 => BalancerState::WarmingUp,
            2 => BalancerState::Running,
            3 => BalancerState::Ready,
            4 => BalancerState::Closed,
            _ => BalancerState::Uninitialized,
        }
    }
}

/// The running periodic checker and the signal that stops it.
#[derive(Debug)]
struct Checker {
    signal: CloseSignal,
    task: JoinHandle<()>,
}

/// Client-side replica balancer.
///
/// Dropping the balancer stops the periodic checker; connections are only
/// released by [`Balancer::close`].
#[derive(Debug)]
pub struct Balancer {
    servers: Arc<[Arc<Server>]>,
    settings: BalancerSettings,
    state: AtomicU8,
    /// Periodic checker, present while `Running`.
    checker: Mutex<Option<Checker>>,
}

impl Balancer {
    /// Build the servers. Nothing is connected until [`Balancer::start`].
    pub fn new(config: &BalancerConfig, connector: Arc<dyn Connector>) -> Self {
        let settings = config.balancer.clone();
        let servers: Arc<[Arc<Server>]> = config
            .servers
            .iter()
            .map(|server| {
                Arc::new(Server::new(
                    server.clone(),
                    settings.replication_mode,
                    connector.clone(),
                    settings.trace_queries,
                ))
            })
            .collect();

        tracing::info!(
            servers = servers.len(),
            replication_mode = ?settings.replication_mode,
            "Balancer created"
        );

        Self {
            servers,
            settings,
            state: AtomicU8::new(BalancerState::Uninitialized as u8),
            checker: Mutex::new(None),
        }
    }

    /// Build, warm up and (if enabled) start periodic checking.
    pub async fn from_config(config: &BalancerConfig, connector: Arc<dyn Connector>) -> Self {
        let balancer = Self::new(config, connector);
        balancer.start().await;
        balancer
    }

    /// Run the warm-up sweep, then start periodic checking if enabled.
    ///
    /// Returns `None` without doing anything unless the balancer is
    /// `Uninitialized`.
    pub async fn start(&self) -> Option<WarmUp> {
        if self
            .transition(BalancerState::Uninitialized, BalancerState::WarmingUp)
            .is_err()
        {
            tracing::warn!(state = ?self.state(), "Balancer already started");
            return None;
        }

        let outcome = warm_up(self.servers.clone(), self.settings.startup_wait()).await;
        tracing::info!(?outcome, "Warm-up finished");

        let mut checker = self.checker.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.settings.start_check {
            let _ = self.transition(BalancerState::WarmingUp, BalancerState::Ready);
            return Some(outcome);
        }
        if self.transition(BalancerState::WarmingUp, BalancerState::Running).is_ok() {
            let signal = CloseSignal::new();
            let task = spawn_periodic_checks(self.servers.clone(), self.settings.check_interval(), signal.subscribe());
            *checker = Some(Checker { signal, task });
        }
        Some(outcome)
    }

    fn transition(&self, from: BalancerState, to: BalancerState) -> Result<(), BalancerState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(BalancerState::from)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BalancerState {
        BalancerState::from(self.state.load(Ordering::Acquire))
    }

    pub fn settings(&self) -> &BalancerSettings {
        &self.settings
    }

    pub fn replication_mode(&self) -> ReplicationMode {
        self.settings.replication_mode
    }

    /// All servers, in configuration order.
    pub fn servers(&self) -> &[Arc<Server>] {
        &self.servers
    }

    /// Server by name.
    pub fn server(&self, name: &str) -> Option<&Arc<Server>> {
        self.servers.iter().find(|s| s.name() == name)
    }

    /// The best server for the next read, or `None` if every server is down.
    pub fn pick_server(&self) -> Option<Arc<Server>> {
        let picked = pick_server(&self.servers, self.settings.replication_mode);
        match &picked {
            Some(server) => tracing::trace!(server = %server.name(), "Server picked"),
            None => tracing::debug!(servers = self.servers.len(), "No server available"),
        }
        metrics::record_pick(picked.as_deref().map(Server::name));
        picked
    }

    /// Start one probe per server now, without waiting for results.
    pub fn check(&self) {
        probe_all(&self.servers);
    }

    /// Stop periodic checking and release every server's connections.
    ///
    /// Closing an already closed balancer does nothing.
    pub async fn close(&self) {
        let checker = {
            let mut checker = self.checker.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = BalancerState::from(self.state.swap(BalancerState::Closed as u8, Ordering::AcqRel));
            if previous == BalancerState::Closed {
                return;
            }
            checker.take()
        };

        if let Some(Checker { signal, task }) = checker {
            signal.fire();
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Health checker task failed");
            }
        }
        for server in self.servers.iter() {
            server.close().await;
        }
        tracing::info!("Balancer closed");
    }
}
