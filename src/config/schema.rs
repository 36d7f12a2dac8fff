//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::PoolSettings;

/// Interval used when `check_interval_secs` is unset or zero.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(3);

/// Warm-up deadline used when `startup_wait_secs` is unset or zero.
pub const DEFAULT_STARTUP_WAIT: Duration = Duration::from_secs(5);

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Scheduling and replication settings.
    pub balancer: BalancerSettings,

    /// Replicas, in routing-preference order for full ties.
    pub servers: Vec<ServerConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin endpoint settings.
    pub admin: AdminConfig,
}

/// How replicas receive writes; decides what "fresh" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationMode {
    /// One primary streams asynchronously to replicas; freshness is lag.
    #[default]
    SingleSource,
    /// Write-set (Galera-style) cluster; freshness is readiness plus sync state.
    MultiSourceWriteSet,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerSettings {
    /// Replication topology of every configured server.
    pub replication_mode: ReplicationMode,

    /// Seconds between periodic probe rounds (0 = default of 3).
    pub check_interval_secs: u64,

    /// Seconds the warm-up sweep may take (0 = default of 5).
    pub startup_wait_secs: u64,

    /// Keep probing periodically after warm-up.
    pub start_check: bool,

    /// Trace every status query.
    pub trace_queries: bool,
}

impl Default for BalancerSettings {
    fn default() -> Self {
        Self {
            replication_mode: ReplicationMode::SingleSource,
            check_interval_secs: 3,
            startup_wait_secs: 5,
            start_check: true,
            trace_queries: false,
        }
    }
}

impl BalancerSettings {
    /// Effective periodic interval.
    pub fn check_interval(&self) -> Duration {
        match self.check_interval_secs {
            0 => DEFAULT_CHECK_INTERVAL,
            secs => Duration::from_secs(secs),
        }
    }

    /// Effective warm-up deadline.
    pub fn startup_wait(&self) -> Duration {
        match self.startup_wait_secs {
            0 => DEFAULT_STARTUP_WAIT,
            secs => Duration::from_secs(secs),
        }
    }
}

/// One replica endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Unique server name used in logs, metrics and the admin API.
    pub name: String,

    /// Connection string of the read role.
    pub dsn: String,

    /// Connection string of the status role. Status queries go over the
    /// read role when absent.
    pub replication_dsn: Option<String>,

    /// Maximum idle connections in each pool (default 2).
    pub max_idle_conns: u32,

    /// Maximum open connections in each pool (0 = unbounded).
    pub max_open_conns: u32,

    /// Maximum lifetime of pooled connections in seconds (0 = forever).
    pub max_lifetime_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let pool = PoolSettings::default();
        Self {
            name: String::new(),
            dsn: String::new(),
            replication_dsn: None,
            max_idle_conns: pool.max_idle_conns,
            max_open_conns: pool.max_open_conns,
            max_lifetime_secs: pool.max_lifetime_secs,
        }
    }
}

impl ServerConfig {
    /// Pool settings handed to the connector.
    pub fn pool(&self) -> PoolSettings {
        PoolSettings {
            max_idle_conns: self.max_idle_conns,
            max_open_conns: self.max_open_conns,
            max_lifetime_secs: self.max_lifetime_secs,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin endpoint.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin endpoint bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
