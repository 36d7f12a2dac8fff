//! Client-side load balancer for replicated MySQL-compatible servers.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────────────┐
//!                 │                       BALANCER                         │
//!                 │                                                        │
//!                 │  ┌────────────┐  tick   ┌──────────┐  probe ┌────────┐ │
//!                 │  │ lifecycle  │────────▶│  server  │───────▶│ health │ │
//!                 │  │warm-up/tick│         │ (guarded)│        │ probe  │ │
//!                 │  └────────────┘         └────┬─────┘        └───┬────┘ │
//!                 │                              │ owns             │      │
//!                 │                              ▼                  ▼      │
//!   pick_server() │  ┌────────────┐  snapshot ┌────────┐  query ┌──────┐   │
//!   ─────────────▶│  │ selection  │◀──────────│ health │        │  db  │───┼──▶ replicas
//!   ◀─────────────│  │lag/ws/load │           │ record │        │trait │   │
//!                 │  └────────────┘           └────────┘        └──────┘   │
//!                 │                                                        │
//!                 │   config · observability (tracing, metrics) · admin    │
//!                 └────────────────────────────────────────────────────────┘
//! ```
//!
//! The database driver is supplied by the application through
//! [`db::Connector`]; this crate never issues writes and never retries
//! application queries. It only decides which server to use next.

// Core subsystems
pub mod config;
pub mod db;
pub mod health;
pub mod load_balancer;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::{BalancerConfig, ReplicationMode};
pub use health::{HealthSnapshot, ProbeError};
pub use load_balancer::{Balancer, BalancerState, Server};
