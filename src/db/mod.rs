//! Database collaborator interface.
//!
//! # Data Flow
//! ```text
//! Server (load_balancer/server.rs)
//!     → connector.rs (open pooled handle per role, lazily)
//!     → Connection::query_row (one status query, first row only)
//!     → status.rs (interpret the row: flags, counters, lag)
//!     → health/probe.rs (fold facts into a snapshot)
//! ```
//!
//! # Design Decisions
//! - The driver itself lives outside this crate; only the trait seam is defined here
//! - Rows are column-name → string maps, mirroring the text protocol
//! - "No rows" is a distinct error so an unconfigured replica is recognisable

pub mod connector;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use connector::{ConnectError, Connection, Connector, PoolSettings, QueryError, Row, SharedConnection};
