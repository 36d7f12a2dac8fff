//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler (lifecycle/) or caller
//!     → Server::probe (reentrancy guard, at most one run per server)
//!     → probe.rs (connect roles, run status queries in order)
//!     → state.rs (publish one complete snapshot)
//!
//! Selection (load_balancer/)
//!     → state.rs (load the current snapshot, never a partial one)
//! ```
//!
//! # Design Decisions
//! - Only a failed primary connection marks a server down
//! - Monitoring failures degrade a server but keep it routable
//! - Facts gathered before a failing step are kept
//! - Snapshots are swapped whole; readers never lock

pub mod error;
pub mod probe;
pub mod state;

pub use error::ProbeError;
pub use state::{HealthRecord, HealthSnapshot};
