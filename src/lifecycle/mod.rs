//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Balancer::start
//!     → warmup.rs (sequential sweep raced against the startup deadline)
//!     → scheduler.rs (periodic fan-out, if enabled)
//!
//! Balancer::close
//!     → close.rs (stop the periodic checker)
//!     → close every server's connections
//! ```
//!
//! # Design Decisions
//! - The balancer is usable within the startup deadline even if servers hang
//! - Probes already running are never interrupted, only abandoned
//! - Closing twice is a no-op

pub mod close;
pub mod scheduler;
pub mod warmup;

pub use close::CloseSignal;
pub use warmup::WarmUp;
