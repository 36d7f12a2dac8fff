//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → Balancer::new (servers built once, never added or removed)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the server list is fixed for the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AdminConfig, BalancerConfig, BalancerSettings, ObservabilityConfig, ReplicationMode, ServerConfig};
pub use validation::ValidationError;
