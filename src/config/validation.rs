//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check server identity (names present and unique)
//! - Check connection strings parse
//! - Check pool sizing is consistent
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::schema::BalancerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no servers configured")]
    NoServers,

    #[error("server #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("server name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("server '{server}' has an invalid {field}: {reason}")]
    InvalidDsn {
        server: String,
        field: &'static str,
        reason: String,
    },

    #[error("server '{server}' allows {idle} idle connections but only {open} open")]
    PoolSizing { server: String, idle: u32, open: u32 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    let mut seen = HashSet::new();
    for (index, server) in config.servers.iter().enumerate() {
        if server.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(server.name.as_str()) {
            errors.push(ValidationError::DuplicateName(server.name.clone()));
        }

        if let Err(reason) = check_dsn(&server.dsn) {
            errors.push(ValidationError::InvalidDsn {
                server: server.name.clone(),
                field: "dsn",
                reason,
            });
        }
        if let Some(dsn) = &server.replication_dsn {
            if let Err(reason) = check_dsn(dsn) {
                errors.push(ValidationError::InvalidDsn {
                    server: server.name.clone(),
                    field: "replication_dsn",
                    reason,
                });
            }
        }

        if server.max_open_conns > 0 && server.max_idle_conns > server.max_open_conns {
            errors.push(ValidationError::PoolSizing {
                server: server.name.clone(),
                idle: server.max_idle_conns,
                open: server.max_open_conns,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_dsn(dsn: &str) -> Result<(), String> {
    let url = Url::parse(dsn).map_err(|e| e.to_string())?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
