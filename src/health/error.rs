//! Probe failure taxonomy.

use thiserror::Error;

use crate::db::{ConnectError, QueryError};

/// Why the last probe of a server did not complete cleanly.
///
/// Recorded in the health snapshot; never returned to callers of a probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The primary read role could not be reached. The server is down.
    #[error("could not connect to primary role: {0}")]
    ConnectPrimary(ConnectError),

    /// The status role could not be reached. The server stays up, unranked.
    #[error("could not connect to status role: {0}")]
    ConnectStatus(ConnectError),

    /// A status query failed.
    #[error("failed acquiring {variable}: {source}")]
    StatusQuery {
        variable: &'static str,
        #[source]
        source: QueryError,
    },

    /// A status query answered something that is not a number.
    #[error("unexpected value for {variable}: {value:?}")]
    InvalidValue { variable: &'static str, value: String },

    /// The replica reported an empty or NULL lag.
    #[error("empty or null value for Seconds_Behind_Master")]
    MissingLag,

    /// The server was closed; no new connection is opened.
    #[error("server is closed")]
    Closed,
}

impl ProbeError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::ConnectPrimary(_) => "connect_primary",
            ProbeError::ConnectStatus(_) => "connect_status",
            ProbeError::StatusQuery { .. } => "status_query",
            ProbeError::InvalidValue { .. } => "invalid_value",
            ProbeError::MissingLag => "missing_lag",
            ProbeError::Closed => "closed",
        }
    }
}
