//! Status queries issued by a probe and the parsing of their answers.

use crate::db::connector::Row;
use crate::health::ProbeError;

/// Replication IO thread state (single-source).
pub const SLAVE_RUNNING: &str = "SHOW STATUS LIKE 'Slave_running'";
/// Cluster link state (multi-source).
pub const WSREP_CONNECTED: &str = "SHOW STATUS LIKE 'wsrep_connected'";
/// Whether the node accepts write-set transactions (multi-source).
pub const WSREP_READY: &str = "SHOW STATUS LIKE 'wsrep_ready'";
/// Total connected sessions.
pub const THREADS_CONNECTED: &str = "SHOW STATUS LIKE 'Threads_connected'";
/// Sessions that are not sleeping.
pub const THREADS_RUNNING: &str = "SHOW STATUS LIKE 'Threads_running'";
/// Cluster membership state code (multi-source).
pub const WSREP_LOCAL_STATE: &str = "SHOW STATUS LIKE 'wsrep_local_state'";
/// Replica status row carrying the lag column.
pub const SLAVE_STATUS: &str = "SHOW SLAVE STATUS";

/// Column holding the answer of `SHOW STATUS LIKE ...`.
pub const VALUE_COLUMN: &str = "Value";
/// Lag column of `SHOW SLAVE STATUS`.
pub const LAG_COLUMN: &str = "Seconds_Behind_Master";

/// `wsrep_local_state` value of a node that is synced with the cluster.
pub const WSREP_STATE_SYNCED: u32 = 4;

/// Value of `column`, empty when the driver returned NULL or omitted it.
pub fn column<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Interpret a status flag. Only a case-insensitive `ON` counts as set.
pub fn is_on(row: &Row) -> bool {
    column(row, VALUE_COLUMN).trim().eq_ignore_ascii_case("ON")
}

/// Parse the `Value` column of a status row as a non-negative counter.
pub fn parse_counter(row: &Row, variable: &'static str) -> Result<u64, ProbeError> {
    let raw = column(row, VALUE_COLUMN).trim();
    raw.parse::<u64>().map_err(|_| ProbeError::InvalidValue {
        variable,
        value: raw.to_string(),
    })
}

/// Parse the `wsrep_local_state` code.
pub fn parse_write_set_state(row: &Row) -> Result<u32, ProbeError> {
    let raw = column(row, VALUE_COLUMN).trim();
    raw.parse::<u32>().map_err(|_| ProbeError::InvalidValue {
        variable: "wsrep_local_state",
        value: raw.to_string(),
    })
}

/// Parse replication lag from a `SHOW SLAVE STATUS` row.
///
/// An empty value or a literal `null` means the replica does not know its
/// lag (typically the SQL thread is stopped).
pub fn parse_lag(row: &Row) -> Result<u64, ProbeError> {
    let raw = column(row, LAG_COLUMN).trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Err(ProbeError::MissingLag);
    }
    raw.parse::<u64>().map_err(|_| ProbeError::InvalidValue {
        variable: LAG_COLUMN,
        value: raw.to_string(),
    })
}
