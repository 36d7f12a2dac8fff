//! Load ordering used to break ties between equally fresh servers.

use std::cmp::Ordering;

use crate::health::HealthSnapshot;

/// Order two optional values ascending, with unknown after every known value.
pub fn compare_known_first(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fewer running sessions first, then fewer open sessions.
pub fn compare_load(a: &HealthSnapshot, b: &HealthSnapshot) -> Ordering {
    compare_known_first(a.running_connections, b.running_connections)
        .then_with(|| compare_known_first(a.open_connections, b.open_connections))
}
