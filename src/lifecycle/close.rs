//! One-shot close signal for background probing.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Signal that stops the periodic checker.
///
/// Firing is idempotent; only the first call reaches subscribers. Dropping
/// the signal also ends every subscriber's wait.
#[derive(Debug)]
pub struct CloseSignal {
    tx: broadcast::Sender<()>,
    fired: AtomicBool,
}

impl CloseSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            fired: AtomicBool::new(false),
        }
    }

    /// Receiver completing once the signal fires or is dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. Returns `false` if it had already fired.
    pub fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _ = self.tx.send(());
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Default for CloseSignal {
    fn default() -> Self {
        Self::new()
    }
}
