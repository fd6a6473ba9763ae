//! Command correlation: ID allocation and pending-reply slots.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

const FIRST_ID: u64 = 1;

/// Tracks outbound commands awaiting their reply frame.
///
/// IDs increase monotonically and are never reused while a connection is
/// open; [`CommandCorrelator::reset`] rewinds the counter when the
/// connection tears down. Each pending entry holds the single-assignment
/// slot the sender is suspended on; dropping an entry without resolving it
/// fails the waiter fast.
pub(crate) struct CommandCorrelator {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, oneshot::Sender<Value>>>,
}

impl CommandCorrelator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(FIRST_ID),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate the next command ID and register its reply slot.
    pub fn register(&self) -> (u64, oneshot::Receiver<Value>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        (id, rx)
    }

    /// Resolve a pending command with its reply frame.
    ///
    /// Returns `false` when no command with that ID is in flight (timed
    /// out, already resolved, or never ours) — such replies are ignored.
    pub fn resolve(&self, id: u64, reply: Value) -> bool {
        match self.pending.lock().remove(&id) {
            Some(slot) => {
                // The waiter may have timed out between lookup and send.
                let _ = slot.send(reply);
                true
            }
            None => false,
        }
    }

    /// Drop a pending entry without resolving it (timeout path).
    pub fn forget(&self, id: u64) -> bool {
        self.pending.lock().remove(&id).is_some()
    }

    /// Connection teardown: drop every pending slot and rewind the counter.
    pub fn reset(&self) {
        self.pending.lock().clear();
        self.next_id.store(FIRST_ID, Ordering::Relaxed);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}
