//! Stream-name to callback fan-out table.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::StreamCallback;

/// Outcome of removing a callback from a stream entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    /// Stream unknown or callback not registered; nothing changed.
    NotFound,
    /// Callback removed, other listeners remain on the stream.
    Remaining,
    /// Last callback removed; the entry is gone and the server-side
    /// subscription should be dropped.
    Last,
}

/// Maps stream names to their registered callbacks.
///
/// Entries only exist with a non-empty callback list; the entry is created
/// after the server confirms the subscription and removed when the last
/// callback unregisters or the connection tears down. Callback identity is
/// pointer identity of the `Arc`.
pub(crate) struct SubscriptionRegistry {
    streams: Mutex<HashMap<String, Vec<StreamCallback>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Append to an existing entry. Returns `false` when the stream has no
    /// entry yet, in which case the caller must subscribe server-side first.
    pub fn append_if_present(&self, stream: &str, callback: &StreamCallback) -> bool {
        match self.streams.lock().get_mut(stream) {
            Some(list) => {
                list.push(Arc::clone(callback));
                true
            }
            None => false,
        }
    }

    /// Register a callback, creating the entry if needed.
    pub fn insert(&self, stream: &str, callback: StreamCallback) {
        self.streams
            .lock()
            .entry(stream.to_string())
            .or_default()
            .push(callback);
    }

    pub fn remove(&self, stream: &str, callback: &StreamCallback) -> Removal {
        let mut streams = self.streams.lock();
        let Some(list) = streams.get_mut(stream) else {
            return Removal::NotFound;
        };
        let before = list.len();
        list.retain(|existing| !Arc::ptr_eq(existing, callback));
        if list.len() == before {
            return Removal::NotFound;
        }
        if list.is_empty() {
            streams.remove(stream);
            Removal::Last
        } else {
            Removal::Remaining
        }
    }

    /// Snapshot the callbacks registered for a stream.
    pub fn callbacks_for(&self, stream: &str) -> Vec<StreamCallback> {
        self.streams
            .lock()
            .get(stream)
            .map(|list| list.to_vec())
            .unwrap_or_default()
    }

    /// Remove every entry, returning the stream names that were registered.
    pub fn drain(&self) -> Vec<String> {
        self.streams.lock().drain().map(|(stream, _)| stream).collect()
    }

    pub fn clear(&self) {
        self.streams.lock().clear();
    }

    pub fn contains(&self, stream: &str) -> bool {
        self.streams.lock().contains_key(stream)
    }

    pub fn stream_count(&self) -> usize {
        self.streams.lock().len()
    }
}
