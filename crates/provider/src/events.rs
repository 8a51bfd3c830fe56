//! Minimal per-instance event emitter
//!
//! Keyed by event name, used for `chainChanged`, `accountsChanged`,
//! `connect` and `disconnect`. Listeners are plain callbacks; the emitter is
//! instance state of the provider, never shared across providers.

use parking_lot::Mutex;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::trace;

/// A registered event callback.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync + 'static>;

/// Handle for removing a previously registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<HashMap<String, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    /// Registers a listener for `event`.
    pub fn on(&self, event: impl Into<String>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().entry(event.into()).or_default().push((id, listener));
        id
    }

    /// Removes a single listener, returns whether it was registered.
    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(entries) = listeners.get_mut(event) else { return false };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Removes all listeners for `event`, or every listener if `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut listeners = self.listeners.lock();
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
    }

    /// Invokes all listeners registered for `event`.
    pub fn emit(&self, event: &str, data: &Value) {
        // clone the callbacks out so a listener may (un)register reentrantly
        let callbacks: Vec<Listener> = self
            .listeners
            .lock()
            .get(event)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        trace!(target: "provider", event, listeners = callbacks.len(), "emitting event");
        for callback in callbacks {
            callback(data);
        }
    }
}
