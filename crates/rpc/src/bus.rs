//! The page message bus seam
//!
//! Page and content script share one `postMessage` bus: every message posted
//! is visible to every listener, including the poster's own. Direction tags
//! on the messages themselves keep the two sides from reading their own
//! output, see [`crate::Direction`].

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// A structured-clone message bus with `window.postMessage` semantics.
///
/// Implementations fan every posted message out to all current subscribers.
/// Injected as a seam so protocol logic is testable without a page
/// environment.
pub trait PageBus: Send + Sync + 'static {
    /// Posts a message to every subscriber.
    fn post(&self, msg: Value);

    /// Subscribes to all subsequently posted messages.
    fn subscribe(&self) -> UnboundedReceiver<Value>;
}

/// In-process [`PageBus`] used by the bridge, the provider, and tests.
#[derive(Default)]
pub struct InMemoryBus {
    subscribers: Mutex<Vec<UnboundedSender<Value>>>,
}

impl InMemoryBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl PageBus for InMemoryBus {
    fn post(&self, msg: Value) {
        // drop subscribers whose receiver is gone
        self.subscribers.lock().retain(|tx| tx.unbounded_send(msg.clone()).is_ok());
    }

    fn subscribe(&self) -> UnboundedReceiver<Value> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }
}

impl<T: PageBus + ?Sized> PageBus for Arc<T> {
    fn post(&self, msg: Value) {
        (**self).post(msg)
    }

    fn subscribe(&self) -> UnboundedReceiver<Value> {
        (**self).subscribe()
    }
}
