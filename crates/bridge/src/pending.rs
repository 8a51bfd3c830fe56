//! Pending-approval correlation table

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::trace;

/// A request deferred by the background pending explicit user action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingApproval {
    /// Remembered so the eventual completion push can be logged against the
    /// original intent.
    pub method: String,
}

/// All requests currently waiting on user approval, keyed by correlation id.
///
/// Single-writer, scoped to one content-script instance (one per page).
/// Entries whose approval the user abandons are never removed; that leak is
/// bounded by the page lifetime and session-unique ids.
#[derive(Default)]
pub struct PendingApprovals {
    inner: Mutex<HashMap<String, PendingApproval>>,
}

impl PendingApprovals {
    /// Records a request as awaiting approval.
    ///
    /// Returns the previous entry, if any (ids are session-unique, so a
    /// collision indicates a misbehaving page).
    pub fn insert(&self, id: impl Into<String>, method: impl Into<String>) -> Option<PendingApproval> {
        let id = id.into();
        trace!(target: "bridge", %id, "tracking pending approval");
        self.inner.lock().insert(id, PendingApproval { method: method.into() })
    }

    /// Consumes the entry for `id`, at most once per id.
    pub fn take(&self, id: &str) -> Option<PendingApproval> {
        let entry = self.inner.lock().remove(id);
        if entry.is_some() {
            trace!(target: "bridge", %id, "consumed pending approval");
        }
        entry
    }

    /// Number of approvals still outstanding.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
