//! # FUN Wallet Content-Script Bridge
//!
//! The trusted relay between an untrusted page and the extension's
//! background wallet core. Every message crossing the page/extension
//! boundary passes through it exactly once in each direction:
//!
//! 1. the inpage provider posts a correlated request onto the page bus
//! 2. the bridge validates it and forwards `{id, method, params, origin}`
//!    over the extension's internal transport
//! 3. the background replies immediately, or, for approval-gated methods,
//!    signals "user approval required" and pushes the real outcome later
//! 4. the bridge posts exactly one terminal message per request id back to
//!    the page, and re-emits wallet events (`chainChanged`,
//!    `accountsChanged`, `connect`, `disconnect`)
//!
//! The bridge holds no keys and never interprets request params; it owns the
//! [`PendingApprovals`] correlation table and all boundary normalization
//! (error shapes, transaction-hash validation, disconnect payloads).

mod bridge;
mod inject;
mod pending;
mod transport;

pub use bridge::{ContentBridge, is_approval_gated};
pub use pending::{PendingApproval, PendingApprovals};
pub use transport::{BackgroundPush, BackgroundTransport, RelayedRequest, TransportError};
