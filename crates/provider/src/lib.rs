//! # FUN Wallet Inpage Provider
//!
//! The wallet object a DApp talks to, following:
//! - [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193): Ethereum Provider JavaScript API
//! - [EIP-6963](https://eips.ethereum.org/EIPS/eip-6963): Multi Injected Provider Discovery
//!
//! ## Architecture
//!
//! The provider runs in the page context and holds no secrets. Every call is
//! posted as a correlated request onto the page bus and answered by the
//! content-script bridge:
//! 1. `request()` registers a pending entry keyed by a fresh correlation id
//! 2. the message crosses the bus to the bridge and on to the wallet core
//! 3. a matching response resolves the entry, or a timeout rejects it
//! 4. wallet events (`chainChanged`, `accountsChanged`, ...) mutate the
//!    provider's advisory state and re-emit to DApp listeners
//!
//! The provider is an explicitly constructed object with instance state, not
//! a module-level singleton, so it can be exercised against an in-memory bus.

mod announce;
mod events;
mod provider;

pub use announce::{ANNOUNCE_RETRY_DELAYS, Announcer};
pub use events::{EventEmitter, Listener, ListenerId};
pub use provider::{EthereumProvider, ProviderConfig, ProviderState};

use funwallet_rpc::PageBus;
use std::sync::Arc;
use tokio::{sync::oneshot, task::JoinHandle};

/// Everything a completed provider installation hands back to its owner.
pub struct Injection {
    /// The live provider, already listening on the bus.
    pub provider: EthereumProvider,
    /// Fire this once the page's DOM is ready; the announcer re-announces on
    /// it for DApps that attach their discovery listener late.
    pub dom_ready: oneshot::Sender<()>,
    /// The discovery announcer task.
    pub announcer: JoinHandle<()>,
}

/// Installs the provider on the page bus and starts the discovery announcer.
pub fn install(bus: Arc<dyn PageBus>, config: ProviderConfig) -> Injection {
    let provider = EthereumProvider::attach(Arc::clone(&bus), config);
    let (dom_tx, dom_rx) = oneshot::channel();
    let announcer = Announcer::new(bus).spawn(dom_rx);
    Injection { provider, dom_ready: dom_tx, announcer }
}
