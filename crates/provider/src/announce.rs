//! EIP-6963 discovery announcer
//!
//! A single announcement is not reliable: DApps often attach their discovery
//! listener asynchronously after the provider's first broadcast. The
//! announcer therefore re-broadcasts on a fixed schedule (immediately, after
//! DOM-ready, and at 100/500/1000 ms) and again whenever a page asks who
//! provides wallets. The delay values are a compatibility contract with
//! wallet-selection UIs, not tunables.

use funwallet_rpc::{PageBus, ProviderAnnouncement, ProviderInfo, is_request_provider};
use futures::StreamExt;
use std::{collections::VecDeque, sync::Arc, time::Duration};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::trace;

/// Re-announcement delays, measured from announcer start.
pub const ANNOUNCE_RETRY_DELAYS: [Duration; 3] =
    [Duration::from_millis(100), Duration::from_millis(500), Duration::from_millis(1000)];

/// Broadcasts this wallet's identity onto the page bus.
pub struct Announcer {
    bus: Arc<dyn PageBus>,
    info: ProviderInfo,
}

impl Announcer {
    pub fn new(bus: Arc<dyn PageBus>) -> Self {
        Self { bus, info: ProviderInfo::fun_wallet() }
    }

    /// Posts one announcement. The identity is identical across every
    /// announcement within a page load.
    pub fn announce(&self) {
        trace!(target: "provider::announce", uuid = %self.info.uuid, "announcing provider");
        self.bus.post(ProviderAnnouncement::new(self.info.clone()).to_value());
    }

    /// Runs the announcement schedule; `dom_ready` triggers the post-DOM
    /// re-announcement. The task keeps answering `requestProvider` messages
    /// until the bus closes.
    pub fn spawn(self, dom_ready: oneshot::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(dom_ready))
    }

    async fn run(self, mut dom_ready: oneshot::Receiver<()>) {
        let mut inbound = self.bus.subscribe().fuse();

        // immediate broadcast
        self.announce();

        let start = Instant::now();
        let mut deadlines: VecDeque<Instant> =
            ANNOUNCE_RETRY_DELAYS.iter().map(|delay| start + *delay).collect();
        let mut dom_pending = true;

        loop {
            let next = deadlines.front().copied();
            tokio::select! {
                res = &mut dom_ready, if dom_pending => {
                    dom_pending = false;
                    if res.is_ok() {
                        self.announce();
                    }
                    // sender dropped: page never signaled DOM-ready, skip
                }
                _ = maybe_sleep_until(next), if next.is_some() => {
                    deadlines.pop_front();
                    self.announce();
                }
                msg = inbound.next() => match msg {
                    Some(msg) => {
                        if is_request_provider(&msg) {
                            self.announce();
                        }
                    }
                    None => break,
                },
            }
        }
        trace!(target: "provider::announce", "page bus closed, announcer stopped");
    }
}

async fn maybe_sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        // branch is disabled by its guard; never resolve
        None => futures::future::pending().await,
    }
}
