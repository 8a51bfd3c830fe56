//! The relay between page bus and background transport

use crate::{
    pending::PendingApprovals,
    transport::{BackgroundPush, BackgroundTransport, RelayedRequest},
};
use funwallet_rpc::{
    BridgeEvent, BridgeRequest, BridgeResponse, ErrorCode, PageBus, ProviderError, RawError,
    ResponseResult, WalletEvent, is_tx_hash_shaped, sanitized,
};
use futures::{StreamExt, channel::mpsc::UnboundedReceiver};
use serde_json::{Value, json};
use std::sync::{Arc, atomic::AtomicBool};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Returns whether `method` moves value and therefore requires explicit user
/// approval before a terminal result exists.
pub fn is_approval_gated(method: &str) -> bool {
    method == "eth_sendTransaction"
}

/// The content-script half of the wallet bridge.
///
/// One instance per page. Owns the pending-approval table and the once-only
/// provider injection guard; all state is private to this instance, nothing
/// is shared across pages or tabs.
pub struct ContentBridge<B> {
    pub(crate) page: Arc<dyn PageBus>,
    background: B,
    origin: String,
    pending: PendingApprovals,
    pub(crate) injected: AtomicBool,
}

impl<B: BackgroundTransport> ContentBridge<B> {
    pub fn new(page: Arc<dyn PageBus>, background: B, origin: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            page,
            background,
            origin: origin.into(),
            pending: PendingApprovals::default(),
            injected: AtomicBool::new(false),
        })
    }

    /// Spawns the relay loop.
    ///
    /// Both streams are subscribed before the task is handed to the runtime,
    /// so messages posted between this call and the task's first poll are
    /// buffered rather than lost.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let inbound = self.page.subscribe();
        let pushes = self.background.pushes();
        tokio::spawn(self.run(inbound, pushes))
    }

    /// Number of approvals still outstanding.
    pub fn pending_approvals(&self) -> usize {
        self.pending.len()
    }

    async fn run(
        self: Arc<Self>,
        mut inbound: UnboundedReceiver<Value>,
        mut pushes: UnboundedReceiver<BackgroundPush>,
    ) {
        let mut pushes_open = true;

        loop {
            tokio::select! {
                msg = inbound.next() => match msg {
                    Some(msg) => {
                        let Some(req) = BridgeRequest::from_page_message(&msg) else {
                            // unrelated traffic shares the bus; not an error
                            continue;
                        };
                        // each request is relayed on its own task so a slow
                        // background reply never stalls other ids
                        let this = Arc::clone(&self);
                        tokio::spawn(async move { this.relay(req).await });
                    }
                    None => break,
                },
                push = pushes.next(), if pushes_open => match push {
                    Some(push) => self.handle_push(push),
                    None => pushes_open = false,
                },
            }
        }
        trace!(target: "bridge", "page bus closed, bridge stopped");
    }

    /// Relays a single page request to the background and posts its terminal
    /// response, unless the request enters the approval-pending window.
    async fn relay(&self, req: BridgeRequest) {
        trace!(
            target: "bridge",
            id = %req.id,
            method = %req.method,
            params = %sanitized(&req.params),
            "relaying request"
        );

        let relayed = RelayedRequest {
            id: req.id.clone(),
            method: req.method.clone(),
            params: req.params,
            origin: self.origin.clone(),
        };

        match self.background.request(relayed).await {
            Ok(ResponseResult::Success(result)) => {
                self.respond(BridgeResponse::success(req.id, result));
            }
            Ok(ResponseResult::Error(error)) => {
                // phase one of the two-phase flow: the background opened an
                // approval UI and will push the real outcome later
                if is_approval_gated(&req.method)
                    && error.code() == Some(ErrorCode::UserRejected.code())
                {
                    trace!(target: "bridge", id = %req.id, "request awaiting user approval");
                    self.pending.insert(req.id, req.method);
                    return;
                }
                self.respond(BridgeResponse::failure(req.id, error.into_response_error()));
            }
            Err(err) => {
                warn!(target: "bridge", id = %req.id, %err, "background transport failed");
                self.respond(BridgeResponse::failure(
                    req.id,
                    ProviderError::internal_error_with(err.to_string()),
                ));
            }
        }
    }

    /// Handles a background-initiated push.
    ///
    /// Never errors out of the listener context: every failure path degrades
    /// to a normalized terminal message, or to dropping the push.
    fn handle_push(&self, push: BackgroundPush) {
        match push {
            BackgroundPush::TransactionCompleted { request_id, result, error } => {
                self.complete_transaction(request_id, result, error)
            }
            BackgroundPush::ChainChanged { chain_id } => {
                self.emit(BridgeEvent::new(WalletEvent::ChainChanged, json!(chain_id)));
            }
            BackgroundPush::AccountsChanged { accounts } => {
                self.emit(BridgeEvent::new(WalletEvent::AccountsChanged, json!(accounts)));
            }
            BackgroundPush::Connect { chain_id } => {
                self.emit(BridgeEvent::new(WalletEvent::Connect, json!({ "chainId": chain_id })));
            }
            BackgroundPush::Disconnect { reason } => {
                trace!(target: "bridge::push", %reason, "wallet disconnected");
                // whatever the background supplied, the page sees the fixed
                // {4900, "Disconnected"} payload
                self.emit(BridgeEvent::disconnect());
            }
        }
    }

    /// Phase two of the approval flow: resolves the pending entry for this
    /// id exactly once.
    fn complete_transaction(&self, request_id: String, result: Option<Value>, error: Option<RawError>) {
        let Some(entry) = self.pending.take(&request_id) else {
            // stale or duplicate push; there is nothing to resolve
            trace!(target: "bridge::push", id = %request_id, "dropping orphaned completion push");
            return;
        };

        if let Some(result) = result {
            match result.as_str().filter(|s| is_tx_hash_shaped(s)) {
                Some(hash) => {
                    trace!(target: "bridge::push", id = %request_id, %hash, "transaction completed");
                    self.respond(BridgeResponse::success(request_id, json!(hash)));
                }
                None => {
                    // a success claim without a usable hash is a protocol
                    // violation; never forward it as a result
                    warn!(
                        target: "bridge::push",
                        id = %request_id,
                        method = %entry.method,
                        "completion push result is not a transaction hash"
                    );
                    self.respond(BridgeResponse::failure(
                        request_id,
                        ProviderError::internal_error_with("Invalid transaction result"),
                    ));
                }
            }
        } else if let Some(error) = error {
            self.respond(BridgeResponse::failure(request_id, error.into_rejection()));
        } else {
            warn!(target: "bridge::push", id = %request_id, "completion push carried neither result nor error");
            self.respond(BridgeResponse::failure(request_id, ProviderError::internal_error()));
        }
    }

    fn respond(&self, resp: BridgeResponse) {
        self.page.post(resp.to_value());
    }

    fn emit(&self, event: BridgeEvent) {
        trace!(target: "bridge::push", event = event.event.name(), "forwarding wallet event");
        self.page.post(event.to_value());
    }
}
