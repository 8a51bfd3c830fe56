//! The EIP-1193 provider object

use crate::events::{EventEmitter, Listener, ListenerId};
use alloy_primitives::U64;
use funwallet_rpc::{
    BridgeEvent, BridgeRequest, BridgeResponse, PageBus, ProviderError, RequestIdProvider,
    WalletEvent, sanitized,
};
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
use std::{collections::HashMap, str::FromStr, sync::Arc, time::Duration};
use tokio::sync::oneshot;
use tracing::{trace, warn};

/// Advisory wallet state mirrored into the page.
///
/// Mutated only by inbound bridge events, never by direct page action, so a
/// DApp reading these properties right after an event fires sees state
/// consistent with that event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderState {
    /// Current chain id as a hex string, e.g. `0x38`.
    pub chain_id: Option<String>,
    /// Decimal rendering of the chain id, kept for legacy DApps.
    pub network_version: Option<String>,
    /// First account of the last `accountsChanged` event.
    pub selected_address: Option<String>,
}

/// Provider settings.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// How long `request()` waits for a matching response before rejecting.
    ///
    /// Guards against a silently dropped bridge response leaking a pending
    /// entry forever.
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { request_timeout: Duration::from_secs(300) }
    }
}

type PendingRequests = Mutex<HashMap<String, oneshot::Sender<Result<Value, ProviderError>>>>;

struct ProviderInner {
    bus: Arc<dyn PageBus>,
    pending: PendingRequests,
    state: RwLock<ProviderState>,
    events: EventEmitter,
    ids: RequestIdProvider,
    config: ProviderConfig,
}

/// The wallet provider installed in the page context.
///
/// Cheap to clone; clones share the same pending table, state and listeners.
#[derive(Clone)]
pub struct EthereumProvider {
    inner: Arc<ProviderInner>,
}

impl EthereumProvider {
    /// Creates a provider listening on `bus` and spawns its dispatch task.
    ///
    /// The task exits when the bus closes or every provider handle is gone.
    pub fn attach(bus: Arc<dyn PageBus>, config: ProviderConfig) -> Self {
        let mut inbound = bus.subscribe();
        let inner = Arc::new(ProviderInner {
            bus,
            pending: Mutex::new(HashMap::new()),
            state: RwLock::new(ProviderState::default()),
            events: EventEmitter::default(),
            ids: RequestIdProvider::default(),
            config,
        });

        let weak = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while let Some(msg) = inbound.next().await {
                let Some(inner) = weak.upgrade() else { break };
                inner.handle_message(&msg);
            }
        });

        Self { inner }
    }

    /// Submits an RPC request and waits for the matching response.
    ///
    /// Registers a pending entry under a fresh correlation id, posts the
    /// request onto the bus and resolves with the response's `result` or
    /// rejects with its `error`. After [`ProviderConfig::request_timeout`]
    /// the entry is dropped and the call rejects; a late response for that
    /// id is then ignored.
    pub async fn request(
        &self,
        method: impl Into<String>,
        params: Value,
    ) -> Result<Value, ProviderError> {
        let method = method.into();
        let id = self.inner.ids.next_id();
        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().insert(id.clone(), tx);

        trace!(target: "provider", %id, %method, params = %sanitized(&params), "posting request");
        self.inner.bus.post(BridgeRequest::new(id.clone(), method.clone(), params).to_value());

        match tokio::time::timeout(self.inner.config.request_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            // dispatch task gone, nothing will ever resolve this
            Ok(Err(_)) => Err(ProviderError::internal_error()),
            Err(_) => {
                self.inner.pending.lock().remove(&id);
                warn!(target: "provider", %id, %method, "request timed out");
                Err(ProviderError::timeout())
            }
        }
    }

    /// Legacy alias for `request({ method: "eth_requestAccounts" })`.
    pub async fn enable(&self) -> Result<Value, ProviderError> {
        self.request("eth_requestAccounts", json!([])).await
    }

    /// Legacy positional-arguments adapter over [`Self::request`].
    pub async fn send(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.request(method, params).await
    }

    /// Legacy callback adapter: settles the request into a Node-style
    /// `(error, response)` callback, where the response wraps the result and
    /// echoes the payload's `id`.
    pub fn send_async<F>(&self, payload: Value, callback: F)
    where
        F: FnOnce(Option<ProviderError>, Option<Value>) + Send + 'static,
    {
        let provider = self.clone();
        tokio::spawn(async move {
            let method =
                payload.get("method").and_then(Value::as_str).unwrap_or_default().to_string();
            if method.is_empty() {
                callback(Some(ProviderError::internal_error_with("missing method")), None);
                return;
            }
            let params = payload.get("params").cloned().unwrap_or(Value::Null);
            let id = payload.get("id").cloned().unwrap_or(Value::Null);
            match provider.request(method, params).await {
                Ok(result) => {
                    callback(None, Some(json!({ "id": id, "jsonrpc": "2.0", "result": result })))
                }
                Err(err) => callback(Some(err), None),
            }
        });
    }

    /// Always true once injected; disconnection is modeled purely as an
    /// event at this layer, not a queryable state.
    pub fn is_connected(&self) -> bool {
        true
    }

    /// Registers an event listener, see [`WalletEvent`] for the event names.
    pub fn on(&self, event: impl Into<String>, listener: Listener) -> ListenerId {
        self.inner.events.on(event, listener)
    }

    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        self.inner.events.remove_listener(event, id)
    }

    pub fn remove_all_listeners(&self, event: Option<&str>) {
        self.inner.events.remove_all_listeners(event)
    }

    /// Current chain id as a hex string, if known.
    pub fn chain_id(&self) -> Option<String> {
        self.inner.state.read().chain_id.clone()
    }

    /// Decimal network version derived from the chain id, if known.
    pub fn network_version(&self) -> Option<String> {
        self.inner.state.read().network_version.clone()
    }

    /// The currently selected account, if any.
    pub fn selected_address(&self) -> Option<String> {
        self.inner.state.read().selected_address.clone()
    }

    /// Snapshot of the advisory state.
    pub fn state(&self) -> ProviderState {
        self.inner.state.read().clone()
    }

    /// Number of requests still waiting for a response.
    pub fn pending_request_count(&self) -> usize {
        self.inner.pending.lock().len()
    }
}

impl ProviderInner {
    fn handle_message(&self, msg: &Value) {
        if let Some(resp) = BridgeResponse::from_page_message(msg) {
            self.handle_response(resp);
        } else if let Some(event) = BridgeEvent::from_page_message(msg) {
            self.handle_event(event);
        }
        // anything else on the bus is not ours
    }

    fn handle_response(&self, resp: BridgeResponse) {
        let Some(tx) = self.pending.lock().remove(&resp.id) else {
            trace!(target: "provider", id = %resp.id, "no pending request for response, dropping");
            return;
        };
        let outcome = match (resp.result, resp.error) {
            (_, Some(error)) => Err(error.into_response_error()),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        };
        // receiver gone means the request already timed out
        let _ = tx.send(outcome);
    }

    /// State is updated before listeners run, so a DApp reading provider
    /// properties from inside a listener sees post-event values.
    fn handle_event(&self, event: BridgeEvent) {
        match event.event {
            WalletEvent::ChainChanged => {
                if let Some(chain_id) = event.data.as_str() {
                    self.set_chain(chain_id);
                }
            }
            WalletEvent::AccountsChanged => {
                let selected = event
                    .data
                    .as_array()
                    .and_then(|accounts| accounts.first())
                    .and_then(Value::as_str)
                    .map(str::to_string);
                self.state.write().selected_address = selected;
            }
            WalletEvent::Connect => {
                if let Some(chain_id) = event.data.get("chainId").and_then(Value::as_str) {
                    self.set_chain(chain_id);
                }
            }
            WalletEvent::Disconnect => {}
        }
        self.events.emit(event.event.name(), &event.data);
    }

    fn set_chain(&self, chain_id: &str) {
        let network_version = match U64::from_str(chain_id) {
            Ok(id) => Some(id.to::<u64>().to_string()),
            Err(err) => {
                warn!(target: "provider", %chain_id, %err, "unparseable chain id in event");
                None
            }
        };
        let mut state = self.state.write();
        state.chain_id = Some(chain_id.to_string());
        state.network_version = network_version;
    }
}
